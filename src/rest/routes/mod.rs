//! Route handlers for the REST API.

pub mod auth;
pub mod dashboard;
pub mod health;
pub mod products;
pub mod sellers;
pub mod uploads;
