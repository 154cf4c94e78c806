//! Leadcollect - seller onboarding and product lead capture
//!
//! The library holds the form session core, the collaborators it talks to
//! (REST server, relational store, image hosting) and the wizard that drives
//! a session through them. The `leadcollect` binary is a thin CLI over it.

pub mod client;
pub mod config;
pub mod db;
pub mod logging;
pub mod models;
pub mod rest;
pub mod services;
pub mod session;
pub mod uploads;
pub mod wizard;

pub use config::Config;
pub use session::{Action, FormSession, SessionState, Step};
pub use wizard::Wizard;
