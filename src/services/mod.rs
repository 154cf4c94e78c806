//! Business services shared by the REST handlers and the in-process backend.

pub mod leads;

pub use leads::{LeadService, ServiceError};
