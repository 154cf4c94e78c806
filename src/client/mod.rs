//! Collaborator contracts the wizard depends on.
//!
//! [`HttpBackend`] talks to a running REST server; [`LocalBackend`] calls the
//! service layer in-process against a local database.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{
    AuthRequest, CreateSellerRequest, ImageFile, ImageFolder, Seller, SubmissionReceipt,
    SubmitProductsRequest, User,
};
use crate::rest::error::{ApiError, ErrorResponse};
use crate::services::ServiceError;

pub mod http;
pub mod local;

pub use http::HttpBackend;
pub use local::LocalBackend;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("could not reach the server: {0}")]
    Network(String),

    /// The collaborator answered with an error
    #[error("{message} ({status})")]
    Rejected {
        status: u16,
        error: String,
        message: String,
        details: Option<serde_json::Value>,
    },

    #[error("unexpected response: {0}")]
    Decode(String),
}

impl BackendError {
    pub fn rejected(status: u16, body: ErrorResponse) -> Self {
        BackendError::Rejected {
            status,
            error: body.error,
            message: body.message,
            details: body.details,
        }
    }

    /// Server-side or transport failures; the same request may succeed later
    pub fn is_transient(&self) -> bool {
        match self {
            BackendError::Network(_) => true,
            BackendError::Rejected { status, .. } => *status >= 500,
            BackendError::Decode(_) => false,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            BackendError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<ServiceError> for BackendError {
    fn from(err: ServiceError) -> Self {
        let (status, body) = ApiError::from(err).into_parts();
        BackendError::rejected(status.as_u16(), body)
    }
}

/// Authentication, image hosting, seller creation and batch submission
#[async_trait]
pub trait Backend: Send + Sync {
    async fn authenticate(&self, request: &AuthRequest) -> Result<User, BackendError>;

    /// Host an image and return its URL
    async fn upload_image(
        &self,
        folder: ImageFolder,
        image: ImageFile,
    ) -> Result<String, BackendError>;

    async fn create_seller(&self, request: &CreateSellerRequest) -> Result<Seller, BackendError>;

    async fn submit_products(
        &self,
        request: &SubmitProductsRequest,
    ) -> Result<SubmissionReceipt, BackendError>;
}
