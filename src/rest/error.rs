//! API error types and responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::FieldError;
use crate::services::ServiceError;
use crate::uploads::UploadError;

/// API error types
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found
    NotFound(String),
    /// Field validation failed
    ValidationError {
        message: String,
        details: Vec<FieldError>,
    },
    /// Products whose MSP exceeds their MRP
    InvalidPrices(Vec<String>),
    /// Bad request
    BadRequest(String),
    /// Upload body over the configured limit
    PayloadTooLarge(String),
    /// Internal server error
    InternalError(String),
}

/// Error response body
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    /// Field errors or offending product names
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::ValidationError { .. } | ApiError::InvalidPrices(_) | ApiError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Status and body this error renders as
    pub fn into_parts(self) -> (StatusCode, ErrorResponse) {
        let status = self.status();
        let (error, message, details) = match self {
            ApiError::NotFound(msg) => ("not_found", msg, None),
            ApiError::ValidationError { message, details } => (
                "validation_error",
                message,
                serde_json::to_value(details).ok(),
            ),
            ApiError::InvalidPrices(names) => (
                "invalid_product_prices",
                "Invalid product prices: MSP cannot be greater than MRP for some products"
                    .to_string(),
                Some(serde_json::json!({ "products": names })),
            ),
            ApiError::BadRequest(msg) => ("bad_request", msg, None),
            ApiError::PayloadTooLarge(msg) => ("payload_too_large", msg, None),
            ApiError::InternalError(msg) => {
                tracing::error!(error = %msg, "Request failed");
                ("internal_error", msg, None)
            }
        };

        (
            status,
            ErrorResponse {
                error: error.to_string(),
                message,
                details,
            },
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = self.into_parts();
        (status, Json(body)).into_response()
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation { message, details } => {
                ApiError::ValidationError { message, details }
            }
            ServiceError::InvalidPrices(names) => ApiError::InvalidPrices(names),
            ServiceError::NotFound(what) => ApiError::NotFound(format!("{} not found", what)),
            ServiceError::Upload(UploadError::Invalid(details)) => ApiError::ValidationError {
                message: "Invalid image".to_string(),
                details,
            },
            other => ApiError::InternalError(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::BadRequest(format!("JSON error: {}", err))
    }
}
