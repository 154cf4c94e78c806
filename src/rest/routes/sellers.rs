//! Seller creation endpoint.

use axum::{extract::State, Json};

use crate::models::{CreateSellerRequest, Seller};
use crate::rest::error::{ApiError, ErrorResponse};
use crate::rest::state::ApiState;

/// Create a seller for an existing user
///
/// The shop image must already be hosted; upload it first through
/// `/api/v1/uploads/shops`.
#[utoipa::path(
    post,
    path = "/api/v1/sellers",
    tag = "Sellers",
    request_body = CreateSellerRequest,
    responses(
        (status = 200, description = "Seller created", body = Seller),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
pub async fn create(
    State(state): State<ApiState>,
    Json(request): Json<CreateSellerRequest>,
) -> Result<Json<Seller>, ApiError> {
    let seller = state.service.create_seller(request).await?;
    Ok(Json(seller))
}
