//! Product batch submission, listing and deletion endpoints.

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::models::{SubmissionReceipt, SubmitProductsRequest};
use crate::rest::dto::{MessageResponse, ProductList, ProductListParams};
use crate::rest::error::{ApiError, ErrorResponse};
use crate::rest::state::ApiState;

/// Submit a batch of products for a seller
#[utoipa::path(
    post,
    path = "/api/v1/products",
    tag = "Products",
    request_body = SubmitProductsRequest,
    responses(
        (status = 200, description = "All products created in one transaction", body = SubmissionReceipt),
        (status = 400, description = "Validation error or MSP above MRP", body = ErrorResponse),
        (status = 404, description = "Seller not found", body = ErrorResponse)
    )
)]
pub async fn submit(
    State(state): State<ApiState>,
    Json(request): Json<SubmitProductsRequest>,
) -> Result<Json<SubmissionReceipt>, ApiError> {
    let receipt = state.service.submit_products(request).await?;
    Ok(Json(receipt))
}

/// List a seller's products, newest first
#[utoipa::path(
    get,
    path = "/api/v1/products",
    tag = "Products",
    params(ProductListParams),
    responses(
        (status = 200, description = "Products for the seller", body = ProductList),
        (status = 400, description = "Missing seller id", body = ErrorResponse)
    )
)]
pub async fn list(
    State(state): State<ApiState>,
    Query(params): Query<ProductListParams>,
) -> Result<Json<ProductList>, ApiError> {
    let products = state
        .service
        .list_products(params.seller_id.unwrap_or_default())
        .await?;
    Ok(Json(ProductList {
        count: products.len(),
        products,
    }))
}

/// Delete a product
#[utoipa::path(
    delete,
    path = "/api/v1/products/{id}",
    tag = "Products",
    params(
        ("id" = String, Path, description = "Product id")
    ),
    responses(
        (status = 200, description = "Product deleted", body = MessageResponse),
        (status = 404, description = "Product not found", body = ErrorResponse)
    )
)]
pub async fn delete(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.service.delete_product(id).await?;
    Ok(Json(MessageResponse {
        message: "Product deleted successfully".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rest::test_support;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_list_requires_seller_id() {
        let dir = TempDir::new().unwrap();
        let result = list(
            State(test_support::state(&dir)),
            Query(ProductListParams::default()),
        )
        .await;
        assert!(matches!(result, Err(ApiError::ValidationError { .. })));
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let dir = TempDir::new().unwrap();
        let result = delete(State(test_support::state(&dir)), Path("nope".to_string())).await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }
}
