//! Dashboard and analytics endpoints.

use axum::{
    extract::{Query, State},
    Json,
};

use crate::db::{Analytics, DashboardPage};
use crate::rest::dto::{AnalyticsParams, DashboardParams};
use crate::rest::error::{ApiError, ErrorResponse};
use crate::rest::state::ApiState;

/// Paginated sellers with products, owners and totals
#[utoipa::path(
    get,
    path = "/api/v1/dashboard",
    tag = "Dashboard",
    params(DashboardParams),
    responses(
        (status = 200, description = "Dashboard page", body = DashboardPage),
        (status = 400, description = "Invalid query parameters", body = ErrorResponse)
    )
)]
pub async fn dashboard(
    State(state): State<ApiState>,
    Query(params): Query<DashboardParams>,
) -> Result<Json<DashboardPage>, ApiError> {
    let query = params
        .into_query()
        .map_err(|details| ApiError::ValidationError {
            message: "Invalid query parameters".to_string(),
            details,
        })?;
    Ok(Json(state.service.dashboard(query).await?))
}

/// Products per day, top users and average products per seller
#[utoipa::path(
    get,
    path = "/api/v1/dashboard/analytics",
    tag = "Dashboard",
    params(AnalyticsParams),
    responses(
        (status = 200, description = "Analytics for the window", body = Analytics),
        (status = 400, description = "Invalid query parameters", body = ErrorResponse)
    )
)]
pub async fn analytics(
    State(state): State<ApiState>,
    Query(params): Query<AnalyticsParams>,
) -> Result<Json<Analytics>, ApiError> {
    let range = params
        .into_range()
        .map_err(|details| ApiError::ValidationError {
            message: "Invalid query parameters".to_string(),
            details,
        })?;
    Ok(Json(state.service.analytics(range).await?))
}
