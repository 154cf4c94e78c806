//! Authentication endpoint.

use axum::{extract::State, Json};

use crate::models::{AuthRequest, User};
use crate::rest::error::{ApiError, ErrorResponse};
use crate::rest::state::ApiState;

/// Find or create a user by phone number
#[utoipa::path(
    post,
    path = "/api/v1/auth",
    tag = "Auth",
    request_body = AuthRequest,
    responses(
        (status = 200, description = "Authenticated user with activity stats", body = User),
        (status = 400, description = "Validation error", body = ErrorResponse)
    )
)]
pub async fn authenticate(
    State(state): State<ApiState>,
    Json(request): Json<AuthRequest>,
) -> Result<Json<User>, ApiError> {
    let user = state.service.authenticate(request).await?;
    Ok(Json(user))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rest::test_support;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_authenticate_creates_then_reuses() {
        let dir = TempDir::new().unwrap();
        let state = test_support::state(&dir);
        let request = AuthRequest {
            name: "Alice".to_string(),
            phone: "9876543210".to_string(),
        };

        let first = authenticate(State(state.clone()), Json(request.clone()))
            .await
            .unwrap();
        let second = authenticate(State(state), Json(request)).await.unwrap();
        assert_eq!(first.id, second.id);
    }

    #[tokio::test]
    async fn test_authenticate_rejects_bad_phone() {
        let dir = TempDir::new().unwrap();
        let result = authenticate(
            State(test_support::state(&dir)),
            Json(AuthRequest {
                name: "Alice".to_string(),
                phone: "12".to_string(),
            }),
        )
        .await;
        assert!(matches!(result, Err(ApiError::ValidationError { .. })));
    }
}
