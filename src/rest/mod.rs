//! REST API for lead capture.
//!
//! Exposes the collaborators the wizard talks to (authentication, image
//! hosting, seller creation, batch product submission) plus the dashboard.
//! Uploaded images are served back under [`UPLOADS_ROUTE`].

use std::net::SocketAddr;

use anyhow::Result;
use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub mod dto;
pub mod error;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use state::ApiState;

use crate::uploads::UPLOADS_ROUTE;

/// Build the API router with all routes
pub fn build_router(state: ApiState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let uploads_dir = state.config.uploads_path();
    let upload_limit = state.upload_body_limit();

    Router::new()
        .route("/api/v1/health", get(routes::health::health))
        .route("/api/v1/auth", post(routes::auth::authenticate))
        .route(
            "/api/v1/uploads/:folder",
            post(routes::uploads::upload).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/api/v1/sellers", post(routes::sellers::create))
        .route(
            "/api/v1/products",
            get(routes::products::list).post(routes::products::submit),
        )
        .route("/api/v1/products/:id", delete(routes::products::delete))
        .route("/api/v1/dashboard", get(routes::dashboard::dashboard))
        .route(
            "/api/v1/dashboard/analytics",
            get(routes::dashboard::analytics),
        )
        .nest_service(UPLOADS_ROUTE, ServeDir::new(uploads_dir))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Start the REST API server and run until Ctrl-C
pub async fn serve(state: ApiState, port: u16) -> Result<()> {
    let app = build_router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("REST API listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!("Failed to listen for shutdown signal: {}", e);
            }
        })
        .await?;

    tracing::info!("REST API server stopped");
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_build_router() {
        let dir = TempDir::new().unwrap();
        let _router = build_router(test_support::state(&dir));
    }
}
