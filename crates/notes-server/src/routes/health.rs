//! Health check endpoint.

use axum::response::Response;
use axum::routing::get;
use axum::Router;
use serde::Serialize;

use crate::response;
use crate::state::AppState;

/// Health check payload.
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    /// Service status.
    pub status: String,
}

/// GET / - Liveness check, enveloped like every other response.
async fn health_check() -> Response {
    response::success(
        HealthStatus {
            status: "ok".to_string(),
        },
        "API is running",
        axum::http::StatusCode::OK,
    )
}

/// Build health check routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/", get(health_check))
}
