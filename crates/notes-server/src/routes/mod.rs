//! Route definitions for the HTTP API.

pub mod health;
pub mod notes;
pub mod users;

use axum::extract::DefaultBodyLimit;
use axum::Router;

use crate::state::AppState;

/// Build the complete router with all routes.
///
/// The body limit leaves headroom above the avatar ceiling so multipart
/// framing does not eat into the per-file budget.
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config().max_upload_bytes + 64 * 1024;

    Router::new()
        .merge(health::routes())
        .merge(users::routes())
        .merge(notes::routes())
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
