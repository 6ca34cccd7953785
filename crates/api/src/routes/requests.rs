//! Route definitions for the `/requests` resource.
//!
//! All endpoints require authentication.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::requests;
use crate::state::AppState;

/// Routes mounted at `/requests`.
///
/// ```text
/// POST   /                -> create_request
/// GET    /pending         -> list_pending
/// POST   /{id}/approve    -> approve_request
/// POST   /{id}/decline    -> decline_request
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(requests::create_request))
        .route("/pending", get(requests::list_pending))
        .route("/{id}/approve", post(requests::approve_request))
        .route("/{id}/decline", post(requests::decline_request))
}
