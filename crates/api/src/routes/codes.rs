//! Route definitions for the `/codes` resource.
//!
//! All endpoints require authentication.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::codes;
use crate::state::AppState;

/// Routes mounted at `/codes`.
///
/// ```text
/// POST   /                  -> generate_code
/// GET    /active            -> active_code
/// POST   /{id}/deactivate   -> deactivate_code
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(codes::generate_code))
        .route("/active", get(codes::active_code))
        .route("/{id}/deactivate", post(codes::deactivate_code))
}
