//! Route definitions for the `/contacts` resource.
//!
//! All endpoints require authentication.

use axum::routing::get;
use axum::Router;

use crate::handlers::contacts;
use crate::state::AppState;

/// Routes mounted at `/contacts`.
///
/// ```text
/// GET    /   -> list_contacts
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(contacts::list_contacts))
}
