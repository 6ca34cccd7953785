//! Route definitions for the `/scan` resource.
//!
//! Validation serves anonymous viewers; authentication is optional and
//! only enriches the side effects.

use axum::routing::post;
use axum::Router;

use crate::handlers::scan;
use crate::state::AppState;

/// Routes mounted at `/scan`.
///
/// ```text
/// POST   /validate   -> validate_scan
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/validate", post(scan::validate_scan))
}
