//! Route definitions for the `/invitations` resource.
//!
//! `send` and `validate` are public (the scanner and the recipient have
//! no account yet); only `complete` requires authentication.

use axum::routing::post;
use axum::Router;

use crate::handlers::invitations;
use crate::state::AppState;

/// Routes mounted at `/invitations`.
///
/// ```text
/// POST   /            -> send_invitation
/// POST   /validate    -> validate_invitation
/// POST   /complete    -> complete_invitation
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(invitations::send_invitation))
        .route("/validate", post(invitations::validate_invitation))
        .route("/complete", post(invitations::complete_invitation))
}
