pub mod codes;
pub mod contacts;
pub mod health;
pub mod invitations;
pub mod notifications;
pub mod requests;
pub mod scan;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /codes                              generate (POST, auth)
/// /codes/active                       current usable code (GET, auth)
/// /codes/{id}/deactivate              deactivate (POST, auth)
///
/// /scan/validate                      resolve a scanned payload (POST, optional auth)
///
/// /invitations                        send email invitation (POST, auth)
/// /invitations/validate               pre-registration check (POST, public)
/// /invitations/complete               redeem after registration (POST, auth)
///
/// /requests                           propose connection (POST, auth)
/// /requests/pending                   incoming pending (GET, auth)
/// /requests/{id}/approve              approve, materialize contact (POST, auth)
/// /requests/{id}/decline              decline (POST, auth)
///
/// /contacts                           list own contacts (GET, auth)
///
/// /notifications                      list (GET, auth)
/// /notifications/unread-count         unread count (GET, auth)
/// /notifications/{id}/read            mark read (POST, auth)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/codes", codes::router())
        .nest("/scan", scan::router())
        .nest("/invitations", invitations::router())
        .nest("/requests", requests::router())
        .nest("/contacts", contacts::router())
        .nest("/notifications", notifications::router())
}
