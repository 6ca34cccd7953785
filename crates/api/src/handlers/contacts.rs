//! Handlers for the `/contacts` resource.

use axum::extract::{Query, State};
use axum::Json;
use knect_db::models::contact::Contact;
use knect_db::repositories::ContactRepo;
use serde::Deserialize;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Maximum page size for contact listing.
const MAX_LIMIT: i64 = 100;

/// Default page size for contact listing.
const DEFAULT_LIMIT: i64 = 50;

/// Query parameters for `GET /contacts`.
#[derive(Debug, Deserialize)]
pub struct ContactQuery {
    /// Maximum number of results. Defaults to 50, capped at 100.
    pub limit: Option<i64>,
    /// Number of results to skip. Defaults to 0.
    pub offset: Option<i64>,
}

/// GET /api/v1/contacts
///
/// The authenticated user's contacts, newest first. Contacts are scoped
/// to their owner; nobody else's approvals ever appear here.
pub async fn list_contacts(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ContactQuery>,
) -> AppResult<Json<DataResponse<Vec<Contact>>>> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let offset = params.offset.unwrap_or(0).max(0);

    let contacts = ContactRepo::list_for_owner(&state.pool, auth.user_id, limit, offset).await?;

    Ok(Json(DataResponse { data: contacts }))
}
