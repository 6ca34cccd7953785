//! Handlers for the `/requests` resource: proposing, approving, and
//! declining connection requests.
//!
//! A Contact only ever exists as the product of an explicit approval
//! here; nothing materializes relationships implicitly.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use knect_core::clock::Clock;
use knect_core::connection::{
    validate_tier, MEMORY_DECLINED, METHOD_MANUAL, REQUEST_APPROVED, REQUEST_DECLINED, TIER_MAX,
};
use knect_core::error::CoreError;
use knect_core::privacy;
use knect_core::types::DbId;
use knect_db::models::connection_request::{ApproveRequest, ConnectionRequest};
use knect_db::models::contact::NewContact;
use knect_db::repositories::{
    ConnectionMemoryRepo, ConnectionRequestRepo, ContactRepo, UserRepo,
};
use serde::Deserialize;
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::services::notify::NotificationDispatcher;
use crate::state::AppState;

/// Request body for `POST /requests`.
#[derive(Debug, Deserialize)]
pub struct CreateRequest {
    pub target_user_id: DbId,
    pub metadata: Option<serde_json::Value>,
}

/// POST /api/v1/requests
///
/// Propose a connection to another user. Idempotent per (requester,
/// target): repeating the call while a request is pending returns the
/// existing one instead of stacking duplicates.
pub async fn create_request(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateRequest>,
) -> AppResult<Json<serde_json::Value>> {
    if input.target_user_id == auth.user_id {
        return Err(AppError::Core(CoreError::Validation(
            "Cannot send a connection request to yourself".to_string(),
        )));
    }

    if UserRepo::find_by_id(&state.pool, input.target_user_id)
        .await?
        .is_none()
    {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: input.target_user_id,
        }));
    }

    let metadata = input
        .metadata
        .unwrap_or_else(|| json!({ "method": METHOD_MANUAL }));

    let request =
        ConnectionRequestRepo::create_pending(&state.pool, auth.user_id, input.target_user_id, &metadata)
            .await?;

    Ok(Json(json!({ "data": request })))
}

/// GET /api/v1/requests/pending
///
/// Incoming pending requests for the authenticated user, oldest first,
/// each enriched with the requester's display info.
pub async fn list_pending(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<serde_json::Value>> {
    let requests = ConnectionRequestRepo::list_pending_for_target(&state.pool, auth.user_id).await?;

    let mut enriched = Vec::with_capacity(requests.len());
    for request in requests {
        let requester = UserRepo::find_by_id(&state.pool, request.requester_id).await?;
        let requester = requester.map(|u| {
            json!({
                "user_id": u.id,
                "display_name": u.display_name,
                "avatar_url": u.avatar_url,
                "company": u.company,
                "job_title": u.job_title,
            })
        });
        enriched.push(json!({
            "request": request,
            "requester": requester,
        }));
    }

    Ok(Json(json!({ "data": enriched })))
}

/// POST /api/v1/requests/{id}/approve
///
/// Approve a pending request, materializing exactly one Contact owned by
/// the approver. Only the target may approve. Re-approving an approved
/// request returns the existing contact; approving a declined one
/// answers 409.
pub async fn approve_request(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(request_id): Path<DbId>,
    Json(input): Json<ApproveRequest>,
) -> AppResult<Json<serde_json::Value>> {
    let request = load_request_for_target(&state, request_id, auth.user_id).await?;

    match request.status.as_str() {
        REQUEST_APPROVED => {
            // Idempotent replay: hand back the contact the first approval made.
            let contact = ContactRepo::find_by_request(&state.pool, request_id).await?;
            return Ok(Json(json!({ "data": contact })));
        }
        REQUEST_DECLINED => {
            return Err(AppError::Core(CoreError::Conflict(
                "Request was already declined".to_string(),
            )));
        }
        _ => {}
    }

    let tier = input.tier.unwrap_or(TIER_MAX);
    validate_tier(tier).map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    let Some(requester) = UserRepo::find_by_id(&state.pool, request.requester_id).await? else {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: request.requester_id,
        }));
    };

    // The contact carries only links the requester shares by default,
    // further narrowed by the approver's selection when one was made.
    let default_selection = privacy::link_selection(&requester.default_shared_links);
    let selection: Vec<String> = if input.shared_links_selection.is_empty() {
        default_selection
    } else {
        input
            .shared_links_selection
            .iter()
            .filter(|name| default_selection.contains(name))
            .cloned()
            .collect()
    };
    let shared_links = privacy::intersect_shared_links(&requester.shared_links, &selection);

    let contact = NewContact {
        owner_user_id: auth.user_id,
        contact_user_id: requester.id,
        request_id,
        display_name: requester.display_name.clone(),
        company: requester.company.clone(),
        job_title: requester.job_title.clone(),
        avatar_url: requester.avatar_url.clone(),
        shared_links: serde_json::Value::Object(shared_links),
        tags: json!(input.tags),
        badges: json!(input.badges),
        note: input.note.clone(),
        tier,
        met_at: Some(request.created_at),
        met_location: input.location.clone(),
    };

    let now = state.clock.now();
    let Some(created) =
        ConnectionRequestRepo::approve_and_create_contact(&state.pool, request_id, now, &contact)
            .await?
    else {
        // A concurrent decision won; report whichever state stuck.
        return match ContactRepo::find_by_request(&state.pool, request_id).await? {
            Some(existing) => Ok(Json(json!({ "data": existing }))),
            None => Err(AppError::Core(CoreError::Conflict(
                "Request was already declined".to_string(),
            ))),
        };
    };

    NotificationDispatcher::new(&state)
        .connection_accepted(request.requester_id, auth.user_id)
        .await;

    tracing::info!(
        request_id,
        owner_user_id = auth.user_id,
        contact_user_id = requester.id,
        "Connection request approved"
    );

    Ok(Json(json!({ "data": created })))
}

/// POST /api/v1/requests/{id}/decline
///
/// Decline a pending request. Only the target may decline; no Contact is
/// ever produced here. Declining twice is a no-op; declining an approved
/// request answers 409.
pub async fn decline_request(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(request_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let request = load_request_for_target(&state, request_id, auth.user_id).await?;

    let now = state.clock.now();
    let transitioned = ConnectionRequestRepo::decline(&state.pool, request_id, now).await?;

    if !transitioned {
        // Re-read: a concurrent approval may have landed after our fetch.
        let current = ConnectionRequestRepo::find_by_id(&state.pool, request_id)
            .await?
            .map(|r| r.status);
        return match current.as_deref() {
            Some(REQUEST_DECLINED) => Ok(StatusCode::NO_CONTENT),
            _ => Err(AppError::Core(CoreError::Conflict(
                "Request was already approved".to_string(),
            ))),
        };
    }

    // Keep the requester's memory of the meeting, marked declined.
    if let Err(err) = ConnectionMemoryRepo::update_status_between(
        &state.pool,
        request.requester_id,
        auth.user_id,
        MEMORY_DECLINED,
    )
    .await
    {
        tracing::warn!(error = %err, request_id, "Failed to mark memory declined");
    }

    tracing::info!(request_id, target_user_id = auth.user_id, "Connection request declined");
    Ok(StatusCode::NO_CONTENT)
}

/// Fetch a request and enforce that the caller is its target.
async fn load_request_for_target(
    state: &AppState,
    request_id: DbId,
    user_id: DbId,
) -> AppResult<ConnectionRequest> {
    let Some(request) = ConnectionRequestRepo::find_by_id(&state.pool, request_id).await? else {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Connection request",
            id: request_id,
        }));
    };

    if request.target_user_id != user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only the request target may decide it".to_string(),
        )));
    }

    Ok(request)
}
