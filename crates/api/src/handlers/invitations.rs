//! Handlers for the `/invitations` resource: letting an anonymous
//! scanner leave their email behind, and redeeming the invitation at
//! registration.

use axum::extract::State;
use axum::Json;
use knect_core::clock::Clock;
use knect_core::codes;
use knect_core::connection::METHOD_EMAIL_INVITATION;
use knect_core::error::CoreError;
use knect_db::repositories::{ConnectionCodeRepo, ConnectionRequestRepo, UserRepo};
use serde::Deserialize;
use serde_json::json;
use validator::ValidateEmail;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::services::invitation::InvitationService;
use crate::services::notify::NotificationDispatcher;
use crate::state::AppState;

/// Request body for `POST /invitations`.
///
/// Submitted by an anonymous viewer who just scanned a code and wants
/// to stay in touch. `payload` is the same scanned token the viewer
/// presented to `/scan/validate`.
#[derive(Debug, Deserialize)]
pub struct SendInvitationRequest {
    pub recipient_email: String,
    pub payload: String,
    /// Scan id from the preceding `/scan/validate` response, if any.
    pub scan_id: Option<String>,
    /// Where the scan happened, for the shared memory.
    pub location: Option<String>,
    /// A note to keep alongside the meeting.
    pub note: Option<String>,
}

/// Request body for `POST /invitations/validate` and
/// `POST /invitations/complete`: the exact token pair from the
/// registration URL.
#[derive(Debug, Deserialize)]
pub struct InvitationTokens {
    pub invitation_id: String,
    pub code: String,
}

/// POST /api/v1/invitations
///
/// Anonymous: the scanner has no account, which is the whole point. The
/// scanned code resolves to its owner, who becomes the invitation's
/// sender. Inserts the invitation and a correlated pending memory,
/// emails the registration link, and commits only if the email was
/// accepted; a rejected send rolls everything back and answers 502.
///
/// Unlike `/scan/validate`, this is a mutating path, so a missing or
/// stale code fails loudly with 400.
pub async fn send_invitation(
    State(state): State<AppState>,
    Json(input): Json<SendInvitationRequest>,
) -> AppResult<Json<serde_json::Value>> {
    let recipient = input.recipient_email.trim();
    if !recipient.validate_email() {
        return Err(AppError::Core(CoreError::Validation(format!(
            "'{recipient}' is not a valid email address"
        ))));
    }

    let Some(code_str) = codes::extract_code(&input.payload) else {
        return Err(AppError::Core(CoreError::Validation(
            "Payload does not contain a connection code".to_string(),
        )));
    };
    let Some(code) = ConnectionCodeRepo::find_by_code(&state.pool, &code_str).await? else {
        return Err(AppError::Core(CoreError::Validation(
            "Unknown connection code".to_string(),
        )));
    };
    let now = state.clock.now();
    if !codes::code_is_usable(code.is_active, code.expires_at, now) {
        return Err(AppError::Core(CoreError::Validation(
            "Connection code is expired or deactivated".to_string(),
        )));
    }

    let Some(sender) = UserRepo::find_by_id(&state.pool, code.owner_user_id).await? else {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: code.owner_user_id,
        }));
    };

    let snapshot = json!({
        "method": METHOD_EMAIL_INVITATION,
        "code": code.code,
        "scan_id": input.scan_id,
        "location": input.location,
        "note": input.note,
        "met_at": now,
    });

    let invitation = InvitationService::new(&state)
        .send(&sender, recipient, snapshot)
        .await?;

    Ok(Json(json!({
        "data": {
            "invitation_id": invitation.invitation_id,
            "recipient_email": invitation.recipient_email,
            "status": invitation.status,
            "expires_at": invitation.expires_at,
        }
    })))
}

/// POST /api/v1/invitations/validate
///
/// Pre-registration check of an invitation link. Public: the recipient
/// has no account yet. A redeemable pair answers the sender's display
/// info; anything else answers `{ "data": null }` without distinguishing
/// unknown, mismatched, expired, or already-redeemed.
pub async fn validate_invitation(
    State(state): State<AppState>,
    Json(tokens): Json<InvitationTokens>,
) -> AppResult<Json<serde_json::Value>> {
    let Some(invitation) = InvitationService::new(&state)
        .validate(&tokens.invitation_id, &tokens.code)
        .await?
    else {
        return Ok(Json(json!({ "data": null })));
    };

    let sender = UserRepo::find_by_id(&state.pool, invitation.sender_user_id).await?;
    let sender = sender.map(|u| {
        json!({
            "display_name": u.display_name,
            "avatar_url": u.avatar_url,
        })
    });

    Ok(Json(json!({
        "data": {
            "invitation_id": invitation.invitation_id,
            "recipient_email": invitation.recipient_email,
            "sender": sender,
            "expires_at": invitation.expires_at,
        }
    })))
}

/// POST /api/v1/invitations/complete
///
/// Redeem an invitation for the freshly registered, now-authenticated
/// recipient. Flips the invitation to `registered` and its correlated
/// memory to `connected` in one transaction, opens a pending connection
/// request toward the sender (a Contact still needs their approval), and
/// notifies them. Redemption is exactly-once: a replay or stale pair
/// answers 409.
pub async fn complete_invitation(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(tokens): Json<InvitationTokens>,
) -> AppResult<Json<serde_json::Value>> {
    let Some((invitation, memory)) = InvitationService::new(&state)
        .complete(&tokens.invitation_id, &tokens.code, auth.user_id)
        .await?
    else {
        return Err(AppError::Core(CoreError::Conflict(
            "Invitation is no longer redeemable".to_string(),
        )));
    };

    // The request is how the sender gets to approve the new contact;
    // losing it is recoverable (the user can request manually), so it
    // does not unwind the committed resolution.
    let metadata = json!({
        "method": METHOD_EMAIL_INVITATION,
        "invitation_id": invitation.invitation_id,
    });
    let request_id = match ConnectionRequestRepo::create_pending(
        &state.pool,
        auth.user_id,
        invitation.sender_user_id,
        &metadata,
    )
    .await
    {
        Ok(request) => Some(request.id),
        Err(err) => {
            tracing::warn!(
                error = %err,
                invitation_id = %invitation.invitation_id,
                "Failed to open connection request after redemption"
            );
            None
        }
    };

    NotificationDispatcher::new(&state)
        .invitation_registered(invitation.sender_user_id, auth.user_id)
        .await;

    Ok(Json(json!({
        "data": {
            "memory": memory,
            "connection_request_id": request_id,
        }
    })))
}
