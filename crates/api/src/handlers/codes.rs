//! Handlers for the `/codes` resource: QR connection code lifecycle.
//!
//! All endpoints require authentication; codes belong to their owner and
//! every mutation checks ownership at the SQL level.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use knect_core::clock::Clock;
use knect_core::codes;
use knect_core::error::CoreError;
use knect_core::types::DbId;
use knect_db::models::scan_event::{NewScanEvent, PURPOSE_GENERATION};
use knect_db::repositories::{ConnectionCodeRepo, ScanEventRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// POST /api/v1/codes
///
/// Mint a fresh 24-hour connection code for the authenticated user and
/// return it alongside the scan URL to embed in the QR image. Earlier
/// codes stay live until they expire or are deactivated.
pub async fn generate_code(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<serde_json::Value>> {
    let now = state.clock.now();
    let code = codes::mint_connection_code(state.clock.as_ref());
    let expires_at = codes::connection_code_expiry(now);

    let created = ConnectionCodeRepo::create(&state.pool, auth.user_id, &code, expires_at).await?;

    // Audit row for the mint itself; its scan_id is the one baked into
    // the QR image URL.
    let scan_id = codes::mint_scan_id(state.clock.as_ref());
    let event = NewScanEvent {
        scan_id: scan_id.clone(),
        code: created.code.clone(),
        location: None,
        device_info: None,
        referrer: None,
        session_id: codes::mint_session_id(state.clock.as_ref()),
        viewer_user_id: Some(auth.user_id),
        purpose: PURPOSE_GENERATION,
    };
    if let Err(err) = ScanEventRepo::insert(&state.pool, &event).await {
        tracing::warn!(error = %err, code = %created.code, "Failed to record generation event");
    }

    let scan_url = codes::scan_url(&state.config.public_origin, &scan_id, &created.code);

    tracing::info!(owner_user_id = auth.user_id, code = %created.code, "Connection code generated");

    Ok(Json(serde_json::json!({
        "data": {
            "code": created,
            "scan_url": scan_url,
        }
    })))
}

/// GET /api/v1/codes/active
///
/// The authenticated user's most recent still-usable code, or
/// `{ "data": null }` when every code has expired or been deactivated.
/// A fresh scan id is minted per render so each displayed QR is
/// individually traceable.
pub async fn active_code(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<serde_json::Value>> {
    let now = state.clock.now();
    let Some(code) = ConnectionCodeRepo::find_active_for_owner(&state.pool, auth.user_id, now).await?
    else {
        return Ok(Json(serde_json::json!({ "data": null })));
    };

    let scan_id = codes::mint_scan_id(state.clock.as_ref());
    let scan_url = codes::scan_url(&state.config.public_origin, &scan_id, &code.code);

    Ok(Json(serde_json::json!({
        "data": {
            "code": code,
            "scan_url": scan_url,
        }
    })))
}

/// POST /api/v1/codes/{id}/deactivate
///
/// Deactivate a code ahead of its natural expiry. Returns 204 on
/// success, 404 when the code does not exist, belongs to someone else,
/// or is already inactive.
pub async fn deactivate_code(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(code_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let found = ConnectionCodeRepo::deactivate(&state.pool, code_id, auth.user_id).await?;

    if !found {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Connection code",
            id: code_id,
        }));
    }

    tracing::info!(owner_user_id = auth.user_id, code_id, "Connection code deactivated");
    Ok(StatusCode::NO_CONTENT)
}
