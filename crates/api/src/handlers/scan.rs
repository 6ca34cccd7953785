//! Handler for `/scan/validate`: resolving a scanned payload into a
//! privacy-filtered profile view.
//!
//! This is a read path serving anonymous and signed-in viewers alike, so
//! it never fails loudly over lookup misses: malformed payloads, unknown
//! codes, and deactivated codes all answer `{ "data": null }`, and an
//! expired code answers `{ "data": { "is_expired": true } }` so the UI
//! can prompt for a fresh one.

use axum::extract::State;
use axum::Json;
use knect_core::clock::Clock;
use knect_core::connection::METHOD_QR_SCAN;
use knect_core::types::DbId;
use knect_core::{codes, privacy};
use knect_db::models::connection_memory::NewConnectionMemory;
use knect_db::repositories::{ConnectionCodeRepo, ConnectionMemoryRepo, ConnectionRequestRepo, UserRepo};
use serde::Deserialize;
use serde_json::json;

use crate::error::AppResult;
use crate::middleware::auth::MaybeAuthUser;
use crate::services::scan::{ScanContext, ScanTracker};
use crate::state::AppState;

/// Request body for `POST /scan/validate`.
///
/// `payload` is whatever the scanner captured: a raw code, a scan or
/// share URL, or a legacy JSON blob.
#[derive(Debug, Deserialize)]
pub struct ValidateScanRequest {
    pub payload: String,
    #[serde(flatten)]
    pub context: ScanContext,
}

/// POST /api/v1/scan/validate
///
/// Resolve a scanned payload, record the scan, and return the owner's
/// profile view. When the viewer is signed in (and not scanning their
/// own code), a connected memory and an idempotent pending connection
/// request are created as side effects; their failure degrades to a
/// warning rather than blocking the view.
pub async fn validate_scan(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Json(input): Json<ValidateScanRequest>,
) -> AppResult<Json<serde_json::Value>> {
    let Some(code_str) = codes::extract_code(&input.payload) else {
        return Ok(Json(json!({ "data": null })));
    };

    let Some(code) = ConnectionCodeRepo::find_by_code(&state.pool, &code_str).await? else {
        return Ok(Json(json!({ "data": null })));
    };

    let now = state.clock.now();
    if !code.is_active {
        // Deactivated codes are indistinguishable from unknown ones.
        return Ok(Json(json!({ "data": null })));
    }
    if now >= code.expires_at {
        return Ok(Json(json!({ "data": { "profile": null, "is_expired": true } })));
    }

    let Some(owner) = UserRepo::find_by_id(&state.pool, code.owner_user_id).await? else {
        tracing::warn!(code = %code.code, owner_user_id = code.owner_user_id, "Usable code with no owner row");
        return Ok(Json(json!({ "data": null })));
    };

    let viewer_id = viewer.user_id();
    let recorded = ScanTracker::new(&state)
        .record(&code, &input.context, viewer_id)
        .await;

    let mut request_id = None;
    if let Some(viewer_id) = viewer_id {
        if viewer_id != code.owner_user_id {
            request_id =
                connect_identified_viewer(&state, viewer_id, code.owner_user_id, &recorded).await;
        }
    }

    let view = privacy::project_profile(&owner.into_owner_profile());

    Ok(Json(json!({
        "data": {
            "profile": view,
            "is_expired": false,
            "scan_id": recorded.scan_id,
            "session_id": recorded.session_id,
            "connection_request_id": request_id,
        }
    })))
}

/// Side effects of an identified (signed-in, non-self) scan: a connected
/// memory for the scanner and a pending connection request toward the
/// code owner. Both are best-effort on this read path.
async fn connect_identified_viewer(
    state: &AppState,
    viewer_id: DbId,
    owner_id: DbId,
    recorded: &crate::services::scan::RecordedScan,
) -> Option<DbId> {
    let meeting = json!({
        "method": METHOD_QR_SCAN,
        "scan_id": recorded.scan_id,
        "location": recorded.location,
    });

    let memory = NewConnectionMemory {
        from_user_id: viewer_id,
        to_user_id: Some(owner_id),
        invitation_id: None,
        first_meeting_data: meeting.clone(),
        email_invitation_sent: false,
    };
    if let Err(err) = ConnectionMemoryRepo::create_connected(&state.pool, &memory).await {
        tracing::warn!(error = %err, viewer_id, owner_id, "Failed to record scan memory");
    }

    match ConnectionRequestRepo::create_pending(&state.pool, viewer_id, owner_id, &meeting).await {
        Ok(request) => Some(request.id),
        Err(err) => {
            tracing::warn!(error = %err, viewer_id, owner_id, "Failed to create connection request from scan");
            None
        }
    }
}
