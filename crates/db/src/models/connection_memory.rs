//! Connection memory entity models.

use knect_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `connection_memories` table.
///
/// Created `pending` at scan time and resolved to `connected` exactly
/// once, when the counterpart identity is known. Invitation-path rows
/// carry the `invitation_id` correlation token and are resolved by exact
/// match on it.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ConnectionMemory {
    pub id: DbId,
    pub from_user_id: DbId,
    pub to_user_id: Option<DbId>,
    pub invitation_id: Option<String>,
    pub first_meeting_data: serde_json::Value,
    pub connection_status: String,
    pub email_invitation_sent: bool,
    pub registration_completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Insert payload for a connection memory.
#[derive(Debug, Clone)]
pub struct NewConnectionMemory {
    pub from_user_id: DbId,
    pub to_user_id: Option<DbId>,
    pub invitation_id: Option<String>,
    pub first_meeting_data: serde_json::Value,
    pub email_invitation_sent: bool,
}
