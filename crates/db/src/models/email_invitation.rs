//! Email invitation entity models.

use knect_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `email_invitations` table.
///
/// `connection_code` is an invitation-namespace token (`invc_...`),
/// deliberately distinct from QR connection codes.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EmailInvitation {
    pub id: DbId,
    pub invitation_id: String,
    pub recipient_email: String,
    pub sender_user_id: DbId,
    pub connection_code: String,
    pub scan_snapshot: serde_json::Value,
    pub status: String,
    pub email_sent_at: Timestamp,
    pub expires_at: Timestamp,
}
