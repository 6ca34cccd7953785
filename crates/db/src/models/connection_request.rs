//! Connection request entity models and DTOs.

use knect_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `connection_requests` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ConnectionRequest {
    pub id: DbId,
    pub requester_id: DbId,
    pub target_user_id: DbId,
    pub status: String,
    pub metadata: serde_json::Value,
    pub created_at: Timestamp,
    pub decided_at: Option<Timestamp>,
}

/// Approval payload: everything the target attaches when materializing
/// the contact.
#[derive(Debug, Clone, Deserialize)]
pub struct ApproveRequest {
    pub location: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Names of the requester's links the approver chooses to keep.
    /// Empty keeps everything the requester shares by default.
    #[serde(default)]
    pub shared_links_selection: Vec<String>,
    pub note: Option<String>,
    #[serde(default)]
    pub badges: Vec<String>,
    /// Closeness tier, 1..=3. Defaults to the outer ring.
    pub tier: Option<i16>,
}
