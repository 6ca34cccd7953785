//! Connection code entity models.

use knect_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `connection_codes` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ConnectionCode {
    pub id: DbId,
    pub owner_user_id: DbId,
    pub code: String,
    pub is_active: bool,
    pub scan_count: i64,
    pub last_scanned_at: Option<Timestamp>,
    pub last_scan_location: Option<String>,
    pub created_at: Timestamp,
    pub expires_at: Timestamp,
}
