//! Scan event entity models. Rows are append-only and immutable.

use knect_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// Purpose tag for real code reads.
pub const PURPOSE_SCAN: &str = "scan";

/// Purpose tag for the audit row written when a code is minted.
pub const PURPOSE_GENERATION: &str = "generation";

/// A row from the `scan_events` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ScanEvent {
    pub id: DbId,
    pub scan_id: String,
    pub code: String,
    pub scanned_at: Timestamp,
    pub location: Option<String>,
    pub device_info: Option<String>,
    pub referrer: Option<String>,
    pub session_id: String,
    pub viewer_user_id: Option<DbId>,
    pub purpose: String,
}

/// Insert payload for a scan event.
#[derive(Debug, Clone)]
pub struct NewScanEvent {
    pub scan_id: String,
    pub code: String,
    pub location: Option<String>,
    pub device_info: Option<String>,
    pub referrer: Option<String>,
    pub session_id: String,
    pub viewer_user_id: Option<DbId>,
    pub purpose: &'static str,
}
