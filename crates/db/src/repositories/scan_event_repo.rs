//! Repository for the append-only `scan_events` table.

use sqlx::PgPool;

use crate::models::scan_event::{NewScanEvent, ScanEvent};

/// Column list for `scan_events` queries.
const COLUMNS: &str = "id, scan_id, code, scanned_at, location, device_info, referrer, \
     session_id, viewer_user_id, purpose";

/// Insert and read scan telemetry. There are no update or delete
/// operations: scan events are immutable once written.
pub struct ScanEventRepo;

impl ScanEventRepo {
    /// Append a scan event.
    pub async fn insert(pool: &PgPool, event: &NewScanEvent) -> Result<ScanEvent, sqlx::Error> {
        let query = format!(
            "INSERT INTO scan_events \
             (scan_id, code, location, device_info, referrer, session_id, viewer_user_id, purpose) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ScanEvent>(&query)
            .bind(&event.scan_id)
            .bind(&event.code)
            .bind(&event.location)
            .bind(&event.device_info)
            .bind(&event.referrer)
            .bind(&event.session_id)
            .bind(event.viewer_user_id)
            .bind(event.purpose)
            .fetch_one(pool)
            .await
    }

    /// List events for a code, newest first.
    pub async fn list_for_code(
        pool: &PgPool,
        code: &str,
        limit: i64,
    ) -> Result<Vec<ScanEvent>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM scan_events \
             WHERE code = $1 \
             ORDER BY scanned_at DESC \
             LIMIT $2"
        );
        sqlx::query_as::<_, ScanEvent>(&query)
            .bind(code)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Number of events recorded for a code.
    pub async fn count_for_code(pool: &PgPool, code: &str) -> Result<i64, sqlx::Error> {
        let count: Option<i64> = sqlx::query_scalar("SELECT COUNT(*) FROM scan_events WHERE code = $1")
            .bind(code)
            .fetch_one(pool)
            .await?;
        Ok(count.unwrap_or(0))
    }
}
