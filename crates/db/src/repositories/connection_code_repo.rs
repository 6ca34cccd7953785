//! Repository for the `connection_codes` table.

use knect_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::connection_code::ConnectionCode;

/// Column list for `connection_codes` queries.
const COLUMNS: &str = "id, owner_user_id, code, is_active, scan_count, last_scanned_at, \
     last_scan_location, created_at, expires_at";

/// Provides CRUD operations for connection codes.
pub struct ConnectionCodeRepo;

impl ConnectionCodeRepo {
    /// Insert a freshly minted code for a user.
    pub async fn create(
        pool: &PgPool,
        owner_user_id: DbId,
        code: &str,
        expires_at: Timestamp,
    ) -> Result<ConnectionCode, sqlx::Error> {
        let query = format!(
            "INSERT INTO connection_codes (owner_user_id, code, expires_at) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ConnectionCode>(&query)
            .bind(owner_user_id)
            .bind(code)
            .bind(expires_at)
            .fetch_one(pool)
            .await
    }

    /// Look up a code row by its exact code string, active or not.
    ///
    /// The caller decides between expired and usable; returning inactive
    /// rows is what lets validation distinguish "expired, ask for a new
    /// one" from "not found".
    pub async fn find_by_code(
        pool: &PgPool,
        code: &str,
    ) -> Result<Option<ConnectionCode>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM connection_codes WHERE code = $1");
        sqlx::query_as::<_, ConnectionCode>(&query)
            .bind(code)
            .fetch_optional(pool)
            .await
    }

    /// The owner's most recent still-usable code, if any.
    pub async fn find_active_for_owner(
        pool: &PgPool,
        owner_user_id: DbId,
        now: Timestamp,
    ) -> Result<Option<ConnectionCode>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM connection_codes \
             WHERE owner_user_id = $1 AND is_active = true AND expires_at > $2 \
             ORDER BY created_at DESC \
             LIMIT 1"
        );
        sqlx::query_as::<_, ConnectionCode>(&query)
            .bind(owner_user_id)
            .bind(now)
            .fetch_optional(pool)
            .await
    }

    /// Record a scan against a code.
    ///
    /// The increment is a single atomic UPDATE, never read-modify-write,
    /// so concurrent scans within the same instant cannot lose counts.
    pub async fn record_scan(
        pool: &PgPool,
        code_id: DbId,
        location: Option<&str>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE connection_codes \
             SET scan_count = scan_count + 1, \
                 last_scanned_at = NOW(), \
                 last_scan_location = COALESCE($2, last_scan_location) \
             WHERE id = $1",
        )
        .bind(code_id)
        .bind(location)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Deactivate a code the owner no longer wants live.
    ///
    /// Returns `true` if the code was found for the given owner and
    /// deactivated, `false` otherwise.
    pub async fn deactivate(
        pool: &PgPool,
        code_id: DbId,
        owner_user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE connection_codes \
             SET is_active = false \
             WHERE id = $1 AND owner_user_id = $2 AND is_active = true",
        )
        .bind(code_id)
        .bind(owner_user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
