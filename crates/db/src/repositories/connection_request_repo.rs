//! Repository for the `connection_requests` table.

use knect_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::connection_request::ConnectionRequest;
use crate::models::contact::{Contact, NewContact};
use crate::repositories::ContactRepo;

/// Column list for `connection_requests` queries.
const COLUMNS: &str =
    "id, requester_id, target_user_id, status, metadata, created_at, decided_at";

/// Provides create/approve/decline operations for connection requests.
///
/// `create_pending` is the sole entry point for proposing a relationship;
/// no code path here or elsewhere inserts a request in any status other
/// than `pending`.
pub struct ConnectionRequestRepo;

impl ConnectionRequestRepo {
    /// Create a pending request, or return the existing pending one.
    ///
    /// The partial unique index on (requester, target) WHERE pending
    /// makes duplicate rapid scans collapse into a single request instead
    /// of stacking duplicates.
    pub async fn create_pending(
        pool: &PgPool,
        requester_id: DbId,
        target_user_id: DbId,
        metadata: &serde_json::Value,
    ) -> Result<ConnectionRequest, sqlx::Error> {
        let insert = format!(
            "INSERT INTO connection_requests (requester_id, target_user_id, metadata) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (requester_id, target_user_id) WHERE status = 'pending' \
             DO NOTHING \
             RETURNING {COLUMNS}"
        );
        let created = sqlx::query_as::<_, ConnectionRequest>(&insert)
            .bind(requester_id)
            .bind(target_user_id)
            .bind(metadata)
            .fetch_optional(pool)
            .await?;

        if let Some(request) = created {
            return Ok(request);
        }

        // Conflict path: a pending request for this pair already exists.
        let select = format!(
            "SELECT {COLUMNS} FROM connection_requests \
             WHERE requester_id = $1 AND target_user_id = $2 AND status = 'pending'"
        );
        sqlx::query_as::<_, ConnectionRequest>(&select)
            .bind(requester_id)
            .bind(target_user_id)
            .fetch_one(pool)
            .await
    }

    /// Fetch a request by id.
    pub async fn find_by_id(
        pool: &PgPool,
        request_id: DbId,
    ) -> Result<Option<ConnectionRequest>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM connection_requests WHERE id = $1");
        sqlx::query_as::<_, ConnectionRequest>(&query)
            .bind(request_id)
            .fetch_optional(pool)
            .await
    }

    /// Incoming pending requests for a target, oldest first.
    pub async fn list_pending_for_target(
        pool: &PgPool,
        target_user_id: DbId,
    ) -> Result<Vec<ConnectionRequest>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM connection_requests \
             WHERE target_user_id = $1 AND status = 'pending' \
             ORDER BY created_at ASC"
        );
        sqlx::query_as::<_, ConnectionRequest>(&query)
            .bind(target_user_id)
            .fetch_all(pool)
            .await
    }

    /// Approve a pending request and materialize its contact.
    ///
    /// One transaction flips the request to `approved` and inserts
    /// exactly one contact. Returns `None` if the request was no longer
    /// pending (a concurrent decision won); callers then re-read the
    /// request to report the terminal state that stuck.
    pub async fn approve_and_create_contact(
        pool: &PgPool,
        request_id: DbId,
        now: Timestamp,
        contact: &NewContact,
    ) -> Result<Option<Contact>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let result = sqlx::query(
            "UPDATE connection_requests \
             SET status = 'approved', decided_at = $2 \
             WHERE id = $1 AND status = 'pending'",
        )
        .bind(request_id)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        let created = ContactRepo::insert(&mut *tx, contact).await?;
        tx.commit().await?;
        Ok(Some(created))
    }

    /// Decline a pending request.
    ///
    /// Returns `true` if the request transitioned, `false` if it was
    /// already decided. No contact is ever produced on this path.
    pub async fn decline(
        pool: &PgPool,
        request_id: DbId,
        now: Timestamp,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE connection_requests \
             SET status = 'declined', decided_at = $2 \
             WHERE id = $1 AND status = 'pending'",
        )
        .bind(request_id)
        .bind(now)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
