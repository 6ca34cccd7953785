//! Repository for the `connection_memories` table.

use knect_core::connection::{MEMORY_CONNECTED, MEMORY_PENDING};
use knect_core::types::{DbId, Timestamp};
use sqlx::{PgExecutor, PgPool};

use crate::models::connection_memory::{ConnectionMemory, NewConnectionMemory};
use crate::models::email_invitation::EmailInvitation;

/// Column list for `connection_memories` queries.
const MEMORY_COLUMNS: &str = "id, from_user_id, to_user_id, invitation_id, first_meeting_data, \
     connection_status, email_invitation_sent, registration_completed_at, \
     created_at, updated_at";

/// Column list for the invitation rows touched during resolution.
const INVITATION_COLUMNS: &str = "id, invitation_id, recipient_email, sender_user_id, connection_code, \
     scan_snapshot, status, email_sent_at, expires_at";

/// Provides CRUD operations and the registration-resolution transaction
/// for connection memories.
pub struct ConnectionMemoryRepo;

impl ConnectionMemoryRepo {
    /// Insert a memory in `pending` status (counterpart not yet known).
    ///
    /// Takes an executor so the invitation service can create the memory
    /// inside the same transaction as the invitation row it correlates
    /// with.
    pub async fn create_pending<'e>(
        executor: impl PgExecutor<'e>,
        memory: &NewConnectionMemory,
    ) -> Result<ConnectionMemory, sqlx::Error> {
        Self::insert(executor, memory, MEMORY_PENDING, false).await
    }

    /// Insert a memory already resolved to `connected`.
    ///
    /// Used for direct authenticated scans, where both parties are known
    /// at scan time.
    pub async fn create_connected<'e>(
        executor: impl PgExecutor<'e>,
        memory: &NewConnectionMemory,
    ) -> Result<ConnectionMemory, sqlx::Error> {
        Self::insert(executor, memory, MEMORY_CONNECTED, true).await
    }

    async fn insert<'e>(
        executor: impl PgExecutor<'e>,
        memory: &NewConnectionMemory,
        status: &str,
        resolved_now: bool,
    ) -> Result<ConnectionMemory, sqlx::Error> {
        let query = format!(
            "INSERT INTO connection_memories \
             (from_user_id, to_user_id, invitation_id, first_meeting_data, \
              connection_status, email_invitation_sent, registration_completed_at) \
             VALUES ($1, $2, $3, $4, $5, $6, CASE WHEN $7 THEN NOW() ELSE NULL END) \
             RETURNING {MEMORY_COLUMNS}"
        );
        sqlx::query_as::<_, ConnectionMemory>(&query)
            .bind(memory.from_user_id)
            .bind(memory.to_user_id)
            .bind(&memory.invitation_id)
            .bind(&memory.first_meeting_data)
            .bind(status)
            .bind(memory.email_invitation_sent)
            .bind(resolved_now)
            .fetch_one(executor)
            .await
    }

    /// Resolve an invitation-path memory after the recipient registers.
    ///
    /// One transaction flips the invitation to `registered` and the
    /// correlated memory to `connected`; if either row is missing or the
    /// invitation already reached a terminal state, nothing is written
    /// and `None` is returned. Partial completion (memory resolved but
    /// invitation still `sent`) is impossible by construction.
    pub async fn resolve_registration(
        pool: &PgPool,
        invitation_id: &str,
        new_user_id: DbId,
        now: Timestamp,
    ) -> Result<Option<(EmailInvitation, ConnectionMemory)>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let invitation_query = format!(
            "UPDATE email_invitations \
             SET status = 'registered' \
             WHERE invitation_id = $1 \
               AND status IN ('sent', 'opened') \
               AND expires_at >= $2 \
             RETURNING {INVITATION_COLUMNS}"
        );
        let invitation = sqlx::query_as::<_, EmailInvitation>(&invitation_query)
            .bind(invitation_id)
            .bind(now)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(invitation) = invitation else {
            // Terminal, expired, or unknown invitation: the drop of `tx`
            // rolls everything back.
            return Ok(None);
        };

        let memory_query = format!(
            "UPDATE connection_memories \
             SET to_user_id = $2, \
                 connection_status = 'connected', \
                 registration_completed_at = $3, \
                 updated_at = NOW() \
             WHERE invitation_id = $1 AND connection_status = 'pending' \
             RETURNING {MEMORY_COLUMNS}"
        );
        let memory = sqlx::query_as::<_, ConnectionMemory>(&memory_query)
            .bind(invitation_id)
            .bind(new_user_id)
            .bind(now)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(memory) = memory else {
            tracing::warn!(
                invitation_id,
                "Redeemable invitation has no pending memory; rolling back"
            );
            return Ok(None);
        };

        tx.commit().await?;
        Ok(Some((invitation, memory)))
    }

    /// Update the status of memories between two identified users.
    ///
    /// Used when the target declines a request: the first-meeting record
    /// is kept but marked `declined`.
    pub async fn update_status_between(
        pool: &PgPool,
        from_user_id: DbId,
        to_user_id: DbId,
        status: &str,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE connection_memories \
             SET connection_status = $3, updated_at = NOW() \
             WHERE from_user_id = $1 AND to_user_id = $2 \
               AND connection_status <> $3",
        )
        .bind(from_user_id)
        .bind(to_user_id)
        .bind(status)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Fetch a memory by its correlation token.
    pub async fn find_by_invitation_id(
        pool: &PgPool,
        invitation_id: &str,
    ) -> Result<Option<ConnectionMemory>, sqlx::Error> {
        let query =
            format!("SELECT {MEMORY_COLUMNS} FROM connection_memories WHERE invitation_id = $1");
        sqlx::query_as::<_, ConnectionMemory>(&query)
            .bind(invitation_id)
            .fetch_optional(pool)
            .await
    }
}
