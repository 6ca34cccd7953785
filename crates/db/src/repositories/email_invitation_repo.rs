//! Repository for the `email_invitations` table.

use knect_core::connection::{INVITATION_OPENED, INVITATION_SENT};
use knect_core::types::{DbId, Timestamp};
use sqlx::{PgExecutor, PgPool};

use crate::models::email_invitation::EmailInvitation;

/// Column list for `email_invitations` queries.
const COLUMNS: &str = "id, invitation_id, recipient_email, sender_user_id, connection_code, \
     scan_snapshot, status, email_sent_at, expires_at";

/// Provides CRUD operations for email invitations.
pub struct EmailInvitationRepo;

impl EmailInvitationRepo {
    /// Insert an invitation in `sent` status.
    ///
    /// Takes an executor rather than a pool so the invitation service can
    /// run the insert inside the same transaction as the email dispatch:
    /// a failed send rolls the row back instead of leaving an orphaned
    /// `sent` record the recipient never received.
    pub async fn insert<'e>(
        executor: impl PgExecutor<'e>,
        invitation_id: &str,
        recipient_email: &str,
        sender_user_id: DbId,
        connection_code: &str,
        scan_snapshot: &serde_json::Value,
        expires_at: Timestamp,
    ) -> Result<EmailInvitation, sqlx::Error> {
        let query = format!(
            "INSERT INTO email_invitations \
             (invitation_id, recipient_email, sender_user_id, connection_code, \
              scan_snapshot, expires_at) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, EmailInvitation>(&query)
            .bind(invitation_id)
            .bind(recipient_email)
            .bind(sender_user_id)
            .bind(connection_code)
            .bind(scan_snapshot)
            .bind(expires_at)
            .fetch_one(executor)
            .await
    }

    /// Look up an invitation by the exact token pair, redeemable only.
    ///
    /// Requires both tokens to match, a non-terminal status, and an
    /// unexpired window. Any mismatch yields `None` with no indication of
    /// which check failed.
    pub async fn find_redeemable(
        pool: &PgPool,
        invitation_id: &str,
        connection_code: &str,
        now: Timestamp,
    ) -> Result<Option<EmailInvitation>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM email_invitations \
             WHERE invitation_id = $1 AND connection_code = $2 \
               AND status IN ($3, $4) AND expires_at >= $5"
        );
        sqlx::query_as::<_, EmailInvitation>(&query)
            .bind(invitation_id)
            .bind(connection_code)
            .bind(INVITATION_SENT)
            .bind(INVITATION_OPENED)
            .bind(now)
            .fetch_optional(pool)
            .await
    }

    /// Record that the registration page was viewed with a valid pair.
    ///
    /// `sent -> opened` is telemetry, not a terminal transition; opened
    /// invitations remain redeemable.
    pub async fn mark_opened(pool: &PgPool, invitation_id: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE email_invitations \
             SET status = $2 \
             WHERE invitation_id = $1 AND status = $3",
        )
        .bind(invitation_id)
        .bind(INVITATION_OPENED)
        .bind(INVITATION_SENT)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Flip all invitations past their window to the terminal `expired`
    /// status. Returns the number of rows transitioned.
    pub async fn expire_stale(pool: &PgPool, now: Timestamp) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE email_invitations \
             SET status = 'expired' \
             WHERE status IN ($2, $3) AND expires_at < $1",
        )
        .bind(now)
        .bind(INVITATION_SENT)
        .bind(INVITATION_OPENED)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Fetch an invitation by its public identifier, any status.
    pub async fn find_by_invitation_id(
        pool: &PgPool,
        invitation_id: &str,
    ) -> Result<Option<EmailInvitation>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM email_invitations WHERE invitation_id = $1");
        sqlx::query_as::<_, EmailInvitation>(&query)
            .bind(invitation_id)
            .fetch_optional(pool)
            .await
    }
}
