//! Email invitation dispatch and redemption.
//!
//! Dispatch runs inside a single database transaction: the invitation
//! row, its correlated pending connection memory, and the email send
//! either all happen or none do. A rejected email rolls the rows back so
//! the sender can retry without leaving an invitation nobody received.

use std::sync::Arc;

use knect_core::clock::Clock;
use knect_core::codes;
use knect_core::types::DbId;
use knect_db::models::connection_memory::{ConnectionMemory, NewConnectionMemory};
use knect_db::models::email_invitation::EmailInvitation;
use knect_db::models::user::User;
use knect_db::repositories::{ConnectionMemoryRepo, EmailInvitationRepo};
use knect_db::DbPool;

use crate::error::{AppError, AppResult};
use crate::services::mailer::{EmailMessage, Mailer};
use crate::state::AppState;

/// Drives the invitation lifecycle: dispatch, validation, redemption.
pub struct InvitationService {
    pool: DbPool,
    clock: Arc<dyn Clock>,
    mailer: Arc<dyn Mailer>,
    public_origin: String,
}

impl InvitationService {
    pub fn new(state: &AppState) -> Self {
        Self {
            pool: state.pool.clone(),
            clock: Arc::clone(&state.clock),
            mailer: Arc::clone(&state.mailer),
            public_origin: state.config.public_origin.clone(),
        }
    }

    /// Dispatch an invitation from `sender` to a non-user email address.
    ///
    /// Mints both tokens, inserts the invitation and its correlated
    /// pending memory in one transaction, sends the email, and commits
    /// only when the send was accepted.
    pub async fn send(
        &self,
        sender: &User,
        recipient_email: &str,
        scan_snapshot: serde_json::Value,
    ) -> AppResult<EmailInvitation> {
        let now = self.clock.now();
        let invitation_id = codes::mint_invitation_id(self.clock.as_ref());
        let invitation_code = codes::mint_invitation_code(self.clock.as_ref());
        let expires_at = codes::invitation_expiry(now);

        let mut tx = self.pool.begin().await?;

        let invitation = EmailInvitationRepo::insert(
            &mut *tx,
            &invitation_id,
            recipient_email,
            sender.id,
            &invitation_code,
            &scan_snapshot,
            expires_at,
        )
        .await?;

        ConnectionMemoryRepo::create_pending(
            &mut *tx,
            &NewConnectionMemory {
                from_user_id: sender.id,
                to_user_id: None,
                invitation_id: Some(invitation_id.clone()),
                first_meeting_data: scan_snapshot,
                email_invitation_sent: true,
            },
        )
        .await?;

        let message = self.compose(sender, &invitation);
        if let Err(err) = self.mailer.send(&message).await {
            // Dropping the transaction rolls both inserts back.
            tracing::warn!(
                error = %err,
                invitation_id = %invitation_id,
                "Invitation email rejected; rolling back invitation"
            );
            return Err(AppError::EmailDelivery(err.to_string()));
        }

        tx.commit().await?;

        tracing::info!(
            invitation_id = %invitation.invitation_id,
            sender_user_id = sender.id,
            "Invitation dispatched"
        );
        Ok(invitation)
    }

    /// Look up a redeemable invitation by its exact token pair and record
    /// that the registration page was viewed.
    ///
    /// `None` covers unknown, mismatched, expired, and terminal
    /// invitations alike; callers render all of them the same way.
    pub async fn validate(
        &self,
        invitation_id: &str,
        invitation_code: &str,
    ) -> AppResult<Option<EmailInvitation>> {
        let now = self.clock.now();
        let Some(invitation) =
            EmailInvitationRepo::find_redeemable(&self.pool, invitation_id, invitation_code, now)
                .await?
        else {
            return Ok(None);
        };

        // `sent -> opened` is telemetry; losing it never blocks the view.
        if let Err(err) = EmailInvitationRepo::mark_opened(&self.pool, invitation_id).await {
            tracing::warn!(error = %err, invitation_id, "Failed to mark invitation opened");
        }

        Ok(Some(invitation))
    }

    /// Redeem an invitation for a freshly registered user.
    ///
    /// Requires the exact token pair, then resolves the invitation and
    /// its correlated memory together. Returns `None` when the pair does
    /// not match a redeemable invitation or the memory is already
    /// resolved; redemption is exactly-once.
    pub async fn complete(
        &self,
        invitation_id: &str,
        invitation_code: &str,
        new_user_id: DbId,
    ) -> AppResult<Option<(EmailInvitation, ConnectionMemory)>> {
        let now = self.clock.now();

        if EmailInvitationRepo::find_redeemable(&self.pool, invitation_id, invitation_code, now)
            .await?
            .is_none()
        {
            return Ok(None);
        }

        let resolved =
            ConnectionMemoryRepo::resolve_registration(&self.pool, invitation_id, new_user_id, now)
                .await?;

        if let Some((invitation, _)) = &resolved {
            tracing::info!(
                invitation_id = %invitation.invitation_id,
                new_user_id,
                "Invitation redeemed; memory resolved to connected"
            );
        }
        Ok(resolved)
    }

    /// Build the invitation email carrying the registration URL.
    fn compose(&self, sender: &User, invitation: &EmailInvitation) -> EmailMessage {
        let url = codes::registration_url(
            &self.public_origin,
            &invitation.invitation_id,
            &invitation.connection_code,
        );
        EmailMessage {
            to: invitation.recipient_email.clone(),
            subject: format!("{} wants to connect with you", sender.display_name),
            body: format!(
                "Hi,\n\n{} met you and would like to stay in touch.\n\n\
                 Create your account to connect:\n{url}\n\n\
                 This invitation expires in {} days.\n",
                sender.display_name,
                codes::INVITATION_TTL_DAYS,
            ),
        }
    }
}
