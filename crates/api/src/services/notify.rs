//! In-app notification dispatch.
//!
//! Notifications are a side effect of approvals and registrations, never
//! the point of the request. Dispatch failures are logged and swallowed
//! so the triggering mutation still succeeds.

use knect_core::connection::{NOTIFY_CONNECTION_ACCEPTED, NOTIFY_INVITATION_REGISTERED};
use knect_core::types::DbId;
use knect_db::repositories::{NotificationRepo, UserRepo};
use knect_db::DbPool;
use serde_json::json;

use crate::state::AppState;

/// Writes in-app notifications, resolving the actor's display info.
pub struct NotificationDispatcher {
    pool: DbPool,
}

impl NotificationDispatcher {
    pub fn new(state: &AppState) -> Self {
        Self {
            pool: state.pool.clone(),
        }
    }

    /// Notify a requester that their connection request was approved.
    pub async fn connection_accepted(&self, requester_id: DbId, approver_id: DbId) {
        let body = match self.actor_body(approver_id).await {
            Some(mut body) => {
                body["message"] = json!(format!(
                    "{} accepted your connection request",
                    body["actor_name"].as_str().unwrap_or("Someone")
                ));
                body
            }
            None => json!({ "message": "Your connection request was accepted" }),
        };
        self.dispatch(requester_id, NOTIFY_CONNECTION_ACCEPTED, Some(approver_id), body)
            .await;
    }

    /// Notify an invitation sender that their recipient registered and
    /// the shared memory is now connected.
    pub async fn invitation_registered(&self, sender_id: DbId, new_user_id: DbId) {
        let body = match self.actor_body(new_user_id).await {
            Some(mut body) => {
                body["message"] = json!(format!(
                    "{} joined from your invitation",
                    body["actor_name"].as_str().unwrap_or("Someone")
                ));
                body
            }
            None => json!({ "message": "Someone joined from your invitation" }),
        };
        self.dispatch(sender_id, NOTIFY_INVITATION_REGISTERED, Some(new_user_id), body)
            .await;
    }

    /// Minimal actor payload for notification rendering.
    async fn actor_body(&self, actor_id: DbId) -> Option<serde_json::Value> {
        match UserRepo::find_by_id(&self.pool, actor_id).await {
            Ok(Some(actor)) => Some(json!({
                "actor_name": actor.display_name,
                "actor_avatar_url": actor.avatar_url,
            })),
            Ok(None) => None,
            Err(err) => {
                tracing::warn!(error = %err, actor_id, "Failed to load notification actor");
                None
            }
        }
    }

    async fn dispatch(
        &self,
        user_id: DbId,
        kind: &str,
        actor_user_id: Option<DbId>,
        body: serde_json::Value,
    ) {
        if let Err(err) =
            NotificationRepo::create(&self.pool, user_id, kind, actor_user_id, &body).await
        {
            tracing::warn!(error = %err, user_id, kind, "Failed to write notification");
        }
    }
}
