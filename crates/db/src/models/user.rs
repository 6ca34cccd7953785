//! User profile models.
//!
//! Account management lives elsewhere; this crate only reads user rows
//! for profile projection, contact snapshots, and notification display.

use knect_core::privacy::OwnerProfile;
use knect_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `users` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    pub email: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub job_title: Option<String>,
    pub bio: Option<String>,
    pub interests: serde_json::Value,
    pub location: Option<String>,
    pub allowed_fields: serde_json::Value,
    pub shared_links: serde_json::Value,
    pub default_shared_links: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl User {
    /// Convert into the owner-side input of the privacy projection.
    pub fn into_owner_profile(self) -> OwnerProfile {
        OwnerProfile {
            user_id: self.id,
            display_name: self.display_name,
            avatar_url: self.avatar_url,
            email: Some(self.email),
            phone: self.phone,
            company: self.company,
            job_title: self.job_title,
            bio: self.bio,
            interests: self.interests,
            location: self.location,
            allowed_fields: self.allowed_fields,
            shared_links: self.shared_links,
            default_shared_links: self.default_shared_links,
        }
    }
}
