//! Contact entity models.
//!
//! Contacts exist only as the side effect of an approved connection
//! request; nothing else inserts into this table.

use knect_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `contacts` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Contact {
    pub id: DbId,
    pub owner_user_id: DbId,
    pub contact_user_id: DbId,
    pub request_id: DbId,
    pub display_name: String,
    pub company: Option<String>,
    pub job_title: Option<String>,
    pub avatar_url: Option<String>,
    pub shared_links: serde_json::Value,
    pub tags: serde_json::Value,
    pub badges: serde_json::Value,
    pub note: Option<String>,
    pub tier: i16,
    pub met_at: Option<Timestamp>,
    pub met_location: Option<String>,
    pub created_at: Timestamp,
}

/// Insert payload for a contact, assembled during request approval.
#[derive(Debug, Clone)]
pub struct NewContact {
    pub owner_user_id: DbId,
    pub contact_user_id: DbId,
    pub request_id: DbId,
    pub display_name: String,
    pub company: Option<String>,
    pub job_title: Option<String>,
    pub avatar_url: Option<String>,
    pub shared_links: serde_json::Value,
    pub tags: serde_json::Value,
    pub badges: serde_json::Value,
    pub note: Option<String>,
    pub tier: i16,
    pub met_at: Option<Timestamp>,
    pub met_location: Option<String>,
}
