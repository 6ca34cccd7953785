//! Repository for the `contacts` table.

use knect_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::models::contact::{Contact, NewContact};

/// Column list for `contacts` queries.
const COLUMNS: &str = "id, owner_user_id, contact_user_id, request_id, display_name, company, \
     job_title, avatar_url, shared_links, tags, badges, note, tier, met_at, \
     met_location, created_at";

/// Read access plus the approval-time insert for contacts.
pub struct ContactRepo;

impl ContactRepo {
    /// Insert a contact. Only called from the request-approval
    /// transaction; the unique constraint on `request_id` backs the
    /// one-contact-per-approval invariant.
    pub async fn insert<'e>(
        executor: impl PgExecutor<'e>,
        contact: &NewContact,
    ) -> Result<Contact, sqlx::Error> {
        let query = format!(
            "INSERT INTO contacts \
             (owner_user_id, contact_user_id, request_id, display_name, company, job_title, \
              avatar_url, shared_links, tags, badges, note, tier, met_at, met_location) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Contact>(&query)
            .bind(contact.owner_user_id)
            .bind(contact.contact_user_id)
            .bind(contact.request_id)
            .bind(&contact.display_name)
            .bind(&contact.company)
            .bind(&contact.job_title)
            .bind(&contact.avatar_url)
            .bind(&contact.shared_links)
            .bind(&contact.tags)
            .bind(&contact.badges)
            .bind(&contact.note)
            .bind(contact.tier)
            .bind(contact.met_at)
            .bind(&contact.met_location)
            .fetch_one(executor)
            .await
    }

    /// The contact materialized by a given request, if any.
    pub async fn find_by_request(
        pool: &PgPool,
        request_id: DbId,
    ) -> Result<Option<Contact>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM contacts WHERE request_id = $1");
        sqlx::query_as::<_, Contact>(&query)
            .bind(request_id)
            .fetch_optional(pool)
            .await
    }

    /// List a user's contacts, newest first.
    pub async fn list_for_owner(
        pool: &PgPool,
        owner_user_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Contact>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM contacts \
             WHERE owner_user_id = $1 \
             ORDER BY created_at DESC \
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Contact>(&query)
            .bind(owner_user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }
}
