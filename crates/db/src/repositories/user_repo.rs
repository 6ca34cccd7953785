//! Repository for the `users` table (read-only in this service).

use knect_core::types::DbId;
use sqlx::PgPool;

use crate::models::user::User;

/// Column list for `users` queries.
const COLUMNS: &str = "id, email, display_name, avatar_url, phone, company, job_title, bio, \
     interests, location, allowed_fields, shared_links, default_shared_links, \
     created_at, updated_at";

/// Read access to user profile rows.
pub struct UserRepo;

impl UserRepo {
    /// Fetch a user by id.
    pub async fn find_by_id(pool: &PgPool, user_id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }
}
