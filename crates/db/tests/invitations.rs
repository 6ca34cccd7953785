//! Integration tests for email invitations and registration resolution.

use chrono::{Duration, Utc};
use knect_core::connection::{
    INVITATION_OPENED, INVITATION_REGISTERED, MEMORY_CONNECTED, MEMORY_PENDING,
    METHOD_EMAIL_INVITATION,
};
use knect_db::models::connection_memory::NewConnectionMemory;
use knect_db::repositories::{ConnectionMemoryRepo, EmailInvitationRepo};
use serde_json::json;
use sqlx::PgPool;

async fn seed_user(pool: &PgPool, email: &str) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO users (email, display_name) VALUES ($1, $2) RETURNING id",
    )
    .bind(email)
    .bind("Test User")
    .fetch_one(pool)
    .await
    .unwrap()
}

/// Insert an invitation plus its correlated pending memory, the way the
/// invitation service does.
async fn seed_invitation(
    pool: &PgPool,
    sender: i64,
    invitation_id: &str,
    code: &str,
    recipient: &str,
) {
    EmailInvitationRepo::insert(
        pool,
        invitation_id,
        recipient,
        sender,
        code,
        &json!({"method": METHOD_EMAIL_INVITATION}),
        Utc::now() + Duration::days(7),
    )
    .await
    .unwrap();

    ConnectionMemoryRepo::create_pending(
        pool,
        &NewConnectionMemory {
            from_user_id: sender,
            to_user_id: None,
            invitation_id: Some(invitation_id.to_string()),
            first_meeting_data: json!({"method": METHOD_EMAIL_INVITATION}),
            email_invitation_sent: true,
        },
    )
    .await
    .unwrap();
}

#[sqlx::test(migrations = "../../migrations")]
async fn redeemable_requires_exact_token_pair(pool: PgPool) {
    let sender = seed_user(&pool, "sender@example.com").await;
    seed_invitation(&pool, sender, "inv_1_a", "invc_1_a", "new@example.com").await;
    let now = Utc::now();

    assert!(
        EmailInvitationRepo::find_redeemable(&pool, "inv_1_a", "invc_1_a", now)
            .await
            .unwrap()
            .is_some()
    );
    // Either token wrong: no hit, no hint which one failed.
    assert!(
        EmailInvitationRepo::find_redeemable(&pool, "inv_1_a", "invc_1_WRONG", now)
            .await
            .unwrap()
            .is_none()
    );
    assert!(
        EmailInvitationRepo::find_redeemable(&pool, "inv_1_WRONG", "invc_1_a", now)
            .await
            .unwrap()
            .is_none()
    );
}

#[sqlx::test(migrations = "../../migrations")]
async fn opened_invitation_stays_redeemable(pool: PgPool) {
    let sender = seed_user(&pool, "sender@example.com").await;
    seed_invitation(&pool, sender, "inv_1_a", "invc_1_a", "new@example.com").await;

    EmailInvitationRepo::mark_opened(&pool, "inv_1_a").await.unwrap();

    let invitation = EmailInvitationRepo::find_redeemable(&pool, "inv_1_a", "invc_1_a", Utc::now())
        .await
        .unwrap()
        .expect("opened invitation must still redeem");
    assert_eq!(invitation.status, INVITATION_OPENED);
}

#[sqlx::test(migrations = "../../migrations")]
async fn past_window_invitation_is_not_redeemable(pool: PgPool) {
    let sender = seed_user(&pool, "sender@example.com").await;
    seed_invitation(&pool, sender, "inv_1_a", "invc_1_a", "new@example.com").await;

    // Evaluate "now" as eight days in the future.
    let later = Utc::now() + Duration::days(8);
    assert!(
        EmailInvitationRepo::find_redeemable(&pool, "inv_1_a", "invc_1_a", later)
            .await
            .unwrap()
            .is_none()
    );

    let expired = EmailInvitationRepo::expire_stale(&pool, later).await.unwrap();
    assert_eq!(expired, 1);
    let row = EmailInvitationRepo::find_by_invitation_id(&pool, "inv_1_a")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.status, "expired");
}

#[sqlx::test(migrations = "../../migrations")]
async fn registration_resolves_invitation_and_memory_together(pool: PgPool) {
    let sender = seed_user(&pool, "sender@example.com").await;
    let newcomer = seed_user(&pool, "new@example.com").await;
    seed_invitation(&pool, sender, "inv_1_a", "invc_1_a", "new@example.com").await;

    let (invitation, memory) =
        ConnectionMemoryRepo::resolve_registration(&pool, "inv_1_a", newcomer, Utc::now())
            .await
            .unwrap()
            .expect("resolution should succeed");

    assert_eq!(invitation.status, INVITATION_REGISTERED);
    assert_eq!(memory.connection_status, MEMORY_CONNECTED);
    assert_eq!(memory.to_user_id, Some(newcomer));
    assert!(memory.registration_completed_at.is_some());

    // The invitation is terminal: the same pair no longer redeems.
    assert!(
        EmailInvitationRepo::find_redeemable(&pool, "inv_1_a", "invc_1_a", Utc::now())
            .await
            .unwrap()
            .is_none()
    );

    // And resolving again is a no-op.
    assert!(
        ConnectionMemoryRepo::resolve_registration(&pool, "inv_1_a", newcomer, Utc::now())
            .await
            .unwrap()
            .is_none()
    );
}

#[sqlx::test(migrations = "../../migrations")]
async fn resolution_matches_on_correlation_token_not_recency(pool: PgPool) {
    let sender = seed_user(&pool, "sender@example.com").await;
    let first = seed_user(&pool, "first@example.com").await;

    // Two near-simultaneous invitations from the same sender to different
    // recipients. Registering against the OLDER invitation must resolve
    // the OLDER memory, not the most recent pending one.
    seed_invitation(&pool, sender, "inv_1_older", "invc_1_older", "first@example.com").await;
    seed_invitation(&pool, sender, "inv_1_newer", "invc_1_newer", "second@example.com").await;

    let (_, memory) =
        ConnectionMemoryRepo::resolve_registration(&pool, "inv_1_older", first, Utc::now())
            .await
            .unwrap()
            .unwrap();
    assert_eq!(memory.invitation_id.as_deref(), Some("inv_1_older"));
    assert_eq!(memory.to_user_id, Some(first));

    // The newer invitation's memory is untouched.
    let newer = ConnectionMemoryRepo::find_by_invitation_id(&pool, "inv_1_newer")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(newer.connection_status, MEMORY_PENDING);
    assert_eq!(newer.to_user_id, None);
}

#[sqlx::test(migrations = "../../migrations")]
async fn direct_scan_memory_is_connected_immediately(pool: PgPool) {
    let sharer = seed_user(&pool, "sharer@example.com").await;
    let viewer = seed_user(&pool, "viewer@example.com").await;

    let memory = ConnectionMemoryRepo::create_connected(
        &pool,
        &NewConnectionMemory {
            from_user_id: sharer,
            to_user_id: Some(viewer),
            invitation_id: None,
            first_meeting_data: json!({"method": "qr_scan"}),
            email_invitation_sent: false,
        },
    )
    .await
    .unwrap();

    assert_eq!(memory.connection_status, MEMORY_CONNECTED);
    assert!(memory.registration_completed_at.is_some());
}
