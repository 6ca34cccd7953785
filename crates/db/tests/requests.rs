//! Integration tests for connection requests and contact materialization.

use chrono::Utc;
use knect_core::connection::{REQUEST_APPROVED, REQUEST_DECLINED, REQUEST_PENDING};
use knect_db::models::contact::NewContact;
use knect_db::repositories::{ConnectionRequestRepo, ContactRepo};
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

fn contact_for(request_id: i64, owner: i64, counterpart: i64, tier: i16) -> NewContact {
    NewContact {
        owner_user_id: owner,
        contact_user_id: counterpart,
        request_id,
        display_name: "Test User".to_string(),
        company: None,
        job_title: None,
        avatar_url: None,
        shared_links: json!({}),
        tags: json!(["conference"]),
        badges: json!([]),
        note: None,
        tier,
        met_at: None,
        met_location: None,
    }
}

#[sqlx::test(migrations = "../../migrations")]
async fn create_always_starts_pending(pool: PgPool) {
    let requester = seed_user(&pool, "requester@example.com").await;
    let target = seed_user(&pool, "target@example.com").await;

    let request =
        ConnectionRequestRepo::create_pending(&pool, requester, target, &json!({"tags": []}))
            .await
            .unwrap();
    assert_eq!(request.status, REQUEST_PENDING);
    assert!(request.decided_at.is_none());
}

#[sqlx::test(migrations = "../../migrations")]
async fn duplicate_rapid_scans_collapse_into_one_pending_request(pool: PgPool) {
    let requester = seed_user(&pool, "requester@example.com").await;
    let target = seed_user(&pool, "target@example.com").await;

    let first = ConnectionRequestRepo::create_pending(&pool, requester, target, &json!({}))
        .await
        .unwrap();
    let second = ConnectionRequestRepo::create_pending(&pool, requester, target, &json!({}))
        .await
        .unwrap();
    assert_eq!(first.id, second.id);

    let pending = ConnectionRequestRepo::list_pending_for_target(&pool, target)
        .await
        .unwrap();
    assert_eq!(pending.len(), 1);
}

#[sqlx::test(migrations = "../../migrations")]
async fn approval_yields_exactly_one_contact(pool: PgPool) {
    let requester = seed_user(&pool, "requester@example.com").await;
    let target = seed_user(&pool, "target@example.com").await;
    let request = ConnectionRequestRepo::create_pending(&pool, requester, target, &json!({}))
        .await
        .unwrap();

    let contact = ConnectionRequestRepo::approve_and_create_contact(
        &pool,
        request.id,
        Utc::now(),
        &contact_for(request.id, target, requester, 2),
    )
    .await
    .unwrap()
    .expect("pending request should approve");
    assert_eq!(contact.tier, 2);
    assert_eq!(contact.owner_user_id, target);
    assert_eq!(contact.contact_user_id, requester);

    let updated = ConnectionRequestRepo::find_by_id(&pool, request.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.status, REQUEST_APPROVED);
    assert!(updated.decided_at.is_some());

    // A second approval attempt finds the request already decided and
    // writes nothing; the original contact is the only one.
    let again = ConnectionRequestRepo::approve_and_create_contact(
        &pool,
        request.id,
        Utc::now(),
        &contact_for(request.id, target, requester, 1),
    )
    .await
    .unwrap();
    assert!(again.is_none());

    let existing = ContactRepo::find_by_request(&pool, request.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(existing.id, contact.id);
    assert_eq!(existing.tier, 2, "tier must not flip on re-approval");
}

#[sqlx::test(migrations = "../../migrations")]
async fn decline_never_yields_a_contact(pool: PgPool) {
    let requester = seed_user(&pool, "requester@example.com").await;
    let target = seed_user(&pool, "target@example.com").await;
    let request = ConnectionRequestRepo::create_pending(&pool, requester, target, &json!({}))
        .await
        .unwrap();

    assert!(ConnectionRequestRepo::decline(&pool, request.id, Utc::now())
        .await
        .unwrap());
    // Idempotent: already declined.
    assert!(!ConnectionRequestRepo::decline(&pool, request.id, Utc::now())
        .await
        .unwrap());

    let updated = ConnectionRequestRepo::find_by_id(&pool, request.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.status, REQUEST_DECLINED);

    assert!(ContactRepo::find_by_request(&pool, request.id)
        .await
        .unwrap()
        .is_none());

    // Approval after a decline must not resurrect the request.
    let late = ConnectionRequestRepo::approve_and_create_contact(
        &pool,
        request.id,
        Utc::now(),
        &contact_for(request.id, target, requester, 3),
    )
    .await
    .unwrap();
    assert!(late.is_none());
}

#[sqlx::test(migrations = "../../migrations")]
async fn declined_pair_can_request_again(pool: PgPool) {
    let requester = seed_user(&pool, "requester@example.com").await;
    let target = seed_user(&pool, "target@example.com").await;

    let first = ConnectionRequestRepo::create_pending(&pool, requester, target, &json!({}))
        .await
        .unwrap();
    ConnectionRequestRepo::decline(&pool, first.id, Utc::now())
        .await
        .unwrap();

    // The partial unique index only guards PENDING pairs; a fresh request
    // after a decline is allowed.
    let second = ConnectionRequestRepo::create_pending(&pool, requester, target, &json!({}))
        .await
        .unwrap();
    assert_ne!(first.id, second.id);
    assert_eq!(second.status, REQUEST_PENDING);
}

#[sqlx::test(migrations = "../../migrations")]
async fn contacts_list_is_scoped_to_owner(pool: PgPool) {
    let requester = seed_user(&pool, "requester@example.com").await;
    let target = seed_user(&pool, "target@example.com").await;
    let request = ConnectionRequestRepo::create_pending(&pool, requester, target, &json!({}))
        .await
        .unwrap();
    ConnectionRequestRepo::approve_and_create_contact(
        &pool,
        request.id,
        Utc::now(),
        &contact_for(request.id, target, requester, 3),
    )
    .await
    .unwrap();

    let mine = ContactRepo::list_for_owner(&pool, target, 50, 0).await.unwrap();
    assert_eq!(mine.len(), 1);

    let theirs = ContactRepo::list_for_owner(&pool, requester, 50, 0)
        .await
        .unwrap();
    assert!(theirs.is_empty());
}
