//! Shared integration-test harness.
//!
//! Builds the application with the production middleware stack but with
//! injected fakes: a pinned clock, a no-op geocoder, and a recording
//! mailer that captures outbound messages instead of delivering them.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use knect_api::auth::jwt::{generate_access_token, JwtConfig};
use knect_api::config::{EmailConfig, ServerConfig};
use knect_api::router::build_app_router;
use knect_api::services::geocode::NoopGeocoder;
use knect_api::services::mailer::{EmailMessage, Mailer, MailerError};
use knect_api::state::AppState;
use knect_core::clock::SystemClock;
use knect_core::types::DbId;

/// Mailer that records every message and reports success.
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<EmailMessage>>,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailerError> {
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

/// Mailer that rejects every message, for rollback tests.
pub struct FailingMailer;

#[async_trait]
impl Mailer for FailingMailer {
    async fn send(&self, _message: &EmailMessage) -> Result<(), MailerError> {
        Err(MailerError::NotConfigured)
    }
}

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        public_origin: "http://localhost:5173".to_string(),
        geocode_base_url: None,
        email: EmailConfig {
            api_url: None,
            api_key: None,
            from_address: "connect@knect.test".to_string(),
        },
        jwt: test_jwt_config(),
    }
}

/// JWT config with a fixed secret so tests can mint their own tokens.
pub fn test_jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "integration-test-secret-that-is-long-enough".to_string(),
        access_token_expiry_mins: 15,
    }
}

/// Build the full application router with the production middleware
/// stack, a recording mailer, and a no-op geocoder.
pub fn build_test_app(pool: PgPool) -> (Router, Arc<RecordingMailer>) {
    let mailer = Arc::new(RecordingMailer::default());
    let app = build_test_app_with_mailer(pool, Arc::clone(&mailer) as Arc<dyn Mailer>);
    (app, mailer)
}

/// Build the app with a caller-supplied mailer (e.g. [`FailingMailer`]).
pub fn build_test_app_with_mailer(pool: PgPool, mailer: Arc<dyn Mailer>) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        clock: Arc::new(SystemClock),
        geocoder: Arc::new(NoopGeocoder),
        mailer,
    };
    build_app_router(state, &config)
}

/// Bearer token for the given user id, signed with the test secret.
pub fn auth_token(user_id: DbId) -> String {
    generate_access_token(user_id, &test_jwt_config()).expect("token generation should succeed")
}

/// Insert a user row and return its id.
pub async fn seed_user(pool: &PgPool, email: &str, display_name: &str) -> DbId {
    sqlx::query_scalar(
        "INSERT INTO users (email, display_name, allowed_fields, shared_links, default_shared_links) \
         VALUES ($1, $2, '{}', '{}', '[]') \
         RETURNING id",
    )
    .bind(email)
    .bind(display_name)
    .fetch_one(pool)
    .await
    .expect("seeding a user should succeed")
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

/// Send a GET request without authentication.
pub async fn get(app: Router, path: &str) -> Response<Body> {
    let request = Request::builder()
        .uri(path)
        .body(Body::empty())
        .expect("request construction should succeed");
    app.oneshot(request).await.expect("request should complete")
}

/// Send a GET request with a Bearer token.
pub async fn get_auth(app: Router, path: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .uri(path)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .expect("request construction should succeed");
    app.oneshot(request).await.expect("request should complete")
}

/// Send a POST request with a JSON body, optionally authenticated.
pub async fn post_json(
    app: Router,
    path: &str,
    body: &serde_json::Value,
    token: Option<&str>,
) -> Response<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(path)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = builder
        .body(Body::from(body.to_string()))
        .expect("request construction should succeed");
    app.oneshot(request).await.expect("request should complete")
}

/// Read a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("reading body should succeed")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be valid JSON")
}

/// Assert a status and return the parsed JSON body.
pub async fn expect_json(response: Response<Body>, status: StatusCode) -> serde_json::Value {
    assert_eq!(response.status(), status);
    body_json(response).await
}
