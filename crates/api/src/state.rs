use std::sync::Arc;

use knect_core::clock::Clock;

use crate::config::ServerConfig;
use crate::services::geocode::Geocoder;
use crate::services::mailer::Mailer;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`). The clock,
/// geocoder, and mailer are injected so integration tests can pin time
/// and capture outbound side calls.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: knect_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Source of "now" for expiry decisions and minted tokens.
    pub clock: Arc<dyn Clock>,
    /// Best-effort reverse geocoding for scan locations.
    pub geocoder: Arc<dyn Geocoder>,
    /// Invitation email delivery.
    pub mailer: Arc<dyn Mailer>,
}
