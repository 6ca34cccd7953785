//! Scan telemetry: records every read of a connection code.
//!
//! Everything in here is a side effect of the validate flow. Individual
//! failures (geocode, event insert, counter bump) are logged and
//! swallowed; a viewer must still get their profile view when telemetry
//! misbehaves.

use std::sync::Arc;

use knect_core::clock::Clock;
use knect_core::codes;
use knect_core::types::DbId;
use knect_db::models::connection_code::ConnectionCode;
use knect_db::models::scan_event::{NewScanEvent, PURPOSE_SCAN};
use knect_db::repositories::{ConnectionCodeRepo, ScanEventRepo};
use knect_db::DbPool;
use serde::Deserialize;

use crate::services::geocode::Geocoder;
use crate::state::AppState;

/// Raw coordinates supplied by the scanning client.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Everything the client tells us about one scan.
#[derive(Debug, Default, Deserialize)]
pub struct ScanContext {
    pub location: Option<Coordinates>,
    pub device_info: Option<String>,
    pub referrer: Option<String>,
    /// Stable per browsing session; a fresh id is minted when absent.
    pub session_id: Option<String>,
}

/// What the tracker hands back for the response payload.
#[derive(Debug, Clone)]
pub struct RecordedScan {
    pub scan_id: String,
    pub session_id: String,
    pub location: Option<String>,
}

/// Records scan events and keeps per-code scan counters current.
pub struct ScanTracker {
    pool: DbPool,
    clock: Arc<dyn Clock>,
    geocoder: Arc<dyn Geocoder>,
}

impl ScanTracker {
    pub fn new(state: &AppState) -> Self {
        Self {
            pool: state.pool.clone(),
            clock: Arc::clone(&state.clock),
            geocoder: Arc::clone(&state.geocoder),
        }
    }

    /// Record one read of a usable code.
    ///
    /// Always succeeds: each side effect degrades independently and the
    /// caller receives the scan/session ids either way.
    pub async fn record(
        &self,
        code: &ConnectionCode,
        context: &ScanContext,
        viewer_user_id: Option<DbId>,
    ) -> RecordedScan {
        let scan_id = codes::mint_scan_id(self.clock.as_ref());
        let session_id = context
            .session_id
            .clone()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| codes::mint_session_id(self.clock.as_ref()));

        let location = match context.location {
            Some(coords) => Some(self.resolve_location(coords).await),
            None => None,
        };

        let event = NewScanEvent {
            scan_id: scan_id.clone(),
            code: code.code.clone(),
            location: location.clone(),
            device_info: context.device_info.clone(),
            referrer: context.referrer.clone(),
            session_id: session_id.clone(),
            viewer_user_id,
            purpose: PURPOSE_SCAN,
        };
        if let Err(err) = ScanEventRepo::insert(&self.pool, &event).await {
            tracing::warn!(error = %err, code = %code.code, "Failed to record scan event");
        }

        if let Err(err) =
            ConnectionCodeRepo::record_scan(&self.pool, code.id, location.as_deref()).await
        {
            tracing::warn!(error = %err, code = %code.code, "Failed to bump scan count");
        }

        RecordedScan {
            scan_id,
            session_id,
            location,
        }
    }

    /// Reverse-geocode coordinates, degrading to "lat,lon" on failure.
    async fn resolve_location(&self, coords: Coordinates) -> String {
        match self
            .geocoder
            .reverse(coords.latitude, coords.longitude)
            .await
        {
            Ok(label) => label,
            Err(err) => {
                tracing::debug!(error = %err, "Reverse geocoding unavailable, keeping raw coordinates");
                format!("{:.5},{:.5}", coords.latitude, coords.longitude)
            }
        }
    }
}
