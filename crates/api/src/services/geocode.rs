//! Best-effort reverse geocoding of scan coordinates.
//!
//! Geocoding is decoration on the scan record: any failure (timeout,
//! non-2xx, unparseable body) degrades to raw coordinates and must never
//! abort the scan flow.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

/// Timeout on the reverse-geocoding side call. Generous enough for a
/// public endpoint, short enough not to stall a scan noticeably.
const GEOCODE_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    #[error("Geocoding request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Geocoding response missing address data")]
    EmptyResponse,
}

/// Reverse lookup of coordinates into a human-readable place label.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Resolve `(lat, lon)` to a "City, Country"-style label.
    async fn reverse(&self, latitude: f64, longitude: f64) -> Result<String, GeocodeError>;
}

/// Nominatim-style `/reverse` endpoint client.
pub struct HttpGeocoder {
    client: reqwest::Client,
    base_url: String,
}

/// The subset of a Nominatim reverse response we read.
#[derive(Debug, Deserialize)]
struct ReverseResponse {
    display_name: Option<String>,
    address: Option<ReverseAddress>,
}

#[derive(Debug, Deserialize)]
struct ReverseAddress {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    country: Option<String>,
}

impl HttpGeocoder {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(GEOCODE_TIMEOUT)
            .build()
            .expect("reqwest client construction cannot fail with static config");
        Self { client, base_url }
    }
}

#[async_trait]
impl Geocoder for HttpGeocoder {
    async fn reverse(&self, latitude: f64, longitude: f64) -> Result<String, GeocodeError> {
        let url = format!(
            "{}/reverse?lat={latitude}&lon={longitude}&format=jsonv2",
            self.base_url.trim_end_matches('/')
        );
        let response: ReverseResponse = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(address) = response.address {
            let locality = address.city.or(address.town).or(address.village);
            match (locality, address.country) {
                (Some(city), Some(country)) => return Ok(format!("{city}, {country}")),
                (Some(city), None) => return Ok(city),
                (None, Some(country)) => return Ok(country),
                (None, None) => {}
            }
        }
        response.display_name.ok_or(GeocodeError::EmptyResponse)
    }
}

/// Disabled geocoding: every lookup reports an empty response, so scan
/// locations stay as raw coordinates. Used when `GEOCODE_BASE_URL` is
/// unset and in tests.
pub struct NoopGeocoder;

#[async_trait]
impl Geocoder for NoopGeocoder {
    async fn reverse(&self, _latitude: f64, _longitude: f64) -> Result<String, GeocodeError> {
        Err(GeocodeError::EmptyResponse)
    }
}
