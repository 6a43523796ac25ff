//! Address to coordinate resolution through the Google Geocoding API.
//!
//! The [`Geocoder`] trait is the seam the optimizer depends on. It never fails:
//! every provider or transport problem is logged here and surfaces as
//! [`GeocodeOutcome::Unresolved`], so a caller cannot tell an unknown address
//! apart from a misconfigured or unreachable provider.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::models::Coordinate;

pub const DEFAULT_GEOCODING_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";

/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

const STATUS_OK: &str = "OK";
const STATUS_ZERO_RESULTS: &str = "ZERO_RESULTS";

#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    #[error("geocoding API key is not configured")]
    MissingApiKey,
    #[error("geocoding request failed: {0}")]
    Http(#[source] reqwest::Error),
    #[error("no results for address")]
    ZeroResults,
    #[error("geocoding provider returned {status}: {message}")]
    Provider { status: String, message: String },
    #[error("geocoding provider returned OK without any result")]
    EmptyResults,
}

impl From<reqwest::Error> for GeocodeError {
    fn from(err: reqwest::Error) -> Self {
        // The request URL carries the API key in its query string.
        Self::Http(err.without_url())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GeocodeOutcome {
    Resolved(Coordinate),
    Unresolved,
}

impl GeocodeOutcome {
    pub fn coordinate(self) -> Option<Coordinate> {
        match self {
            Self::Resolved(coord) => Some(coord),
            Self::Unresolved => None,
        }
    }
}

/// Resolves a free-text address to a coordinate.
///
/// Implementations must be cheap to share across requests; the optimizer
/// issues every lookup of a request concurrently against the same instance.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, address: &str) -> GeocodeOutcome;
}

#[derive(Debug, Clone)]
pub struct GeocoderConfig {
    /// Absence is not a startup error: every lookup then fails and is logged.
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_GEOCODING_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl GeocoderConfig {
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

impl GeocodeResponse {
    fn into_coordinate(self) -> Result<Coordinate, GeocodeError> {
        match self.status.as_str() {
            STATUS_OK => self
                .results
                .into_iter()
                .next()
                .map(|result| Coordinate {
                    lat: result.geometry.location.lat,
                    lon: result.geometry.location.lng,
                })
                .ok_or(GeocodeError::EmptyResults),
            STATUS_ZERO_RESULTS => Err(GeocodeError::ZeroResults),
            _ => Err(GeocodeError::Provider {
                message: self
                    .error_message
                    .unwrap_or_else(|| "no error message".to_string()),
                status: self.status,
            }),
        }
    }
}

/// HTTP client for the Google Geocoding API (or anything speaking its format).
#[derive(Debug, Clone)]
pub struct GoogleGeocoder {
    client: Client,
    config: GeocoderConfig,
}

impl GoogleGeocoder {
    pub fn new(config: GeocoderConfig) -> Result<Self, GeocodeError> {
        let client = Client::builder()
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &GeocoderConfig {
        &self.config
    }

    /// Single provider round-trip, keeping the failure reason.
    pub async fn lookup(&self, address: &str) -> Result<Coordinate, GeocodeError> {
        let api_key = self.config.api_key().ok_or(GeocodeError::MissingApiKey)?;

        let response = self
            .client
            .get(&self.config.base_url)
            .query(&[("address", address), ("key", api_key)])
            .send()
            .await?
            .error_for_status()?;

        let body: GeocodeResponse = response.json().await?;
        body.into_coordinate()
    }
}

#[async_trait]
impl Geocoder for GoogleGeocoder {
    async fn geocode(&self, address: &str) -> GeocodeOutcome {
        match self.lookup(address).await {
            Ok(coord) => {
                tracing::debug!(address, lat = coord.lat, lon = coord.lon, "geocoded address");
                GeocodeOutcome::Resolved(coord)
            }
            Err(GeocodeError::ZeroResults) => {
                tracing::warn!(address, "geocoding returned no results");
                GeocodeOutcome::Unresolved
            }
            Err(err) => {
                tracing::error!(address, "geocoding failed: {err}");
                GeocodeOutcome::Unresolved
            }
        }
    }
}
