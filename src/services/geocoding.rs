//! Geocoding collaborator
//!
//! Used for leads whose search result came back without coordinates.
//!
//! Configuration via GEOCODER_BACKEND:
//! - "mock" → MockGeocoder (tests, development)
//! - "google" → GoogleGeocoder (needs GOOGLE_PLACES_API_KEY)

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::types::{Coordinates, ADDRESS_UNAVAILABLE};

/// Geocoder trait - abstraction for all geocoding implementations
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Geocode an address to coordinates
    /// Returns None if address cannot be geocoded
    async fn geocode(&self, address: &str) -> Result<Option<Coordinates>>;

    /// Get the name of this geocoder implementation
    fn name(&self) -> &'static str;
}

/// Backend selection for [`create_geocoder`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeocoderBackend {
    Mock,
    Google,
}

impl GeocoderBackend {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "mock" => Some(GeocoderBackend::Mock),
            "google" => Some(GeocoderBackend::Google),
            _ => None,
        }
    }
}

fn is_geocodable(address: &str) -> bool {
    let address = address.trim();
    !address.is_empty() && address != ADDRESS_UNAVAILABLE
}

// ==========================================================================
// MockGeocoder Implementation
// ==========================================================================

/// Mock geocoder for testing - returns deterministic fake coordinates
pub struct MockGeocoder;

impl MockGeocoder {
    pub fn new() -> Self {
        Self
    }

    /// Generate deterministic coordinates from address hash
    /// Coordinates fall inside Gujarat, away from the coast and borders
    fn hash_to_coordinates(address: &str) -> Coordinates {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        address.trim().to_lowercase().hash(&mut hasher);
        let hash = hasher.finish();

        const LAT_MIN: f64 = 21.0;
        const LAT_MAX: f64 = 23.5;
        const LNG_MIN: f64 = 71.0;
        const LNG_MAX: f64 = 73.5;

        let lat_normalized = ((hash >> 32) as f64) / (u32::MAX as f64);
        let lng_normalized = ((hash & 0xFFFFFFFF) as f64) / (u32::MAX as f64);

        Coordinates {
            lat: LAT_MIN + (lat_normalized * (LAT_MAX - LAT_MIN)),
            lng: LNG_MIN + (lng_normalized * (LNG_MAX - LNG_MIN)),
        }
    }
}

impl Default for MockGeocoder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Geocoder for MockGeocoder {
    async fn geocode(&self, address: &str) -> Result<Option<Coordinates>> {
        if !is_geocodable(address) {
            return Ok(None);
        }
        Ok(Some(Self::hash_to_coordinates(address)))
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

// ==========================================================================
// RateLimiter Implementation
// ==========================================================================

/// Rate limiter that enforces minimum interval between calls
pub struct RateLimiter {
    last_call: Arc<Mutex<Option<Instant>>>,
    min_interval: Duration,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            last_call: Arc::new(Mutex::new(None)),
            min_interval,
        }
    }

    /// Wait until it's safe to make another call
    pub async fn wait(&self) {
        let mut last = self.last_call.lock().await;

        if let Some(last_time) = *last {
            let elapsed = last_time.elapsed();
            if elapsed < self.min_interval {
                tokio::time::sleep(self.min_interval - elapsed).await;
            }
        }

        *last = Some(Instant::now());
    }
}

// ==========================================================================
// GoogleGeocoder Implementation
// ==========================================================================

/// Minimum interval between Geocoding API requests
const DEFAULT_RATE_LIMIT_MS: u64 = 100;

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
    location: Coordinates,
}

/// Interpret a Geocoding API response body
fn parse_geocode_response(body: &str) -> Result<Option<Coordinates>> {
    let response: GeocodeResponse =
        serde_json::from_str(body).context("Failed to parse geocoding response")?;

    match response.status.as_str() {
        "OK" => Ok(response.results.first().map(|r| r.geometry.location)),
        "ZERO_RESULTS" => Ok(None),
        status => anyhow::bail!(
            "Geocoding API returned {}: {}",
            status,
            response.error_message.unwrap_or_default()
        ),
    }
}

/// Google Geocoding API client
pub struct GoogleGeocoder {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
    rate_limiter: RateLimiter,
}

impl GoogleGeocoder {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client,
            rate_limiter: RateLimiter::new(Duration::from_millis(DEFAULT_RATE_LIMIT_MS)),
        })
    }
}

#[async_trait]
impl Geocoder for GoogleGeocoder {
    async fn geocode(&self, address: &str) -> Result<Option<Coordinates>> {
        if !is_geocodable(address) {
            return Ok(None);
        }

        self.rate_limiter.wait().await;

        let url = format!(
            "{}/maps/api/geocode/json?address={}&region=in&key={}",
            self.base_url,
            urlencoding::encode(address),
            urlencoding::encode(&self.api_key)
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to send geocoding request")?;

        if !response.status().is_success() {
            anyhow::bail!("Geocoding API returned status {}", response.status());
        }

        let body = response
            .text()
            .await
            .context("Failed to read geocoding response")?;

        let coordinates = parse_geocode_response(&body)?;
        debug!("Geocoded '{}' -> {:?}", address, coordinates);
        Ok(coordinates)
    }

    fn name(&self) -> &'static str {
        "google"
    }
}

// ==========================================================================
// Factory function
// ==========================================================================

/// Create the configured geocoder, falling back to mock when Google is
/// requested without an API key
pub fn create_geocoder(
    backend: GeocoderBackend,
    base_url: &str,
    api_key: Option<&str>,
) -> Result<Box<dyn Geocoder>> {
    match (backend, api_key) {
        (GeocoderBackend::Google, Some(key)) if !key.trim().is_empty() => {
            info!("Using GoogleGeocoder");
            Ok(Box::new(GoogleGeocoder::new(base_url, key)?))
        }
        (GeocoderBackend::Google, _) => {
            warn!("Google geocoder requested without an API key, using mock");
            Ok(Box::new(MockGeocoder::new()))
        }
        (GeocoderBackend::Mock, _) => {
            info!("Using MockGeocoder");
            Ok(Box::new(MockGeocoder::new()))
        }
    }
}
