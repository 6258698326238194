//! Configuration management

use std::time::Duration;

use anyhow::{self, Context, Result};

use crate::services::geocoding::GeocoderBackend;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// NATS server URL
    pub nats_url: String,

    /// Google API key for Places and Geocoding (mock collaborators when unset)
    pub google_api_key: Option<String>,

    /// Places API base URL
    pub places_url: String,

    /// Geocoding API base URL
    pub geocoding_url: String,

    pub geocoder_backend: GeocoderBackend,

    /// Page that opens shared route links
    pub share_base_url: String,

    /// Appended to every search query ("cafe in Adajan Surat Gujarat")
    pub search_region: String,

    /// Route sessions unused for this long are dropped
    pub session_idle: Duration,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let nats_url = get("NATS_URL")
            .unwrap_or_else(|| "nats://localhost:4222".to_string());

        let google_api_key = get("GOOGLE_PLACES_API_KEY")
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());

        let places_url = get("PLACES_URL")
            .unwrap_or_else(|| "https://places.googleapis.com".to_string());

        let geocoding_url = get("GEOCODING_URL")
            .unwrap_or_else(|| "https://maps.googleapis.com".to_string());

        let geocoder_backend = match get("GEOCODER_BACKEND") {
            None => GeocoderBackend::Mock,
            Some(value) => GeocoderBackend::parse(&value).unwrap_or_else(|| {
                tracing::warn!("Unknown GEOCODER_BACKEND '{}', using mock", value);
                GeocoderBackend::Mock
            }),
        };

        let share_base_url = get("SHARE_BASE_URL")
            .unwrap_or_else(|| "http://localhost:3000/".to_string());

        if !(share_base_url.starts_with("http://") || share_base_url.starts_with("https://")) {
            anyhow::bail!(
                "SHARE_BASE_URL must be an http(s) URL (current: '{}')",
                share_base_url
            );
        }

        let search_region = get("SEARCH_REGION_SUFFIX")
            .unwrap_or_else(|| "Gujarat".to_string());

        let session_idle_secs = match get("SESSION_IDLE_SECS") {
            Some(value) => value
                .trim()
                .parse::<u64>()
                .with_context(|| format!("SESSION_IDLE_SECS must be a number of seconds (current: '{}')", value))?,
            None => 7200,
        };

        Ok(Self {
            nats_url,
            google_api_key,
            places_url,
            geocoding_url,
            geocoder_backend,
            share_base_url,
            search_region,
            session_idle: Duration::from_secs(session_idle_secs),
        })
    }
}
