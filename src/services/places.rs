//! Places search collaborator
//!
//! Google Places (New) text search in production, a deterministic mock for
//! tests and for running without an API key.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::types::{Coordinates, PlaceRecord};

const FIELD_MASK: &str = "places.id,places.displayName,places.formattedAddress,places.rating,\
places.userRatingCount,places.websiteUri,places.regularOpeningHours,places.types,\
places.internationalPhoneNumber,places.location";

/// Places search trait - abstraction over search backends
#[async_trait]
pub trait PlacesSearch: Send + Sync {
    /// Free-text search, results in relevance order
    async fn search(&self, query: &str) -> Result<Vec<PlaceRecord>>;

    fn name(&self) -> &'static str;
}

// ==========================================================================
// Google Places API (New)
// ==========================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchTextRequest<'a> {
    text_query: &'a str,
    language_code: &'static str,
    region_code: &'static str,
}

#[derive(Debug, Deserialize)]
struct SearchTextResponse {
    #[serde(default)]
    places: Vec<GooglePlace>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GooglePlace {
    id: String,
    display_name: Option<LocalizedText>,
    formatted_address: Option<String>,
    rating: Option<f64>,
    user_rating_count: Option<u32>,
    website_uri: Option<String>,
    regular_opening_hours: Option<OpeningHours>,
    #[serde(default)]
    types: Vec<String>,
    international_phone_number: Option<String>,
    location: Option<LatLng>,
}

#[derive(Debug, Deserialize)]
struct LocalizedText {
    text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OpeningHours {
    #[serde(default)]
    weekday_descriptions: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    latitude: f64,
    longitude: f64,
}

impl From<GooglePlace> for PlaceRecord {
    fn from(place: GooglePlace) -> Self {
        PlaceRecord {
            id: place.id,
            name: place.display_name.map(|n| n.text),
            address: place.formatted_address,
            phone: place.international_phone_number,
            website: place.website_uri,
            rating: place.rating,
            review_count: place.user_rating_count,
            place_type: place.types.into_iter().next(),
            hours: place
                .regular_opening_hours
                .map(|h| h.weekday_descriptions)
                .unwrap_or_default(),
            location: place.location.map(|l| Coordinates::new(l.latitude, l.longitude)),
        }
    }
}

/// Parse a `places:searchText` response body
fn parse_search_response(body: &str) -> Result<Vec<PlaceRecord>> {
    let response: SearchTextResponse =
        serde_json::from_str(body).context("Failed to parse places response")?;
    Ok(response.places.into_iter().map(PlaceRecord::from).collect())
}

/// Google Places text search client
pub struct GooglePlacesClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl GooglePlacesClient {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(15))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client,
        })
    }
}

#[async_trait]
impl PlacesSearch for GooglePlacesClient {
    async fn search(&self, query: &str) -> Result<Vec<PlaceRecord>> {
        let url = format!("{}/v1/places:searchText", self.base_url);
        debug!("Searching places for '{}'", query);

        let response = self
            .client
            .post(&url)
            .header("X-Goog-Api-Key", &self.api_key)
            .header("X-Goog-FieldMask", FIELD_MASK)
            .json(&SearchTextRequest {
                text_query: query,
                language_code: "en",
                region_code: "IN",
            })
            .send()
            .await
            .context("Failed to send places request")?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("Failed to read places response")?;

        if !status.is_success() {
            warn!("Places API returned {}: {}", status, body);
            anyhow::bail!("Places API returned status {}", status);
        }

        let places = parse_search_response(&body)?;
        info!("Places search '{}' returned {} results", query, places.len());
        Ok(places)
    }

    fn name(&self) -> &'static str {
        "google"
    }
}

// ==========================================================================
// MockPlacesSearch
// ==========================================================================

/// Mock places search - returns a fixed list, or generated records around
/// Surat derived from the query text
pub struct MockPlacesSearch {
    records: Option<Vec<PlaceRecord>>,
    generated: usize,
}

impl MockPlacesSearch {
    pub fn new() -> Self {
        Self {
            records: None,
            generated: 12,
        }
    }

    pub fn with_records(records: Vec<PlaceRecord>) -> Self {
        Self {
            records: Some(records),
            generated: 0,
        }
    }

    fn generate(&self, query: &str) -> Vec<PlaceRecord> {
        let label = query.split(" in ").next().unwrap_or(query).trim();
        (0..self.generated)
            .map(|i| {
                let offset = i as f64 * 0.004;
                PlaceRecord {
                    id: format!("mock-{}", i + 1),
                    name: Some(format!("{} {}", title_case(label), i + 1)),
                    address: Some(format!("{} Main Road, Surat, Gujarat", i + 1)),
                    phone: Some(format!("+91 98250 {:05}", 10000 + i)),
                    website: None,
                    rating: Some(3.5 + (i % 4) as f64 * 0.5),
                    review_count: Some((i as u32 + 1) * 17),
                    place_type: Some(label.to_lowercase()),
                    hours: vec![],
                    // every fourth record comes back without a location
                    location: (i % 4 != 3)
                        .then(|| Coordinates::new(21.16 + offset, 72.80 + offset * 1.5)),
                }
            })
            .collect()
    }
}

impl Default for MockPlacesSearch {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PlacesSearch for MockPlacesSearch {
    async fn search(&self, query: &str) -> Result<Vec<PlaceRecord>> {
        match &self.records {
            Some(records) => Ok(records.clone()),
            None => Ok(self.generate(query)),
        }
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

fn title_case(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Google client when an API key is configured, mock otherwise
pub fn create_places_search(base_url: &str, api_key: Option<&str>) -> Result<Box<dyn PlacesSearch>> {
    match api_key {
        Some(key) if !key.trim().is_empty() => {
            info!("Using Google Places search at {}", base_url);
            Ok(Box::new(GooglePlacesClient::new(base_url, key)?))
        }
        _ => {
            warn!("GOOGLE_PLACES_API_KEY not set, using mock places search");
            Ok(Box::new(MockPlacesSearch::new()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search_response_maps_fields() {
        let body = r#"{
            "places": [{
                "id": "ChIJ123",
                "displayName": {"text": "Blue Tokai Coffee", "languageCode": "en"},
                "formattedAddress": "Ground Floor, Adajan, Surat, Gujarat 395009, India",
                "rating": 4.5,
                "userRatingCount": 812,
                "websiteUri": "https://bluetokaicoffee.com/",
                "regularOpeningHours": {"weekdayDescriptions": ["Monday: 8:00 AM – 11:00 PM"]},
                "types": ["cafe", "food", "point_of_interest"],
                "internationalPhoneNumber": "+91 98765 43210",
                "location": {"latitude": 21.1925, "longitude": 72.7958}
            }]
        }"#;

        let places = parse_search_response(body).unwrap();

        assert_eq!(places.len(), 1);
        let place = &places[0];
        assert_eq!(place.id, "ChIJ123");
        assert_eq!(place.name.as_deref(), Some("Blue Tokai Coffee"));
        assert_eq!(place.review_count, Some(812));
        assert_eq!(place.place_type.as_deref(), Some("cafe"));
        assert_eq!(place.hours.len(), 1);
        assert_eq!(place.location, Some(Coordinates::new(21.1925, 72.7958)));
    }

    #[test]
    fn test_parse_search_response_without_places() {
        assert!(parse_search_response("{}").unwrap().is_empty());
    }

    #[test]
    fn test_parse_search_response_minimal_place() {
        let places = parse_search_response(r#"{"places":[{"id":"x"}]}"#).unwrap();
        assert_eq!(places[0].id, "x");
        assert!(places[0].name.is_none());
        assert!(places[0].location.is_none());
    }

    #[test]
    fn test_parse_search_response_rejects_garbage() {
        assert!(parse_search_response("<html>").is_err());
    }

    #[tokio::test]
    async fn test_mock_generates_deterministic_records() {
        let mock = MockPlacesSearch::new();

        let first = mock.search("cafe in Adajan Surat Gujarat").await.unwrap();
        let second = mock.search("cafe in Adajan Surat Gujarat").await.unwrap();

        assert_eq!(first.len(), 12);
        assert_eq!(first, second);
        assert_eq!(first[0].name.as_deref(), Some("Cafe 1"));
        assert!(first[3].location.is_none());
    }

    #[tokio::test]
    async fn test_mock_returns_fixed_records() {
        let record = PlaceRecord {
            id: "fixed".into(),
            ..Default::default()
        };
        let mock = MockPlacesSearch::with_records(vec![record.clone()]);

        assert_eq!(mock.search("anything").await.unwrap(), vec![record]);
        assert_eq!(mock.name(), "mock");
    }

    #[test]
    fn test_factory_without_key_is_mock() {
        let search = create_places_search("https://places.googleapis.com", None).unwrap();
        assert_eq!(search.name(), "mock");

        let search = create_places_search("https://places.googleapis.com", Some("  ")).unwrap();
        assert_eq!(search.name(), "mock");
    }

    #[test]
    fn test_factory_with_key_is_google() {
        let search = create_places_search("https://places.googleapis.com/", Some("key")).unwrap();
        assert_eq!(search.name(), "google");
    }

    #[tokio::test]
    #[ignore = "requires network access and a Places API key"]
    async fn test_google_search_surat_cafes() {
        let key = std::env::var("GOOGLE_PLACES_API_KEY").unwrap();
        let client = GooglePlacesClient::new("https://places.googleapis.com", &key).unwrap();

        let places = client.search("cafe in Adajan Surat Gujarat").await.unwrap();

        assert!(!places.is_empty());
    }
}
