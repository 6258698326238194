//! Lead search pipeline
//!
//! Validate the request, query the places collaborator, geocode results that
//! came back without coordinates and turn them into leads.

use std::collections::HashSet;

use tracing::{info, warn};

use crate::error::PlannerError;
use crate::services::geocoding::Geocoder;
use crate::services::locations::salesman_location;
use crate::services::places::PlacesSearch;
use crate::types::{Lead, PlaceRecord, SalesmanLocation, SearchRequest, ValidatedSearch};

/// Leads found for one search, with the matching starting location
#[derive(Debug, Clone)]
pub struct LeadSearch {
    pub search: ValidatedSearch,
    pub origin: SalesmanLocation,
    pub leads: Vec<Lead>,
}

/// Fill in missing coordinates. A failed lookup leaves the record without
/// a location; it never fails the batch.
pub async fn locate_places(geocoder: &dyn Geocoder, records: Vec<PlaceRecord>) -> Vec<PlaceRecord> {
    let mut located = Vec::with_capacity(records.len());

    for mut record in records {
        if record.location.is_none() {
            let address = record.address.as_deref().unwrap_or_default();
            match geocoder.geocode(address).await {
                Ok(Some(coordinates)) => record.location = Some(coordinates),
                Ok(None) => warn!("No geocoding result for place {} ('{}')", record.id, address),
                Err(e) => warn!("Geocoding failed for place {} ('{}'): {}", record.id, address, e),
            }
        }
        located.push(record);
    }

    located
}

/// Convert records to leads, keeping the first record for each id
pub fn leads_from_places(records: Vec<PlaceRecord>, category: &str) -> Vec<Lead> {
    let mut seen = HashSet::new();

    records
        .into_iter()
        .filter(|record| {
            let fresh = seen.insert(record.id.clone());
            if !fresh {
                warn!("Duplicate place id {} in search results, skipping", record.id);
            }
            fresh
        })
        .map(|record| Lead::from_place(record, category))
        .collect()
}

/// Run a full search
pub async fn search_leads(
    places: &dyn PlacesSearch,
    geocoder: &dyn Geocoder,
    request: &SearchRequest,
    region: &str,
) -> Result<LeadSearch, PlannerError> {
    let search = request.validate()?;
    let query = search.query(region);
    info!("Searching leads: '{}' via {}", query, places.name());

    let records = places
        .search(&query)
        .await
        .map_err(|e| PlannerError::collaborator("places", format!("{:#}", e)))?;

    let records = locate_places(geocoder, records).await;
    let leads = leads_from_places(records, &search.category);
    let origin = salesman_location(search.area);

    info!("Found {} leads in {}, {}", leads.len(), search.area, search.city);

    Ok(LeadSearch {
        search,
        origin,
        leads,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use async_trait::async_trait;
    use crate::services::geocoding::MockGeocoder;
    use crate::services::places::MockPlacesSearch;
    use crate::types::{Coordinates, ADDRESS_UNAVAILABLE};

    struct FailingGeocoder;

    #[async_trait]
    impl Geocoder for FailingGeocoder {
        async fn geocode(&self, _address: &str) -> Result<Option<Coordinates>> {
            anyhow::bail!("quota exceeded")
        }

        fn name(&self) -> &'static str {
            "failing"
        }
    }

    struct FailingPlaces;

    #[async_trait]
    impl PlacesSearch for FailingPlaces {
        async fn search(&self, _query: &str) -> Result<Vec<PlaceRecord>> {
            anyhow::bail!("Places API returned status 503")
        }

        fn name(&self) -> &'static str {
            "failing"
        }
    }

    fn record(id: &str, address: Option<&str>, location: Option<Coordinates>) -> PlaceRecord {
        PlaceRecord {
            id: id.into(),
            name: Some(format!("Place {}", id)),
            address: address.map(String::from),
            location,
            ..Default::default()
        }
    }

    fn request() -> SearchRequest {
        SearchRequest {
            city: "Surat".into(),
            category: "cafe".into(),
            area: "Mota Varachha".into(),
        }
    }

    #[tokio::test]
    async fn test_locate_places_fills_missing_coordinates() {
        let known = Coordinates::new(21.2, 72.85);
        let records = vec![
            record("a", Some("Adajan, Surat"), Some(known)),
            record("b", Some("Vesu, Surat"), None),
            record("c", Some(ADDRESS_UNAVAILABLE), None),
        ];

        let located = locate_places(&MockGeocoder::new(), records).await;

        assert_eq!(located[0].location, Some(known));
        assert!(located[1].location.is_some());
        assert!(located[2].location.is_none());
    }

    #[tokio::test]
    async fn test_geocoder_errors_do_not_abort() {
        let records = vec![
            record("a", Some("Adajan, Surat"), None),
            record("b", Some("Vesu, Surat"), Some(Coordinates::new(21.14, 72.77))),
        ];

        let located = locate_places(&FailingGeocoder, records).await;

        assert_eq!(located.len(), 2);
        assert!(located[0].location.is_none());
        assert!(located[1].location.is_some());

        let leads = leads_from_places(located, "cafe");
        assert!(leads[0].location.is_unknown());
    }

    #[test]
    fn test_leads_from_places_skips_duplicate_ids() {
        let records = vec![
            record("a", Some("first"), None),
            record("b", None, None),
            record("a", Some("second"), None),
        ];

        let leads = leads_from_places(records, "school");

        assert_eq!(leads.len(), 2);
        assert_eq!(leads[0].address, "first");
        assert!(leads.iter().all(|l| l.category == "school"));
    }

    #[tokio::test]
    async fn test_search_leads_end_to_end_with_mocks() {
        let result = search_leads(&MockPlacesSearch::new(), &MockGeocoder::new(), &request(), "Gujarat")
            .await
            .unwrap();

        assert_eq!(result.leads.len(), 12);
        assert_eq!(result.origin.name, "Mota Varachha Salesman House");
        assert!(result.leads.iter().all(|l| l.location.is_routable()));
        assert!(result.leads.iter().all(|l| l.category == "cafe"));
    }

    #[tokio::test]
    async fn test_search_leads_rejects_invalid_request() {
        let mut bad = request();
        bad.area = "Bandra".into();

        let err = search_leads(&MockPlacesSearch::new(), &MockGeocoder::new(), &bad, "Gujarat")
            .await
            .unwrap_err();

        assert!(matches!(err, PlannerError::InvalidSearch(_)));
    }

    #[tokio::test]
    async fn test_search_leads_surfaces_collaborator_error() {
        let err = search_leads(&FailingPlaces, &MockGeocoder::new(), &request(), "Gujarat")
            .await
            .unwrap_err();

        assert!(matches!(err, PlannerError::Collaborator { service: "places", .. }));
        assert!(err.to_string().contains("503"));
    }
}
