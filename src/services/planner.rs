//! Route planning for one batch
//!
//! Batch -> drop leads without a usable location -> nearest-neighbor order
//! -> directions and share links.

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::error::PlannerError;
use crate::services::geo::path_distance;
use crate::services::links::{directions_link, shareable_link};
use crate::services::optimizer::optimize;
use crate::types::{Batch, Lead, Route, SalesmanLocation, SharePayload};

/// Plan the visiting order for `batch` starting from `origin`
pub fn plan_route(
    origin: &SalesmanLocation,
    batch: &Batch,
    share_base_url: &str,
    timestamp: DateTime<Utc>,
) -> Result<Route, PlannerError> {
    origin.coordinates.validate()?;

    let (routable, excluded): (Vec<&Lead>, Vec<&Lead>) = batch
        .leads
        .iter()
        .partition(|lead| lead.location.is_routable());

    for lead in &excluded {
        warn!("Lead '{}' ({}) has no known location, excluded from route", lead.name, lead.id);
    }

    let stops: Vec<Lead> = optimize(&origin.coordinates, routable)
        .into_iter()
        .cloned()
        .collect();
    let total_distance_km = path_distance(&origin.coordinates, &stops);

    let payload = SharePayload {
        batch_number: batch.batch_number,
        stops,
        origin: origin.clone(),
        timestamp,
    };
    let shareable_link = shareable_link(share_base_url, &payload)?;
    let directions_link = directions_link(origin, &payload.stops);

    info!(
        "Planned route {}: {} stops, {} excluded, {:.1} km",
        batch.batch_number,
        payload.stops.len(),
        excluded.len(),
        total_distance_km
    );

    Ok(Route {
        batch_number: batch.batch_number,
        origin: payload.origin,
        stops: payload.stops,
        excluded: excluded.into_iter().cloned().collect(),
        total_distance_km,
        directions_link,
        shareable_link,
    })
}

/// Re-plan a batch received through a share link
pub fn plan_shared_route(
    payload: &SharePayload,
    share_base_url: &str,
) -> Result<Route, PlannerError> {
    let batch = Batch {
        batch_number: payload.batch_number,
        leads: payload.stops.clone(),
    };
    plan_route(&payload.origin, &batch, share_base_url, payload.timestamp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use crate::services::links::decode_shareable_link;
    use crate::services::locations::salesman_location;
    use crate::types::{Coordinates, PlaceRecord};

    fn lead(id: &str, location: Option<Coordinates>) -> Lead {
        Lead::from_place(
            PlaceRecord {
                id: id.into(),
                name: Some(format!("Shop {}", id)),
                address: Some(format!("{} Street, Surat", id)),
                location,
                ..Default::default()
            },
            "restaurant",
        )
    }

    fn timestamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 1, 10, 0, 0).unwrap()
    }

    fn batch() -> Batch {
        Batch {
            batch_number: 1,
            leads: vec![
                lead("far", Some(Coordinates::new(21.2300, 72.8700))),
                lead("lost", None),
                lead("near", Some(Coordinates::new(21.1750, 72.8300))),
                lead("mid", Some(Coordinates::new(21.2000, 72.8400))),
            ],
        }
    }

    #[test]
    fn test_plan_orders_stops_and_excludes_unknown_locations() {
        let origin = salesman_location("Adajan");

        let route = plan_route(&origin, &batch(), "http://localhost:3000/", timestamp()).unwrap();

        let ids: Vec<&str> = route.stops.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["near", "mid", "far"]);
        assert_eq!(route.excluded.len(), 1);
        assert_eq!(route.excluded[0].id, "lost");
        assert!(route.total_distance_km > 0.0);
        assert!(route.directions_link.contains("Shop%20near"));
        assert!(!route.directions_link.contains("Shop%20lost"));
    }

    #[test]
    fn test_share_link_carries_planned_route() {
        let origin = salesman_location("Adajan");
        let route = plan_route(&origin, &batch(), "http://localhost:3000/", timestamp()).unwrap();

        let payload = decode_shareable_link(&route.shareable_link).unwrap();

        assert_eq!(payload.batch_number, 1);
        assert_eq!(payload.stops, route.stops);
        assert_eq!(payload.origin, origin);
        assert_eq!(payload.timestamp, timestamp());
    }

    #[test]
    fn test_shared_route_replans_identically() {
        let origin = salesman_location("Mota Varachha");
        let route = plan_route(&origin, &batch(), "http://localhost:3000/", timestamp()).unwrap();
        let payload = decode_shareable_link(&route.shareable_link).unwrap();

        let resumed = plan_shared_route(&payload, "http://localhost:3000/").unwrap();

        assert_eq!(resumed.stops, route.stops);
        assert_eq!(resumed.shareable_link, route.shareable_link);
        assert_eq!(resumed.directions_link, route.directions_link);
    }

    #[test]
    fn test_empty_batch_plans_empty_route() {
        let origin = salesman_location("Adajan");

        let route = plan_route(&origin, &Batch::complete(), "http://localhost:3000/", timestamp()).unwrap();

        assert!(route.stops.is_empty());
        assert_eq!(route.total_distance_km, 0.0);
        assert_eq!(route.directions_link, "https://www.google.com/maps/dir/Adajan%2C%20Surat%2C%20Gujarat");
    }

    #[test]
    fn test_invalid_origin_is_rejected() {
        let mut origin = salesman_location("Adajan");
        origin.coordinates = Coordinates::new(100.0, 0.0);

        let err = plan_route(&origin, &batch(), "http://localhost:3000/", timestamp()).unwrap_err();
        assert!(matches!(err, PlannerError::InvalidCoordinates { .. }));
    }
}
