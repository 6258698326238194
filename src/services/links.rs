//! Navigation and share links
//!
//! Two renderings of a route: a Google Maps directions URL for driving, and
//! an application link that carries the whole batch as percent-encoded JSON
//! so another device can pick up exactly where this one left off.

use tracing::{debug, warn};

use crate::defaults::SHARE_QUERY_PARAM;
use crate::error::PlannerError;
use crate::types::{Lead, SalesmanLocation, SharePayload};

const DIRECTIONS_BASE_URL: &str = "https://www.google.com/maps/dir/";

/// Google Maps directions URL from the origin through every stop in order
pub fn directions_link(origin: &SalesmanLocation, stops: &[Lead]) -> String {
    let mut segments = Vec::with_capacity(stops.len() + 1);
    segments.push(urlencoding::encode(&origin.address).into_owned());
    segments.extend(stops.iter().map(|stop| urlencoding::encode(&waypoint(stop)).into_owned()));

    format!("{}{}", DIRECTIONS_BASE_URL, segments.join("/"))
}

/// "name, address", or whichever half is actually known
fn waypoint(stop: &Lead) -> String {
    match (stop.has_name(), stop.has_address()) {
        (true, true) => format!("{}, {}", stop.name, stop.address),
        (false, _) => stop.address.clone(),
        (true, false) => stop.name.clone(),
    }
}

/// Append the payload to `base_url` as the share query parameter
pub fn shareable_link(base_url: &str, payload: &SharePayload) -> Result<String, PlannerError> {
    let json = serde_json::to_string(payload)?;
    let separator = if base_url.contains('?') { '&' } else { '?' };

    Ok(format!(
        "{}{}{}={}",
        base_url,
        separator,
        SHARE_QUERY_PARAM,
        urlencoding::encode(&json)
    ))
}

/// Recover the payload embedded by [`shareable_link`]
pub fn decode_shareable_link(link: &str) -> Result<SharePayload, PlannerError> {
    let link = link.trim();
    let without_fragment = link.split('#').next().unwrap_or(link);

    let query = without_fragment
        .split_once('?')
        .map(|(_, query)| query)
        .ok_or_else(|| PlannerError::MalformedShareLink("link has no query string".into()))?;

    let encoded = query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == SHARE_QUERY_PARAM)
        .map(|(_, value)| value)
        .ok_or_else(|| {
            PlannerError::MalformedShareLink(format!("missing '{}' parameter", SHARE_QUERY_PARAM))
        })?;

    let json = urlencoding::decode(encoded).map_err(|e| {
        warn!("Share link payload is not valid percent-encoded UTF-8: {}", e);
        PlannerError::MalformedShareLink(format!("invalid encoding: {}", e))
    })?;

    let payload: SharePayload = serde_json::from_str(&json).map_err(|e| {
        warn!("Share link payload is not a valid route: {}", e);
        PlannerError::MalformedShareLink(format!("invalid payload: {}", e))
    })?;

    debug!(
        "Decoded share link for batch {} with {} stops",
        payload.batch_number,
        payload.stops.len()
    );
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use crate::types::{Coordinates, PlaceRecord};

    fn origin() -> SalesmanLocation {
        SalesmanLocation {
            name: "Adajan Salesman House".into(),
            address: "Adajan, Surat, Gujarat".into(),
            coordinates: Coordinates::new(21.1702, 72.8311),
        }
    }

    fn lead(id: &str, name: Option<&str>, address: Option<&str>) -> Lead {
        Lead::from_place(
            PlaceRecord {
                id: id.into(),
                name: name.map(String::from),
                address: address.map(String::from),
                rating: Some(4.5),
                review_count: Some(87),
                hours: vec!["Monday: 9:00 AM – 9:00 PM".into()],
                location: Some(Coordinates::new(21.1925, 72.7958)),
                ..Default::default()
            },
            "cafe",
        )
    }

    fn payload(stops: Vec<Lead>) -> SharePayload {
        SharePayload {
            batch_number: 2,
            stops,
            origin: origin(),
            timestamp: Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0).unwrap(),
        }
    }

    #[test]
    fn test_directions_link_encodes_origin_and_stops() {
        let stops = vec![
            lead("a", Some("Cafe One"), Some("Pal, Surat")),
            lead("b", None, Some("Vesu, Surat")),
        ];

        let link = directions_link(&origin(), &stops);

        assert_eq!(
            link,
            "https://www.google.com/maps/dir/Adajan%2C%20Surat%2C%20Gujarat/Cafe%20One%2C%20Pal%2C%20Surat/Vesu%2C%20Surat"
        );
    }

    #[test]
    fn test_directions_link_without_stops_has_only_origin() {
        let link = directions_link(&origin(), &[]);
        assert_eq!(link, "https://www.google.com/maps/dir/Adajan%2C%20Surat%2C%20Gujarat");
    }

    #[test]
    fn test_waypoint_falls_back_to_name_without_address() {
        let stop = lead("c", Some("Cafe Two"), None);
        assert_eq!(waypoint(&stop), "Cafe Two");
    }

    #[test]
    fn test_share_link_round_trip() {
        let original = payload(vec![
            lead("a", Some("Café \"Ek\" & Sons"), Some("Ring Rd, Surat #4")),
            lead("b", None, None),
        ]);

        let link = shareable_link("https://leads.example.com/", &original).unwrap();
        assert!(link.starts_with("https://leads.example.com/?batch="));

        let decoded = decode_shareable_link(&link).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_share_link_with_empty_stops_is_well_formed() {
        let original = payload(vec![]);
        let link = shareable_link("http://localhost:3000/", &original).unwrap();

        let decoded = decode_shareable_link(&link).unwrap();
        assert!(decoded.stops.is_empty());
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_share_link_appends_to_existing_query() {
        let original = payload(vec![]);
        let link = shareable_link("http://localhost:3000/app?view=map", &original).unwrap();

        assert!(link.contains("?view=map&batch="));
        assert_eq!(decode_shareable_link(&link).unwrap(), original);
    }

    #[test]
    fn test_decode_ignores_fragment() {
        let original = payload(vec![]);
        let link = format!("{}#top", shareable_link("http://localhost:3000/", &original).unwrap());
        assert_eq!(decode_shareable_link(&link).unwrap(), original);
    }

    #[test]
    fn test_decode_rejects_missing_parameter() {
        let err = decode_shareable_link("http://localhost:3000/?view=map").unwrap_err();
        assert!(matches!(err, PlannerError::MalformedShareLink(_)));

        let err = decode_shareable_link("http://localhost:3000/").unwrap_err();
        assert!(matches!(err, PlannerError::MalformedShareLink(_)));
    }

    #[test]
    fn test_decode_rejects_invalid_json() {
        let link = format!("http://localhost:3000/?batch={}", urlencoding::encode("{not json"));
        let err = decode_shareable_link(&link).unwrap_err();
        assert!(matches!(err, PlannerError::MalformedShareLink(_)));
    }

    #[test]
    fn test_decode_rejects_missing_fields() {
        let json = r#"{"batchNumber":1,"stops":[]}"#;
        let link = format!("http://localhost:3000/?batch={}", urlencoding::encode(json));
        let err = decode_shareable_link(&link).unwrap_err();
        assert!(err.to_string().contains("invalid payload"));
    }

    #[test]
    fn test_decode_rejects_bad_percent_encoding() {
        let err = decode_shareable_link("http://localhost:3000/?batch=%FF%FE").unwrap_err();
        assert!(matches!(err, PlannerError::MalformedShareLink(_)));
    }
}
