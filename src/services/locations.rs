//! Salesman starting locations
//!
//! Fixed table keyed by area name. Areas without an entry start from the
//! `DEFAULT_AREA` location.

use tracing::debug;

use crate::defaults::DEFAULT_AREA;
use crate::types::{Coordinates, SalesmanLocation};

struct FixedPoint {
    area: &'static str,
    address: &'static str,
    coordinates: Coordinates,
}

const SALESMAN_LOCATIONS: &[FixedPoint] = &[
    FixedPoint {
        area: "Mota Varachha",
        address: "Mota Varachha, Surat, Gujarat",
        coordinates: Coordinates::new(21.2487, 72.8417),
    },
    FixedPoint {
        area: "Adajan",
        address: "Adajan, Surat, Gujarat",
        coordinates: Coordinates::new(21.1702, 72.8311),
    },
];

impl FixedPoint {
    fn to_location(&self) -> SalesmanLocation {
        SalesmanLocation {
            name: format!("{} Salesman House", self.area),
            address: self.address.to_string(),
            coordinates: self.coordinates,
        }
    }
}

fn find(area: &str) -> Option<&'static FixedPoint> {
    let area = area.trim();
    SALESMAN_LOCATIONS
        .iter()
        .find(|point| point.area.eq_ignore_ascii_case(area))
}

/// Starting location for `area`, or the default area's location
pub fn salesman_location(area: &str) -> SalesmanLocation {
    match find(area) {
        Some(point) => point.to_location(),
        None => {
            debug!("No salesman location for '{}', using {}", area, DEFAULT_AREA);
            default_location()
        }
    }
}

pub fn default_location() -> SalesmanLocation {
    SALESMAN_LOCATIONS
        .iter()
        .find(|point| point.area == DEFAULT_AREA)
        .unwrap_or(&SALESMAN_LOCATIONS[0])
        .to_location()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_area_lookup() {
        let location = salesman_location("Mota Varachha");
        assert_eq!(location.coordinates, Coordinates::new(21.2487, 72.8417));
        assert_eq!(location.name, "Mota Varachha Salesman House");
    }

    #[test]
    fn test_lookup_ignores_case_and_whitespace() {
        assert_eq!(salesman_location("  mota varachha ").coordinates.lat, 21.2487);
        assert_eq!(salesman_location("ADAJAN").name, "Adajan Salesman House");
    }

    #[test]
    fn test_unknown_area_falls_back_to_default() {
        let location = salesman_location("Vesu");
        assert_eq!(location, default_location());
        assert_eq!(location.coordinates, Coordinates::new(21.1702, 72.8311));
        assert!(find("Vesu").is_none());
    }

    #[test]
    fn test_every_fixed_point_is_valid() {
        for point in SALESMAN_LOCATIONS {
            assert!(point.coordinates.is_routable(), "{}", point.area);
        }
    }
}
