//! Geographic calculations

use crate::types::{Coordinates, Located};

/// Earth radius in kilometers
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Calculate Haversine distance between two points in kilometers
pub fn haversine_distance(from: &Coordinates, to: &Coordinates) -> f64 {
    let d_lat = (to.lat - from.lat).to_radians();
    let d_lon = (to.lng - from.lng).to_radians();

    let lat1 = from.lat.to_radians();
    let lat2 = to.lat.to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);

    let c = 2.0 * a.sqrt().asin();

    EARTH_RADIUS_KM * c
}

/// Length of the path origin -> stops[0] -> stops[1] -> ... in kilometers
pub fn path_distance<T: Located>(origin: &Coordinates, stops: &[T]) -> f64 {
    let mut current = *origin;
    let mut total = 0.0;

    for stop in stops {
        let next = stop.location();
        total += haversine_distance(&current, &next);
        current = next;
    }

    total
}
