//! Nearest-neighbor route ordering
//!
//! Greedy construction: starting from the origin, repeatedly move to the
//! closest stop not yet visited. O(n^2), which is fine for batch-sized
//! inputs.

use tracing::debug;

use crate::services::geo::haversine_distance;
use crate::types::{Coordinates, Located};

/// Order `stops` by nearest neighbor starting at `origin`
///
/// Returns a permutation of the input. Ties go to the stop that came first
/// in the input, so duplicate locations keep their relative order.
pub fn optimize<T: Located>(origin: &Coordinates, stops: Vec<T>) -> Vec<T> {
    if stops.len() <= 1 {
        return stops;
    }

    let n = stops.len();
    let mut remaining: Vec<Option<T>> = stops.into_iter().map(Some).collect();
    let mut route = Vec::with_capacity(n);
    let mut current = *origin;

    for _ in 0..n {
        let mut best_next = None;
        let mut best_distance = f64::INFINITY;

        for (j, slot) in remaining.iter().enumerate() {
            if let Some(stop) = slot {
                let dist = haversine_distance(&current, &stop.location());
                if dist < best_distance {
                    best_distance = dist;
                    best_next = Some(j);
                }
            }
        }

        // NaN distances never compare smaller; fall back to input order
        let next = best_next.or_else(|| remaining.iter().position(Option::is_some));

        if let Some(stop) = next.and_then(|j| remaining[j].take()) {
            current = stop.location();
            route.push(stop);
        }
    }

    debug!("Ordered {} stops by nearest neighbor", route.len());
    route
}
