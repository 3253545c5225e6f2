//! Pure distance math and top-k selection. No I/O in here.

use geo::{GeodesicDistance, Point};
use serde::Serialize;

use crate::overpass::Poi;

/// A candidate with its computed distance from the search origin.
#[derive(Debug, Clone, Serialize)]
pub struct Ranked {
    #[serde(flatten)]
    pub poi: Poi,
    pub distance_m: f64,
}

/// Great-circle distance in meters on the WGS84 ellipsoid.
pub fn distance(a: Point, b: Point) -> f64 {
    a.geodesic_distance(&b)
}

/// Sorts candidates by distance from `origin` and keeps the nearest `k`.
///
/// The sort is stable: ties keep their query order. Truncation happens after
/// sorting, so the result is always the k nearest, not the first k fetched.
pub fn rank(origin: Point, candidates: Vec<Poi>, k: usize) -> Vec<Ranked> {
    let mut ranked: Vec<Ranked> = candidates
        .into_iter()
        .map(|poi| Ranked {
            distance_m: distance(origin, poi.point),
            poi,
        })
        .collect();
    ranked.sort_by(|a, b| a.distance_m.total_cmp(&b.distance_m));
    ranked.truncate(k);
    ranked
}
