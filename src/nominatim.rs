use std::time::Duration;

use geo::Point;
use serde::{Deserialize, Serialize};
use tracing::debug;
use ureq::Agent;

use crate::error::GeocodeError;

pub const ENDPOINT: &str = "https://nominatim.openstreetmap.org/search";

const TIMEOUT: Duration = Duration::from_secs(30);

/// Resolves a free-text address to a single place.
pub trait Geocoder {
    fn resolve(&self, query: &str) -> Result<Location, GeocodeError>;
}

/// A resolved address: where it is, what the provider calls it, and what
/// the user asked for.
#[derive(Debug, Clone, Serialize)]
pub struct Location {
    #[serde(serialize_with = "crate::ser_point")]
    pub point: Point,
    pub display_name: String,
    pub query: String,
}

/// Nominatim-backed [`Geocoder`]. One outbound lookup per call, no caching.
pub struct Nominatim {
    agent: Agent,
    endpoint: String,
}

impl Nominatim {
    pub fn new() -> Self {
        Self::with_endpoint(ENDPOINT)
    }

    pub fn with_endpoint(endpoint: &str) -> Self {
        Self {
            // nominatim's usage policy wants an identifying user agent
            agent: ureq::AgentBuilder::new()
                .timeout(TIMEOUT)
                .user_agent(concat!("nearby/", env!("CARGO_PKG_VERSION")))
                .build(),
            endpoint: endpoint.to_string(),
        }
    }
}

impl Default for Nominatim {
    fn default() -> Self {
        Self::new()
    }
}

impl Geocoder for Nominatim {
    fn resolve(&self, query: &str) -> Result<Location, GeocodeError> {
        debug!(query, "nominatim lookup");
        let places: Vec<RawPlace> = self
            .agent
            .get(&self.endpoint)
            .query("q", query)
            .query("format", "jsonv2")
            .query("limit", "1")
            .call()
            .map_err(|e| GeocodeError::Request(e.to_string()))?
            .into_json()
            .map_err(|e| GeocodeError::Malformed(e.to_string()))?;

        best_match(query, places)
    }
}

fn best_match(query: &str, places: Vec<RawPlace>) -> Result<Location, GeocodeError> {
    let Some(place) = places.into_iter().next() else {
        return Err(GeocodeError::NoMatch(query.to_string()));
    };
    place.refine(query)
}

#[derive(Deserialize)]
struct RawPlace {
    // nominatim sends coordinates as strings
    lat: String,
    lon: String,
    display_name: String,
}

impl RawPlace {
    fn refine(self, query: &str) -> Result<Location, GeocodeError> {
        let lat: f64 = self
            .lat
            .parse()
            .map_err(|_| GeocodeError::Malformed(format!("bad latitude {:?}", self.lat)))?;
        let lon: f64 = self
            .lon
            .parse()
            .map_err(|_| GeocodeError::Malformed(format!("bad longitude {:?}", self.lon)))?;
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return Err(GeocodeError::Malformed(format!(
                "coordinates out of range: {lat}, {lon}"
            )));
        }

        Ok(Location {
            point: Point::new(lon, lat),
            display_name: self.display_name,
            query: query.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refines_string_coordinates() {
        let raw: Vec<RawPlace> = serde_json::from_str(
            r#"[{"lat": "47.4239", "lon": "9.3748", "display_name": "St. Gallen, Switzerland", "place_rank": 16}]"#,
        )
        .unwrap();

        let location = best_match("st gallen", raw).unwrap();
        assert_eq!(location.point.y(), 47.4239);
        assert_eq!(location.point.x(), 9.3748);
        assert_eq!(location.display_name, "St. Gallen, Switzerland");
        assert_eq!(location.query, "st gallen");
    }

    #[test]
    fn empty_response_is_no_match() {
        match best_match("nowhere at all", Vec::new()) {
            Err(GeocodeError::NoMatch(query)) => assert_eq!(query, "nowhere at all"),
            other => panic!("expected NoMatch, got {other:?}"),
        }
    }

    #[test]
    fn rejects_junk_coordinates() {
        let junk = RawPlace {
            lat: "not-a-number".into(),
            lon: "9.0".into(),
            display_name: "x".into(),
        };
        assert!(matches!(
            junk.refine("x"),
            Err(GeocodeError::Malformed(_))
        ));

        let out_of_range = RawPlace {
            lat: "91.0".into(),
            lon: "9.0".into(),
            display_name: "x".into(),
        };
        assert!(matches!(
            out_of_range.refine("x"),
            Err(GeocodeError::Malformed(_))
        ));
    }
}
