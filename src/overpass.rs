use std::{collections::BTreeMap, time::Duration};

use geo::Point;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use ureq::Agent;

use crate::{error::QueryError, Category};

pub const ENDPOINT: &str = "https://overpass-api.de/api/interpreter";

const TIMEOUT: Duration = Duration::from_secs(30);

/// Fetches points of interest of one category around an origin.
///
/// `Sync` because categories are queried in parallel.
pub trait PoiSource: Sync {
    fn find_nearby(
        &self,
        origin: Point,
        radius_m: f64,
        category: Category,
    ) -> Result<Vec<Poi>, QueryError>;
}

/// A placeable point of interest. Lives only for the duration of one search.
#[derive(Debug, Clone, Serialize)]
pub struct Poi {
    #[serde(serialize_with = "crate::ser_point")]
    pub point: Point,
    pub name: String,
    pub category: Category,
}

/// Overpass-backed [`PoiSource`].
pub struct Overpass {
    agent: Agent,
    endpoint: String,
}

impl Overpass {
    pub fn new() -> Self {
        Self::with_endpoint(ENDPOINT)
    }

    pub fn with_endpoint(endpoint: &str) -> Self {
        Self {
            agent: ureq::AgentBuilder::new()
                .timeout(TIMEOUT)
                .user_agent(concat!("nearby/", env!("CARGO_PKG_VERSION")))
                .build(),
            endpoint: endpoint.to_string(),
        }
    }
}

impl Default for Overpass {
    fn default() -> Self {
        Self::new()
    }
}

impl PoiSource for Overpass {
    fn find_nearby(
        &self,
        origin: Point,
        radius_m: f64,
        category: Category,
    ) -> Result<Vec<Poi>, QueryError> {
        let (key, value) = category.tag();
        // nwr covers nodes, ways and relations; `out center` adds a computed
        // centroid for the latter two. around: is a great-circle radius, not
        // a bounding box.
        let query = format!(
            "nwr[{key:?}={value:?}](around:{radius_m},{lat},{lon}); out center;",
            lat = origin.y(),
            lon = origin.x(),
        );
        let payload = format!("[out:json][timeout:25]; {query}");
        debug!(%category, radius_m, "overpass query");

        let response: OverpassResponse = self
            .agent
            .post(&self.endpoint)
            .send_form(&[("data", &payload)])
            .map_err(|e| QueryError::Request(e.to_string()))?
            .into_json()
            .map_err(|e| QueryError::Malformed(e.to_string()))?;

        Ok(refine_elements(response.elements, category))
    }
}

fn refine_elements(elements: Vec<RawElement>, category: Category) -> Vec<Poi> {
    let mut dropped = 0usize;
    let mut pois = Vec::with_capacity(elements.len());
    for element in elements {
        match element.refine(category) {
            Some(poi) => pois.push(poi),
            None => dropped += 1,
        }
    }
    if dropped > 0 {
        warn!(%category, dropped, "elements without a usable position");
    }
    pois
}

#[derive(Deserialize)]
struct OverpassResponse {
    elements: Vec<RawElement>,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
enum RawElement {
    Node {
        #[serde(flatten)]
        position: Option<RawPosition>,
        #[serde(default)]
        tags: BTreeMap<String, String>,
    },
    Way {
        center: Option<RawPosition>,
        #[serde(default)]
        tags: BTreeMap<String, String>,
    },
    Relation {
        center: Option<RawPosition>,
        #[serde(default)]
        tags: BTreeMap<String, String>,
    },
}

impl RawElement {
    /// Nodes carry their own coordinate; ways and relations only a computed
    /// center. Anything with neither cannot be placed and is dropped.
    fn refine(self, category: Category) -> Option<Poi> {
        let (position, mut tags) = match self {
            Self::Node { position, tags } => (position, tags),
            Self::Way { center, tags } | Self::Relation { center, tags } => (center, tags),
        };
        let point = position?.refine()?;
        let name = tags
            .remove("name")
            .unwrap_or_else(|| format!("Unnamed {}", category.label()));

        Some(Poi {
            point,
            name,
            category,
        })
    }
}

#[derive(Deserialize)]
struct RawPosition {
    lat: f64,
    lon: f64,
}

impl RawPosition {
    fn refine(self) -> Option<Point> {
        ((-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lon))
            .then(|| Point::new(self.lon, self.lat))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESPONSE: &str = r#"{
        "elements": [
            {"type": "node", "id": 1, "lat": 47.42, "lon": 9.37,
             "tags": {"shop": "supermarket", "name": "Migros"}},
            {"type": "way", "id": 2, "center": {"lat": 47.43, "lon": 9.38},
             "tags": {"shop": "supermarket"}},
            {"type": "relation", "id": 3, "center": {"lat": 47.44, "lon": 9.39},
             "tags": {"shop": "supermarket", "name": "Coop"}},
            {"type": "way", "id": 4, "tags": {"shop": "supermarket", "name": "no center"}}
        ]
    }"#;

    #[test]
    fn refines_all_geometry_kinds() {
        let response: OverpassResponse = serde_json::from_str(RESPONSE).unwrap();
        let pois = refine_elements(response.elements, Category::Supermarket);

        // the centerless way is dropped
        assert_eq!(pois.len(), 3);
        assert_eq!(pois[0].name, "Migros");
        assert_eq!(pois[0].point.y(), 47.42);
        assert_eq!(pois[0].point.x(), 9.37);
        // way and relation use the computed center
        assert_eq!(pois[1].point.y(), 47.43);
        assert_eq!(pois[2].name, "Coop");
        assert!(pois.iter().all(|p| p.category == Category::Supermarket));
    }

    #[test]
    fn unnamed_elements_get_a_placeholder() {
        let response: OverpassResponse = serde_json::from_str(RESPONSE).unwrap();
        let pois = refine_elements(response.elements, Category::Supermarket);
        assert_eq!(pois[1].name, "Unnamed supermarket");
    }

    #[test]
    fn out_of_range_position_is_dropped() {
        assert!(RawPosition {
            lat: 91.0,
            lon: 9.0
        }
        .refine()
        .is_none());
        assert!(RawPosition {
            lat: 47.0,
            lon: 181.0
        }
        .refine()
        .is_none());
    }
}
