//! Resolve an address, query OpenStreetMap for nearby amenities, and rank
//! them by straight-line distance.
//!
//! The pipeline is three external-facing pieces glued together by
//! [`Searcher`]: a [`Geocoder`] (Nominatim), a [`PoiSource`] (Overpass) and
//! the pure ranking in [`rank`]. Both provider seams are traits so the
//! orchestration can be tested against canned data.

use core::fmt;

use clap::ValueEnum;
use geo::Point;
use serde::{Deserialize, Serialize, Serializer};

mod address;
mod error;
mod nominatim;
mod overpass;
pub mod rank;
mod search;

pub use address::Address;
pub use error::{GeocodeError, QueryError, SearchError};
pub use nominatim::{Geocoder, Location, Nominatim};
pub use overpass::{Overpass, Poi, PoiSource};
pub use rank::Ranked;
pub use search::{
    CategoryResult, Comparison, SearchParams, SearchResult, Searcher, Warning, DEFAULT_TOP_K,
};

/// An amenity kind the user can search for, with its OSM tag pair baked in.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Supermarket,
    School,
    Hospital,
    Pharmacy,
    Restaurant,
}

impl Category {
    pub fn all() -> &'static [Self] {
        &[
            Self::Supermarket,
            Self::School,
            Self::Hospital,
            Self::Pharmacy,
            Self::Restaurant,
        ]
    }

    /// The (key, value) tag pair Overpass filters on.
    // supermarkets are tagged shop=*, the rest are amenity=*
    pub fn tag(&self) -> (&'static str, &'static str) {
        match self {
            Self::Supermarket => ("shop", "supermarket"),
            Self::School => ("amenity", "school"),
            Self::Hospital => ("amenity", "hospital"),
            Self::Pharmacy => ("amenity", "pharmacy"),
            Self::Restaurant => ("amenity", "restaurant"),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Supermarket => "supermarket",
            Self::School => "school",
            Self::Hospital => "hospital",
            Self::Pharmacy => "pharmacy",
            Self::Restaurant => "restaurant",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

// geo stores x = lon, y = lat; serialize as the lat/lon object everyone expects
pub(crate) fn ser_point<S>(point: &Point, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    #[derive(Serialize)]
    struct LatLon {
        lat: f64,
        lon: f64,
    }

    LatLon {
        lat: point.y(),
        lon: point.x(),
    }
    .serialize(serializer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_pairs() {
        assert_eq!(Category::Supermarket.tag(), ("shop", "supermarket"));
        for category in Category::all() {
            let (key, value) = category.tag();
            assert!(key == "shop" || key == "amenity");
            assert!(!value.is_empty());
        }
    }

    #[test]
    fn point_serializes_as_lat_lon() {
        #[derive(Serialize)]
        struct Wrapper {
            #[serde(serialize_with = "ser_point")]
            point: Point,
        }

        let json = serde_json::to_value(Wrapper {
            point: Point::new(9.3748, 47.4239),
        })
        .unwrap();
        assert_eq!(json["point"]["lat"], 47.4239);
        assert_eq!(json["point"]["lon"], 9.3748);
    }
}
