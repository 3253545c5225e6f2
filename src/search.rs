use core::fmt;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{
    address::Address,
    error::{GeocodeError, SearchError},
    nominatim::{Geocoder, Location},
    overpass::PoiSource,
    rank::{self, Ranked},
    Category,
};

pub const DEFAULT_TOP_K: usize = 3;

/// One search invocation's inputs.
#[derive(Debug, Clone)]
pub struct SearchParams {
    pub origin: Address,
    /// Optional second address; the result reports its straight-line
    /// distance from the origin.
    pub comparison: Option<Address>,
    /// Must be positive. Bounds are input policy, enforced at the boundary.
    pub radius_m: f64,
    pub categories: Vec<Category>,
}

/// Everything one search produced. Built fresh per invocation, nothing is
/// carried over from previous searches.
#[derive(Debug, Serialize)]
pub struct SearchResult {
    pub origin: Location,
    pub comparison: Option<Comparison>,
    /// One entry per requested category, in request order. Empty `nearest`
    /// means either no features in range or a failed query; the latter also
    /// leaves a warning.
    pub categories: Vec<CategoryResult>,
    pub warnings: Vec<Warning>,
}

#[derive(Debug, Serialize)]
pub struct Comparison {
    pub location: Location,
    pub distance_m: f64,
}

#[derive(Debug, Serialize)]
pub struct CategoryResult {
    pub category: Category,
    pub nearest: Vec<Ranked>,
}

/// Non-fatal degradations, carried inside the result so the caller can show
/// a specific message per stage.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Warning {
    CategoryFailed { category: Category, reason: String },
    ComparisonNotFound { address: String, reason: String },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CategoryFailed { category, reason } => {
                write!(f, "{category} lookup failed: {reason}")
            }
            Self::ComparisonNotFound { address, reason } => {
                write!(f, "comparison address {address:?} skipped: {reason}")
            }
        }
    }
}

/// Ties the geocoder, the POI source and the ranking together.
///
/// Holds no per-search state; `search` can be called any number of times and
/// each call starts from a blank aggregate.
pub struct Searcher<G, P> {
    geocoder: G,
    poi: P,
    top_k: usize,
}

impl<G: Geocoder, P: PoiSource> Searcher<G, P> {
    pub fn new(geocoder: G, poi: P) -> Self {
        Self {
            geocoder,
            poi,
            top_k: DEFAULT_TOP_K,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn search(&self, params: &SearchParams) -> Result<SearchResult, SearchError> {
        let address = params.origin.query();
        if params.origin.is_empty() {
            return Err(SearchError::OriginNotFound {
                source: GeocodeError::NoMatch(address.clone()),
                address,
            });
        }

        // no origin, no search
        let origin = self
            .geocoder
            .resolve(&address)
            .map_err(|source| SearchError::OriginNotFound { address, source })?;
        info!(origin = %origin.display_name, "origin resolved");

        let mut warnings = Vec::new();

        // categories are independent; fetch them in parallel but keep the
        // requested order in the result
        let poi = &self.poi;
        let origin_point = origin.point;
        let radius_m = params.radius_m;
        let fetched: Vec<_> = params
            .categories
            .par_iter()
            .map(|&category| (category, poi.find_nearby(origin_point, radius_m, category)))
            .collect();

        let mut categories = Vec::with_capacity(fetched.len());
        for (category, outcome) in fetched {
            let nearest = match outcome {
                Ok(candidates) => {
                    debug!(%category, candidates = candidates.len(), "ranking");
                    rank::rank(origin.point, candidates, self.top_k)
                }
                Err(error) => {
                    // one category failing must not sink the others
                    warn!(%category, %error, "category query failed");
                    warnings.push(Warning::CategoryFailed {
                        category,
                        reason: error.to_string(),
                    });
                    Vec::new()
                }
            };
            categories.push(CategoryResult { category, nearest });
        }

        let comparison = self.resolve_comparison(&origin, params.comparison.as_ref(), &mut warnings);

        Ok(SearchResult {
            origin,
            comparison,
            categories,
            warnings,
        })
    }

    /// An absent or empty comparison address is simply no comparison; one
    /// that fails to resolve is a warning, never a fatal error.
    fn resolve_comparison(
        &self,
        origin: &Location,
        address: Option<&Address>,
        warnings: &mut Vec<Warning>,
    ) -> Option<Comparison> {
        let address = address?;
        if address.is_empty() {
            return None;
        }

        let query = address.query();
        match self.geocoder.resolve(&query) {
            Ok(location) => {
                let distance_m = rank::distance(origin.point, location.point);
                Some(Comparison {
                    location,
                    distance_m,
                })
            }
            Err(error) => {
                warn!(address = %query, %error, "comparison address skipped");
                warnings.push(Warning::ComparisonNotFound {
                    address: query,
                    reason: error.to_string(),
                });
                None
            }
        }
    }
}
