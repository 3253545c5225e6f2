use thiserror::Error;

/// A single geocoder lookup failing, for any reason.
#[derive(Debug, Clone, Error)]
pub enum GeocodeError {
    #[error("no match for address {0:?}")]
    NoMatch(String),
    #[error("geocoding request failed: {0}")]
    Request(String),
    #[error("malformed geocoding response: {0}")]
    Malformed(String),
}

/// One category's POI fetch failing. Scoped to that category; the rest of
/// the search carries on.
#[derive(Debug, Clone, Error)]
pub enum QueryError {
    #[error("overpass request failed: {0}")]
    Request(String),
    #[error("malformed overpass response: {0}")]
    Malformed(String),
}

/// The only fatal outcome of a search: without a resolved origin there is
/// nothing to rank against. Everything else degrades to a [`Warning`].
///
/// [`Warning`]: crate::Warning
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("could not resolve origin address {address:?}: {source}")]
    OriginNotFound {
        address: String,
        source: GeocodeError,
    },
}
