//! Error types for eclipse and occultation search.

use grahan_core::{GEO_HEIGHT_MAX_M, GEO_HEIGHT_MIN_M, GeoPosition, ProviderError};
use grahan_riseset::RiseSetError;
use thiserror::Error;

/// Errors from eclipse/occultation computation.
///
/// "No eclipse at this instant" is not an error: where/how report an
/// [`EclipsePhase::None`](crate::EclipsePhase::None) and the searches keep
/// going.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum SearchError {
    /// Error from the position provider.
    #[error(transparent)]
    Provider(#[from] ProviderError),
    /// Observer height outside the supported band. Checked before any
    /// provider call.
    #[error(
        "geographic height {height_m} m outside [{min}, {max}] m",
        min = GEO_HEIGHT_MIN_M,
        max = GEO_HEIGHT_MAX_M
    )]
    InvalidGeographicAltitude { height_m: f64 },
    /// Ephemeris coverage ended, or the epoch cap was reached.
    #[error("search exhausted near JD {last_jd}")]
    SearchExhausted { last_jd: f64 },
    /// The target cannot take part in this kind of event.
    #[error("invalid target: {0}")]
    InvalidTarget(String),
    /// Contradictory or unsupported search configuration.
    #[error("invalid search configuration: {0}")]
    InvalidConfig(&'static str),
}

impl From<RiseSetError> for SearchError {
    fn from(e: RiseSetError) -> Self {
        match e {
            RiseSetError::InvalidLocation { height_m } => Self::InvalidGeographicAltitude { height_m },
            RiseSetError::InvalidConfig(msg) => Self::InvalidConfig(msg),
            RiseSetError::Provider(p) => Self::Provider(p),
            other => Self::Provider(ProviderError::Failed(other.to_string())),
        }
    }
}

/// Observer height check, run before any provider call.
pub(crate) fn check_site(site: &GeoPosition) -> Result<(), SearchError> {
    if site.height_in_range() {
        Ok(())
    } else {
        Err(SearchError::InvalidGeographicAltitude {
            height_m: site.height_m,
        })
    }
}
