//! Error types for horizon-event computation.

use grahan_core::{GEO_HEIGHT_MAX_M, GEO_HEIGHT_MIN_M, ProviderError};
use thiserror::Error;

/// Errors from rise/set/transit computation.
///
/// A body that simply never crosses the horizon is not an error; see
/// [`RiseSetResult::NotFound`](crate::RiseSetResult::NotFound).
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum RiseSetError {
    /// Observer height outside the supported band.
    #[error(
        "observer height {height_m} m outside [{min}, {max}] m",
        min = GEO_HEIGHT_MIN_M,
        max = GEO_HEIGHT_MAX_M
    )]
    InvalidLocation { height_m: f64 },
    /// Configuration not applicable to the requested target.
    #[error("invalid rise/set configuration: {0}")]
    InvalidConfig(&'static str),
    /// Error from the position provider.
    #[error(transparent)]
    Provider(#[from] ProviderError),
}
