//! Error types shared by the search crates.

use thiserror::Error;

/// Failure reported by a [`PositionProvider`](crate::PositionProvider).
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum ProviderError {
    /// The requested epoch lies outside the provider's coverage.
    #[error("epoch JD {jd_et} outside ephemeris coverage")]
    OutOfRange { jd_et: f64 },
    /// The provider cannot compute positions for this target.
    #[error("unsupported target: {0}")]
    UnsupportedTarget(String),
    /// Any other provider failure.
    #[error("position provider failed: {0}")]
    Failed(String),
}

/// Three samples do not bracket a pair of zero crossings.
///
/// Recoverable: callers treat the corresponding phase as absent.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("no real roots in bracket (discriminant {discriminant})")]
pub struct DegenerateBracket {
    pub discriminant: f64,
}
