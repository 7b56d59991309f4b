//! Provider wrapper that records every position request.

use std::cell::RefCell;

use grahan_core::{EclipseKind, Position, PositionProvider, PositionRequest, ProviderError, SarosId};

/// Wraps a provider and records the ET epoch of each position request.
#[derive(Debug, Default)]
pub struct RecordingProvider<P> {
    inner: P,
    epochs: RefCell<Vec<f64>>,
}

impl<P> RecordingProvider<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            epochs: RefCell::new(Vec::new()),
        }
    }

    /// Number of position requests so far.
    pub fn calls(&self) -> usize {
        self.epochs.borrow().len()
    }

    /// ET epochs of all position requests, in call order.
    pub fn epochs(&self) -> Vec<f64> {
        self.epochs.borrow().clone()
    }

    pub fn reset(&self) {
        self.epochs.borrow_mut().clear();
    }
}

impl<P: PositionProvider> PositionProvider for RecordingProvider<P> {
    fn position(&self, request: &PositionRequest<'_>) -> Result<Position, ProviderError> {
        self.epochs.borrow_mut().push(request.jd_et);
        self.inner.position(request)
    }

    fn delta_t_seconds(&self, jd_ut: f64) -> f64 {
        self.inner.delta_t_seconds(jd_ut)
    }

    fn sidereal_time_deg(&self, jd_ut: f64) -> f64 {
        self.inner.sidereal_time_deg(jd_ut)
    }

    fn obliquity_deg(&self, jd_et: f64) -> f64 {
        self.inner.obliquity_deg(jd_et)
    }

    fn saros(&self, kind: EclipseKind, jd_ut: f64) -> Option<SarosId> {
        self.inner.saros(kind, jd_ut)
    }
}
