//! The stepwise search driver shared by every eclipse and occultation search.
//!
//! A search walks candidate epochs (lunations, or conjunction cursors for
//! occultations). Each epoch moves through
//! `Seeking -> Candidate -> Classifying -> SolvingContacts -> Validating`
//! and ends either `Accepted` or `Rejected`. Rejection advances to the next
//! epoch in the search direction, unless single-attempt mode asks the
//! caller to restart instead.

use std::fmt;

use grahan_core::ProviderError;

use crate::eclipse_types::{EclipseEvent, EclipseSearchConfig, SearchDirection, SearchOutcome};
use crate::error::SearchError;
use crate::lunation::Lunation;

/// Days an occultation cursor jumps past a conjunction that missed.
const OCCULTATION_JUMP_DAYS: f64 = 20.0;

/// A candidate epoch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Epoch {
    Lunation(Lunation),
    /// JD ET from which the next Moon/target conjunction is sought, or the
    /// conjunction itself once found.
    Cursor(f64),
}

impl Epoch {
    pub fn advance(self, direction: SearchDirection) -> Self {
        match self {
            Self::Lunation(l) => Self::Lunation(l.next(direction)),
            Self::Cursor(t) => Self::Cursor(t + direction.sign() * OCCULTATION_JUMP_DAYS),
        }
    }
}

/// Why a candidate epoch was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RejectReason {
    /// Moon too far from a node at the syzygy.
    OutsideNodeWindow,
    /// No eclipse at the refined maximum.
    NoEventAtMaximum,
    /// Maximum not beyond the search start.
    BeforeStart,
    /// Event kind excluded by the filter.
    FilteredOut,
    /// Never above the horizon at the site.
    NotVisible,
    /// Target too far from the Moon in latitude at conjunction.
    LatitudeCutoff,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::OutsideNodeWindow => "outside node window",
            Self::NoEventAtMaximum => "no event at maximum",
            Self::BeforeStart => "before search start",
            Self::FilteredOut => "filtered out",
            Self::NotVisible => "not visible",
            Self::LatitudeCutoff => "latitude cutoff",
        })
    }
}

/// A dropped candidate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Rejection {
    pub reason: RejectReason,
    /// Restart instant (JD UT) for single-attempt mode. `None` for epochs
    /// that were never a real candidate (pre-filtered, or before the
    /// start); those are skipped even in single-attempt mode.
    pub retry_from: Option<f64>,
}

impl Rejection {
    /// Dropped without examining the sky.
    pub fn skip(reason: RejectReason) -> Self {
        Self {
            reason,
            retry_from: None,
        }
    }

    /// A real candidate whose maximum was at `jd_ut`.
    pub fn candidate(reason: RejectReason, jd_ut: f64, direction: SearchDirection) -> Self {
        Self {
            reason,
            retry_from: Some(jd_ut + direction.sign() * RETRY_OFFSET_DAYS),
        }
    }
}

/// Restart instants lie this far beyond a rejected maximum.
const RETRY_OFFSET_DAYS: f64 = 0.001;

/// State of one epoch.
pub(crate) enum Step<D> {
    Seeking(Epoch),
    /// Approximate maximum (JD ET) to refine.
    Candidate(Epoch, f64),
    Classifying(Epoch, D),
    SolvingContacts(Epoch, D),
    Validating(Epoch, D),
    Accepted(EclipseEvent),
    Rejected(Epoch, Rejection),
}

/// One kind of search, as a set of stage transitions.
pub(crate) trait SearchMachine {
    /// Working state carried between stages of one epoch.
    type Draft;

    fn direction(&self) -> SearchDirection;

    fn seek(&mut self, epoch: Epoch) -> Result<Step<Self::Draft>, SearchError>;

    fn refine(&mut self, epoch: Epoch, approx_jd_et: f64) -> Result<Step<Self::Draft>, SearchError>;

    fn classify(&mut self, epoch: Epoch, draft: Self::Draft)
    -> Result<Step<Self::Draft>, SearchError>;

    fn solve_contacts(
        &mut self,
        epoch: Epoch,
        draft: Self::Draft,
    ) -> Result<Step<Self::Draft>, SearchError>;

    fn validate(&mut self, epoch: Epoch, draft: Self::Draft)
    -> Result<Step<Self::Draft>, SearchError>;
}

/// Search limits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Limits {
    pub single_attempt: bool,
    pub max_epochs: Option<u32>,
}

impl From<&EclipseSearchConfig> for Limits {
    fn from(config: &EclipseSearchConfig) -> Self {
        Self {
            single_attempt: config.single_attempt,
            max_epochs: config.max_epochs,
        }
    }
}

/// Drive `machine` from `first` until an event is accepted, the attempt
/// cap is reached, or the provider's coverage ends.
pub(crate) fn drive<M: SearchMachine>(
    machine: &mut M,
    first: Epoch,
    limits: Limits,
) -> Result<SearchOutcome<EclipseEvent>, SearchError> {
    let direction = machine.direction();
    let mut rejected = 0u32;
    let mut step = Step::Seeking(first);
    loop {
        let next = match step {
            Step::Seeking(epoch) => machine.seek(epoch),
            Step::Candidate(epoch, jd_et) => machine.refine(epoch, jd_et),
            Step::Classifying(epoch, draft) => machine.classify(epoch, draft),
            Step::SolvingContacts(epoch, draft) => machine.solve_contacts(epoch, draft),
            Step::Validating(epoch, draft) => machine.validate(epoch, draft),
            Step::Accepted(event) => {
                tracing::debug!(
                    kind = ?event.kind,
                    phase = ?event.event_type.phase,
                    jd_ut = event.contacts.maximum,
                    "eclipse accepted"
                );
                return Ok(SearchOutcome::Found(event));
            }
            Step::Rejected(epoch, rejection) => {
                tracing::debug!(?epoch, reason = %rejection.reason, "candidate rejected");
                if limits.single_attempt {
                    if let Some(next_start_jd_ut) = rejection.retry_from {
                        return Ok(SearchOutcome::Retry { next_start_jd_ut });
                    }
                }
                rejected += 1;
                if limits.max_epochs.is_some_and(|max| rejected >= max) {
                    let last_jd = match epoch {
                        Epoch::Lunation(l) => l.approximate_jd_et(),
                        Epoch::Cursor(t) => t,
                    };
                    return Err(SearchError::SearchExhausted { last_jd });
                }
                Ok(Step::Seeking(epoch.advance(direction)))
            }
        };
        step = next.map_err(exhausted_on_coverage_end)?;
    }
}

/// Repeated forward searches from `jd_start`, each restarting at the
/// previous maximum, collecting events up to `jd_end`.
pub(crate) fn collect_forward<F>(
    jd_start: f64,
    jd_end: f64,
    mut next: F,
) -> Result<Vec<EclipseEvent>, SearchError>
where
    F: FnMut(f64) -> Result<SearchOutcome<EclipseEvent>, SearchError>,
{
    let mut events = Vec::new();
    let mut from = jd_start;
    loop {
        match next(from)? {
            SearchOutcome::Found(event) => {
                if event.contacts.maximum > jd_end {
                    break;
                }
                from = event.contacts.maximum;
                events.push(event);
            }
            SearchOutcome::Retry { next_start_jd_ut } => {
                if next_start_jd_ut > jd_end {
                    break;
                }
                from = next_start_jd_ut;
            }
        }
    }
    tracing::debug!(jd_start, jd_end, found = events.len(), "range search complete");
    Ok(events)
}

/// Provider coverage ending mid-search means the search is exhausted.
fn exhausted_on_coverage_end(e: SearchError) -> SearchError {
    match e {
        SearchError::Provider(ProviderError::OutOfRange { jd_et }) => {
            SearchError::SearchExhausted { last_jd: jd_et }
        }
        other => other,
    }
}
