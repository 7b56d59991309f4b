//! Types for eclipse and occultation search.

use std::ops::BitOr;

use grahan_core::{Atmosphere, EclipseKind, EphemerisSelector, GeoPosition, SarosId};

use crate::error::SearchError;

/// Phase of an eclipse or occultation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EclipsePhase {
    /// No eclipse at the queried instant or place.
    None,
    Partial,
    /// The occulting disc lies entirely inside the occulted disc.
    Annular,
    /// The occulted disc is completely covered.
    Total,
    /// Hybrid: annular along part of the central path, total along the rest.
    AnnularTotal,
    /// Moon inside the Earth's penumbra only.
    Penumbral,
}

impl EclipsePhase {
    /// The filter bit accepting this phase.
    pub fn filter_bit(self) -> EclipseFilter {
        match self {
            Self::None => EclipseFilter::NONE,
            Self::Partial => EclipseFilter::PARTIAL,
            Self::Annular => EclipseFilter::ANNULAR,
            Self::Total => EclipseFilter::TOTAL,
            Self::AnnularTotal => EclipseFilter::ANNULAR_TOTAL,
            Self::Penumbral => EclipseFilter::PENUMBRAL,
        }
    }

    pub fn is_eclipse(self) -> bool {
        self != Self::None
    }
}

/// Whether the shadow axis meets the Earth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Centrality {
    Central,
    /// The umbra or antumbra grazes the Earth but its axis misses.
    NonCentral,
}

impl Centrality {
    pub fn filter_bit(self) -> EclipseFilter {
        match self {
            Self::Central => EclipseFilter::CENTRAL,
            Self::NonCentral => EclipseFilter::NON_CENTRAL,
        }
    }
}

/// Which instants of a local event have the body above the horizon.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContactVisibility {
    pub maximum: bool,
    pub partial_begin: bool,
    pub totality_begin: bool,
    pub totality_end: bool,
    pub partial_end: bool,
    pub penumbral_begin: bool,
    pub penumbral_end: bool,
}

impl ContactVisibility {
    pub fn any(&self) -> bool {
        self.maximum
            || self.partial_begin
            || self.totality_begin
            || self.totality_end
            || self.partial_end
            || self.penumbral_begin
            || self.penumbral_end
    }
}

/// Classification of a found event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EventType {
    pub phase: EclipsePhase,
    /// Solar eclipses and occultations only.
    pub centrality: Option<Centrality>,
    /// Local searches only.
    pub visibility: Option<ContactVisibility>,
}

impl EventType {
    pub fn none() -> Self {
        Self {
            phase: EclipsePhase::None,
            centrality: None,
            visibility: None,
        }
    }
}

/// Set of acceptable eclipse kinds.
///
/// An empty filter accepts everything of the searched kind. Solar and
/// occultation searches that name phases but no centrality accept both
/// centralities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EclipseFilter(u16);

impl EclipseFilter {
    pub const NONE: Self = Self(0);
    pub const CENTRAL: Self = Self(1);
    pub const NON_CENTRAL: Self = Self(1 << 1);
    pub const TOTAL: Self = Self(1 << 2);
    pub const ANNULAR: Self = Self(1 << 3);
    pub const PARTIAL: Self = Self(1 << 4);
    pub const ANNULAR_TOTAL: Self = Self(1 << 5);
    pub const PENUMBRAL: Self = Self(1 << 6);

    /// Every solar eclipse and occultation kind.
    pub const ALL_SOLAR: Self = Self(0b0011_1111);
    /// Every lunar eclipse kind.
    pub const ALL_LUNAR: Self = Self(Self::TOTAL.0 | Self::PARTIAL.0 | Self::PENUMBRAL.0);

    const CENTRALITY: Self = Self(Self::CENTRAL.0 | Self::NON_CENTRAL.0);
    const CORE_PHASES: Self = Self(Self::TOTAL.0 | Self::ANNULAR.0 | Self::ANNULAR_TOTAL.0);

    pub const fn bits(self) -> u16 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Whether every bit of `other` is set.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether any bit of `other` is set.
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn intersection(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }

    /// Normalized filter for solar eclipse and occultation searches.
    pub(crate) fn normalized_solar(self) -> Result<Self, SearchError> {
        let mut f = self.intersection(Self::ALL_SOLAR);
        if f.is_empty() {
            return Ok(Self::ALL_SOLAR);
        }
        if f == Self::PARTIAL.union(Self::CENTRAL) {
            return Err(SearchError::InvalidConfig("central partial eclipses do not exist"));
        }
        if f == Self::ANNULAR_TOTAL.union(Self::NON_CENTRAL) {
            return Err(SearchError::InvalidConfig(
                "non-central hybrid eclipses do not exist",
            ));
        }
        if !f.intersects(Self::CENTRALITY) {
            f = if f.intersects(Self::CORE_PHASES) {
                f.union(Self::CENTRALITY)
            } else {
                f.union(Self::NON_CENTRAL)
            };
        }
        if !f.intersects(Self::CORE_PHASES.union(Self::PARTIAL)) {
            // Centrality alone: any phase with that centrality.
            f = f.union(Self::CORE_PHASES.union(Self::PARTIAL));
        }
        Ok(f)
    }

    /// Normalized filter for lunar eclipse searches.
    pub(crate) fn normalized_lunar(self) -> Self {
        let f = self.intersection(Self::ALL_LUNAR);
        if f.is_empty() { Self::ALL_LUNAR } else { f }
    }

    /// Solar/occultation acceptance before the hybrid check.
    pub(crate) fn accepts_solar(self, phase: EclipsePhase, centrality: Option<Centrality>) -> bool {
        if let Some(c) = centrality {
            if !self.contains(c.filter_bit()) {
                return false;
            }
        }
        match phase {
            EclipsePhase::Total | EclipsePhase::AnnularTotal => {
                self.intersects(Self::TOTAL.union(Self::ANNULAR_TOTAL))
            }
            other => self.contains(other.filter_bit()),
        }
    }

    /// Exact acceptance once hybrid eclipses have been told apart.
    pub(crate) fn accepts_final(self, phase: EclipsePhase) -> bool {
        self.contains(phase.filter_bit())
    }
}

impl BitOr for EclipseFilter {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

/// Search direction in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SearchDirection {
    #[default]
    Forward,
    Backward,
}

impl SearchDirection {
    pub fn sign(self) -> f64 {
        match self {
            Self::Forward => 1.0,
            Self::Backward => -1.0,
        }
    }

    pub(crate) fn step(self) -> i64 {
        match self {
            Self::Forward => 1,
            Self::Backward => -1,
        }
    }

    /// Whether `jd` lies strictly beyond `start` in this direction, by more
    /// than the 1e-4 day tolerance.
    pub(crate) fn is_beyond(self, jd: f64, start: f64) -> bool {
        match self {
            Self::Forward => jd > start + START_TOLERANCE_DAYS,
            Self::Backward => jd < start - START_TOLERANCE_DAYS,
        }
    }
}

/// Events within this many days of the start are not reported again.
pub(crate) const START_TOLERANCE_DAYS: f64 = 0.0001;

/// Instants of an event, all JD UT.
///
/// Slot meanings by event kind:
///
/// | slot | solar global | solar/occultation local | lunar |
/// |------|--------------|-------------------------|-------|
/// | `partial_begin`/`end` | shadow first/last touches Earth | 1st/4th contact | umbral U1/U4 |
/// | `totality_begin`/`end` | umbra or antumbra first/last touches | 2nd/3rd contact | U2/U3 |
/// | `center_line_begin`/`end` | axis first/last touches | - | - |
/// | `penumbral_begin`/`end` | - | - | P1/P4 |
///
/// Absent phases are `None`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContactTimes {
    pub maximum: f64,
    /// Shadow axis crosses the meridian of the point of greatest eclipse.
    pub local_noon: Option<f64>,
    pub partial_begin: Option<f64>,
    pub partial_end: Option<f64>,
    pub totality_begin: Option<f64>,
    pub totality_end: Option<f64>,
    pub center_line_begin: Option<f64>,
    pub center_line_end: Option<f64>,
    pub penumbral_begin: Option<f64>,
    pub penumbral_end: Option<f64>,
    /// Body rises during the event (local searches).
    pub body_rise: Option<f64>,
    /// Body sets during the event (local searches).
    pub body_set: Option<f64>,
}

impl ContactTimes {
    pub fn at_maximum(maximum: f64) -> Self {
        Self {
            maximum,
            local_noon: None,
            partial_begin: None,
            partial_end: None,
            totality_begin: None,
            totality_end: None,
            center_line_begin: None,
            center_line_end: None,
            penumbral_begin: None,
            penumbral_end: None,
            body_rise: None,
            body_set: None,
        }
    }

    /// Contacts nest around the maximum: outer phases begin earlier and end
    /// later than inner ones.
    pub fn is_ordered(&self) -> bool {
        let begins = [
            self.penumbral_begin,
            self.partial_begin,
            self.totality_begin,
            self.center_line_begin,
        ];
        let ends = [
            self.center_line_end,
            self.totality_end,
            self.partial_end,
            self.penumbral_end,
        ];
        let chain: Vec<f64> = begins
            .into_iter()
            .flatten()
            .chain(std::iter::once(self.maximum))
            .chain(ends.into_iter().flatten())
            .collect();
        chain.windows(2).all(|w| w[0] <= w[1])
    }
}

/// Numeric attributes of an event at its maximum (or at a queried instant).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EclipseAttributes {
    /// Solar/occultation: fraction of the occulted diameter covered.
    /// Lunar: umbral magnitude.
    pub magnitude: f64,
    /// Apparent diameter of the Moon over that of the occulted body.
    pub diameter_ratio: f64,
    /// Fraction of the occulted disc's area covered.
    pub obscuration: f64,
    /// Diameter of the umbra (negative) or antumbra (positive) on the
    /// Earth's surface, km.
    pub core_diameter_km: f64,
    /// Azimuth of the occulted body (Moon for lunar eclipses), from south
    /// clockwise through west.
    pub azimuth_deg: f64,
    pub true_altitude_deg: f64,
    pub apparent_altitude_deg: f64,
    /// Solar/occultation: angular distance between the centres.
    /// Lunar: angular distance of the Moon from the anti-solar point.
    pub separation_deg: f64,
    /// Lunar only.
    pub penumbral_magnitude: f64,
    pub saros: Option<SarosId>,
}

/// A found eclipse or occultation.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EclipseEvent {
    pub kind: EclipseKind,
    pub event_type: EventType,
    pub contacts: ContactTimes,
    pub attributes: EclipseAttributes,
    /// Point of greatest eclipse (global solar and occultation searches).
    pub location: Option<GeoPosition>,
}

/// Classification and attributes at one instant and place.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EclipseCircumstances {
    pub event_type: EventType,
    pub attributes: EclipseAttributes,
}

/// Geometry of the shadow cone at the fundamental plane and at the Earth's
/// surface, km.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ShadowCore {
    /// Distance of the shadow axis from the Earth's centre.
    pub axis_distance_km: f64,
    /// Core diameter on the fundamental plane: negative for an umbra
    /// (total), positive for an antumbra (annular).
    pub umbra_diameter_km: f64,
    pub penumbra_diameter_km: f64,
    /// Cosine of the umbral cone half-angle.
    pub cos_umbra_half_angle: f64,
    /// Cosine of the penumbral cone half-angle.
    pub cos_penumbra_half_angle: f64,
    /// Core diameter at the Earth's surface.
    pub umbra_surface_km: f64,
    pub penumbra_surface_km: f64,
}

/// Where the shadow falls at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EclipseLocation {
    pub phase: EclipsePhase,
    pub centrality: Option<Centrality>,
    /// Point of greatest eclipse; with no eclipse, the point nearest the
    /// shadow axis.
    pub location: GeoPosition,
    pub core: ShadowCore,
}

/// Result of a search that may give up after one epoch.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SearchOutcome<T> {
    Found(T),
    /// Single-attempt mode: the examined epoch had no event. Restart the
    /// search from this instant to examine the next one.
    Retry { next_start_jd_ut: f64 },
}

impl<T> SearchOutcome<T> {
    pub fn found(&self) -> Option<&T> {
        match self {
            Self::Found(t) => Some(t),
            Self::Retry { .. } => None,
        }
    }

    pub fn into_found(self) -> Option<T> {
        match self {
            Self::Found(t) => Some(t),
            Self::Retry { .. } => None,
        }
    }
}

/// Configuration for eclipse and occultation searches.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EclipseSearchConfig {
    pub filter: EclipseFilter,
    /// Examine one candidate epoch and return [`SearchOutcome::Retry`] if
    /// it has no event.
    pub single_attempt: bool,
    /// Give up with `SearchExhausted` after this many rejected epochs.
    pub max_epochs: Option<u32>,
    /// Used for altitudes in local searches and how-queries.
    pub atmosphere: Atmosphere,
    pub ephemeris: EphemerisSelector,
}

impl Default for EclipseSearchConfig {
    fn default() -> Self {
        Self {
            filter: EclipseFilter::NONE,
            single_attempt: false,
            max_epochs: None,
            atmosphere: Atmosphere::default(),
            ephemeris: EphemerisSelector::default(),
        }
    }
}

impl EclipseSearchConfig {
    pub fn with_filter(filter: EclipseFilter) -> Self {
        Self {
            filter,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), SearchError> {
        if self.max_epochs == Some(0) {
            return Err(SearchError::InvalidConfig("max_epochs must be at least 1"));
        }
        Ok(())
    }
}
