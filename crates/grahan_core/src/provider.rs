//! The position-provider contract.
//!
//! A provider answers one question: where is `target` at `jd_et`, in a
//! given frame, seen from a given observer. Positions are apparent (light
//! time, aberration, precession and nutation already applied) and
//! expressed in polar form: longitude/right ascension and latitude/
//! declination in degrees, distance in km.

use crate::body::Target;
use crate::error::ProviderError;
use crate::observer::GeoPosition;
use crate::time;

pub use grahan_frames::SphericalCoords as Position;

/// Reference plane of a requested position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CoordinateFrame {
    /// Right ascension / declination of date.
    Equatorial,
    /// Ecliptic longitude / latitude of date.
    Ecliptic,
}

/// Where the position is seen from.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Observer {
    Geocentric,
    Topocentric(GeoPosition),
}

/// Opaque ephemeris-system choice, forwarded to the provider untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EphemerisSelector(pub u32);

/// A single position query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionRequest<'a> {
    pub target: &'a Target,
    pub jd_et: f64,
    pub frame: CoordinateFrame,
    pub observer: Observer,
    pub ephemeris: EphemerisSelector,
}

/// Kind of event, used for Saros lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EclipseKind {
    Solar,
    Lunar,
    Occultation,
}

/// Saros series number and member index within the series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SarosId {
    pub series: u16,
    pub member: u16,
}

/// Source of apparent positions and Earth-orientation quantities.
pub trait PositionProvider {
    /// Apparent position of the requested target.
    fn position(&self, request: &PositionRequest<'_>) -> Result<Position, ProviderError>;

    /// ΔT = ET − UT in seconds at a UT instant.
    fn delta_t_seconds(&self, jd_ut: f64) -> f64;

    /// Greenwich sidereal time in degrees. Defaults to mean sidereal time.
    fn sidereal_time_deg(&self, jd_ut: f64) -> f64 {
        time::gmst_deg(jd_ut)
    }

    /// Obliquity of the ecliptic in degrees. Defaults to the mean obliquity.
    fn obliquity_deg(&self, jd_et: f64) -> f64 {
        time::mean_obliquity_deg(jd_et)
    }

    /// Saros classification of an eclipse maximum, if the provider knows it.
    fn saros(&self, _kind: EclipseKind, _jd_ut: f64) -> Option<SarosId> {
        None
    }
}

impl<P: PositionProvider + ?Sized> PositionProvider for &P {
    fn position(&self, request: &PositionRequest<'_>) -> Result<Position, ProviderError> {
        (**self).position(request)
    }

    fn delta_t_seconds(&self, jd_ut: f64) -> f64 {
        (**self).delta_t_seconds(jd_ut)
    }

    fn sidereal_time_deg(&self, jd_ut: f64) -> f64 {
        (**self).sidereal_time_deg(jd_ut)
    }

    fn obliquity_deg(&self, jd_et: f64) -> f64 {
        (**self).obliquity_deg(jd_et)
    }

    fn saros(&self, kind: EclipseKind, jd_ut: f64) -> Option<SarosId> {
        (**self).saros(kind, jd_ut)
    }
}

/// A provider bound to an ephemeris selector, with time-scale helpers.
#[derive(Debug)]
pub struct ProviderContext<'a, P: ?Sized> {
    provider: &'a P,
    ephemeris: EphemerisSelector,
}

impl<P: ?Sized> Clone for ProviderContext<'_, P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P: ?Sized> Copy for ProviderContext<'_, P> {}

impl<'a, P: PositionProvider + ?Sized> ProviderContext<'a, P> {
    pub fn new(provider: &'a P, ephemeris: EphemerisSelector) -> Self {
        Self {
            provider,
            ephemeris,
        }
    }

    pub fn provider(&self) -> &'a P {
        self.provider
    }

    pub fn position(
        &self,
        target: &Target,
        jd_et: f64,
        frame: CoordinateFrame,
        observer: Observer,
    ) -> Result<Position, ProviderError> {
        self.provider.position(&PositionRequest {
            target,
            jd_et,
            frame,
            observer,
            ephemeris: self.ephemeris,
        })
    }

    /// Geocentric equatorial Cartesian position in km.
    pub fn geocentric_xyz(&self, target: &Target, jd_et: f64) -> Result<[f64; 3], ProviderError> {
        Ok(self
            .position(target, jd_et, CoordinateFrame::Equatorial, Observer::Geocentric)?
            .to_cartesian())
    }

    /// Topocentric equatorial Cartesian position in km.
    pub fn topocentric_xyz(
        &self,
        target: &Target,
        jd_et: f64,
        site: &GeoPosition,
    ) -> Result<[f64; 3], ProviderError> {
        Ok(self
            .position(target, jd_et, CoordinateFrame::Equatorial, Observer::Topocentric(*site))?
            .to_cartesian())
    }

    pub fn delta_t_days(&self, jd_ut: f64) -> f64 {
        self.provider.delta_t_seconds(jd_ut) / time::SECONDS_PER_DAY
    }

    pub fn ut_to_et(&self, jd_ut: f64) -> f64 {
        time::ut_to_et(jd_ut, |t| self.provider.delta_t_seconds(t))
    }

    pub fn et_to_ut(&self, jd_et: f64) -> f64 {
        time::et_to_ut(jd_et, |t| self.provider.delta_t_seconds(t))
    }

    pub fn sidereal_time_deg(&self, jd_ut: f64) -> f64 {
        self.provider.sidereal_time_deg(jd_ut)
    }

    pub fn obliquity_deg(&self, jd_et: f64) -> f64 {
        self.provider.obliquity_deg(jd_et)
    }
}
