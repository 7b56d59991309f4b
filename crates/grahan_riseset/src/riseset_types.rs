//! Types for rise/set/transit calculations.

use grahan_core::{Atmosphere, Body, EphemerisSelector, Target};

use crate::error::RiseSetError;

/// Horizon event to search for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HorizonEvent {
    Rise,
    Set,
    /// Crossing of the upper meridian (culmination).
    UpperTransit,
    /// Crossing of the lower meridian.
    LowerTransit,
}

impl HorizonEvent {
    pub fn is_transit(self) -> bool {
        matches!(self, Self::UpperTransit | Self::LowerTransit)
    }
}

/// Which point of the disc must reach the horizon.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Limb {
    /// Upper limb (conventional sunrise/sunset).
    #[default]
    Upper,
    Center,
    /// Lower limb: the whole disc is above the horizon at rise.
    Lower,
}

/// Twilight depressions of the Sun's centre, without refraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Twilight {
    Civil,
    Nautical,
    Astronomical,
}

impl Twilight {
    /// Depression below the horizon in degrees.
    pub fn depression_deg(self) -> f64 {
        match self {
            Self::Civil => 6.0,
            Self::Nautical => 12.0,
            Self::Astronomical => 18.0,
        }
    }
}

/// Height of the local horizon.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HorizonHeight {
    /// Fixed altitude in degrees (mountains, buildings).
    Degrees(f64),
    /// Dip of the sea horizon for the observer's height.
    Dip,
}

impl Default for HorizonHeight {
    fn default() -> Self {
        Self::Degrees(0.0)
    }
}

/// Configurable parameters for rise/set computation.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RiseSetConfig {
    pub limb: Limb,
    /// Apply atmospheric refraction (extended model). Default: true.
    pub refraction: bool,
    /// Use the conventional mean distance for the disc size (Sun at 1 AU,
    /// Moon at 0.00257 AU) instead of the actual distance.
    pub fixed_disc_size: bool,
    /// Twilight instead of rise/set. Sun only; implies centre and no refraction.
    pub twilight: Option<Twilight>,
    pub horizon: HorizonHeight,
    pub atmosphere: Atmosphere,
    pub ephemeris: EphemerisSelector,
}

impl Default for RiseSetConfig {
    fn default() -> Self {
        Self {
            limb: Limb::Upper,
            refraction: true,
            fixed_disc_size: false,
            twilight: None,
            horizon: HorizonHeight::default(),
            atmosphere: Atmosphere::default(),
            ephemeris: EphemerisSelector::default(),
        }
    }
}

impl RiseSetConfig {
    /// Whole disc above the horizon: the convention used when trimming
    /// eclipse circumstances to the visible part.
    pub fn disc_bottom() -> Self {
        Self {
            limb: Limb::Lower,
            ..Self::default()
        }
    }

    pub fn twilight(twilight: Twilight) -> Self {
        Self {
            twilight: Some(twilight),
            ..Self::default()
        }
    }

    /// Effective limb after twilight overrides.
    pub fn effective_limb(&self) -> Limb {
        if self.twilight.is_some() {
            Limb::Center
        } else {
            self.limb
        }
    }

    pub fn effective_refraction(&self) -> bool {
        self.refraction && self.twilight.is_none()
    }

    pub fn validate(&self, target: &Target) -> Result<(), RiseSetError> {
        if self.twilight.is_some() && !target.is_body(Body::Sun) {
            return Err(RiseSetError::InvalidConfig("twilight applies to the Sun only"));
        }
        if let HorizonHeight::Degrees(h) = self.horizon {
            if !(-90.0..=90.0).contains(&h) {
                return Err(RiseSetError::InvalidConfig("horizon height outside [-90, 90] deg"));
            }
        }
        Ok(())
    }
}

/// Result of a horizon-event search.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RiseSetResult {
    /// Event occurs at the given Julian Date (UT).
    Event { jd_ut: f64, event: HorizonEvent },
    /// No horizon crossing in the search window (circumpolar or never rising).
    NotFound,
}

impl RiseSetResult {
    pub fn jd_ut(&self) -> Option<f64> {
        match self {
            Self::Event { jd_ut, .. } => Some(*jd_ut),
            Self::NotFound => None,
        }
    }
}
