//! Eclipse and occultation search engine.
//!
//! This crate provides:
//! - Solar eclipse geometry at an instant (where the shadow falls, how it
//!   looks from a site) and global/local searches
//! - Lunar eclipse circumstances and global/local searches (penumbral,
//!   partial, total)
//! - Occultations of planets, minor planets and stars by the Moon
//! - Range searches collecting every eclipse between two dates
//!
//! Every search walks candidate epochs (new or full moons, or Moon/target
//! conjunctions) through one stepwise state machine and reports
//! [`SearchOutcome::Found`], or [`SearchOutcome::Retry`] in single-attempt
//! mode.

pub mod eclipse_types;
pub mod error;
pub(crate) mod global;
pub(crate) mod local;
pub mod lunar;
pub mod lunation;
pub(crate) mod machine;
pub mod occultation;
pub(crate) mod refine;
pub mod shadow;
pub mod solar;

pub use eclipse_types::{
    Centrality, ContactTimes, ContactVisibility, EclipseAttributes, EclipseCircumstances,
    EclipseEvent, EclipseFilter, EclipseLocation, EclipsePhase, EclipseSearchConfig, EventType,
    SearchDirection, SearchOutcome, ShadowCore,
};
pub use error::SearchError;
pub use lunar::{
    lunar_eclipse_how, next_lunar_eclipse, next_lunar_eclipse_local, prev_lunar_eclipse,
    prev_lunar_eclipse_local, search_lunar_eclipses,
};
pub use lunation::{Lunation, SYNODIC_MONTH_DAYS, Syzygy};
pub use occultation::{
    MAX_OCCULTABLE_LATITUDE_DEG, next_occultation_global, next_occultation_local,
    occultation_how, occultation_where, prev_occultation_global, prev_occultation_local,
};
pub use shadow::{EARTH_RADIUS_KM, MOON_RADIUS_KM, disc_obscuration};
pub use solar::{
    next_solar_eclipse_global, next_solar_eclipse_local, prev_solar_eclipse_global,
    prev_solar_eclipse_local, search_solar_eclipses, solar_eclipse_how, solar_eclipse_where,
};
