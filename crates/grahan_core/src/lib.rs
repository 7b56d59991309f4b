//! Shared vocabulary for the eclipse, occultation and horizon-event engines.
//!
//! The engines never compute planetary theory themselves. Everything they
//! know about the sky comes through [`PositionProvider`], one request at a
//! time, with the observer context carried explicitly on each
//! [`PositionRequest`].

pub mod body;
pub mod error;
pub mod extremum;
pub mod observer;
pub mod provider;
pub mod time;

pub use body::{AU_KM, Body, Target};
pub use error::{DegenerateBracket, ProviderError};
pub use extremum::{Vertex, find_extremum, find_roots};
pub use observer::{
    GEO_HEIGHT_MAX_M, GEO_HEIGHT_MIN_M, GeoPosition, HorizontalPosition, horizontal_position,
};
pub use provider::{
    CoordinateFrame, EclipseKind, EphemerisSelector, Observer, Position, PositionProvider,
    PositionRequest, ProviderContext, SarosId,
};
pub use time::{
    J2000_JD, SECONDS_PER_DAY, calendar_to_jd, et_to_ut, gmst_deg, jd_to_calendar,
    mean_obliquity_deg, ut_to_et,
};

pub use grahan_frames::Atmosphere;
