//! Rise, set and meridian-transit search for the Sun, Moon, planets and stars.
//!
//! The solver samples the altitude of the chosen limb relative to the local
//! horizon over roughly thirty hours, inserts any culminations it finds,
//! and bisects the first sign change after the start instant. Transits are
//! found by correcting the hour angle at the sidereal rate.

pub mod error;
pub mod riseset;
pub mod riseset_types;

pub use error::RiseSetError;
pub use riseset::{next_event, next_rise, next_set, next_transit};
pub use riseset_types::{
    HorizonEvent, HorizonHeight, Limb, RiseSetConfig, RiseSetResult, Twilight,
};
