//! Coordinate plumbing for the eclipse and horizon-event engines.
//!
//! Everything here is a pure function of its arguments: spherical and
//! Cartesian conversions, polar-axis rotations between the ecliptic and the
//! equator, the local horizon transform and the two refraction models.

pub mod horizon;
pub mod refraction;
pub mod rotation;
pub mod spherical;

pub use horizon::{equatorial_to_horizontal, horizontal_to_equatorial};
pub use refraction::{
    Atmosphere, DEFAULT_LAPSE_RATE, RefractionDetail, RefractionDirection, estimate_pressure_hpa,
    horizon_dip_deg, refraction_extended, refraction_simple,
};
pub use rotation::{ecliptic_to_equatorial, equatorial_to_ecliptic, rotate_polar};
pub use spherical::{
    SphericalCoords, angle_between_rad, cartesian_to_spherical, cross, dot, norm, normalize_deg_360,
    normalize_deg_pm180, spherical_to_cartesian, sub,
};
