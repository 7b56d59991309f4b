//! Local horizon transform.
//!
//! Azimuth is measured from the south point, increasing clockwise through
//! west (south = 0°, west = 90°, north = 180°, east = 270°). Altitudes are
//! geometric; refraction is applied separately.

use crate::rotation::rotate_polar;
use crate::spherical::normalize_deg_360;

/// Equatorial (α, δ) to horizontal (azimuth, altitude), all in degrees.
///
/// `local_sidereal_deg` is the local apparent sidereal time (Greenwich
/// sidereal time plus east longitude).
pub fn equatorial_to_horizontal(
    ra_deg: f64,
    dec_deg: f64,
    local_sidereal_deg: f64,
    latitude_deg: f64,
) -> (f64, f64) {
    let meridian_distance = normalize_deg_360(ra_deg - local_sidereal_deg);
    let (lon, alt) = rotate_polar(
        normalize_deg_360(meridian_distance - 90.0),
        dec_deg,
        90.0 - latitude_deg,
    );
    let az = normalize_deg_360(360.0 - normalize_deg_360(lon + 90.0));
    (az, alt)
}

/// Horizontal (azimuth, altitude) to equatorial (α, δ), all in degrees.
pub fn horizontal_to_equatorial(
    az_deg: f64,
    alt_deg: f64,
    local_sidereal_deg: f64,
    latitude_deg: f64,
) -> (f64, f64) {
    let lon = normalize_deg_360(360.0 - az_deg - 90.0);
    let (x, dec) = rotate_polar(lon, alt_deg, latitude_deg - 90.0);
    (normalize_deg_360(x + local_sidereal_deg + 90.0), dec)
}
