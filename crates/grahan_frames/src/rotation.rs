//! Rotations about the x-axis (the equinox direction).
//!
//! Ecliptic and equatorial frames share the x-axis, so a single rotation by
//! the obliquity converts between them. The horizon transform uses the same
//! rotation with the colatitude of the observer.

use crate::spherical::{SphericalCoords, cartesian_to_spherical, spherical_to_cartesian};

/// Rotate a Cartesian vector about the x-axis by `angle_deg`.
///
/// `y' = y·cos a + z·sin a`, `z' = −y·sin a + z·cos a`.
pub fn rotate_x(v: &[f64; 3], angle_deg: f64) -> [f64; 3] {
    let (s, c) = angle_deg.to_radians().sin_cos();
    [v[0], v[1] * c + v[2] * s, -v[1] * s + v[2] * c]
}

/// Rotate polar coordinates (degrees) about the x-axis by `angle_deg`.
///
/// Returns `(lon_deg, lat_deg)` with longitude in [0, 360).
pub fn rotate_polar(lon_deg: f64, lat_deg: f64, angle_deg: f64) -> (f64, f64) {
    let v = spherical_to_cartesian(&SphericalCoords::new(lon_deg, lat_deg, 1.0));
    let s = cartesian_to_spherical(&rotate_x(&v, angle_deg));
    (s.lon_deg, s.lat_deg)
}

/// Ecliptic (λ, β) to equatorial (α, δ), all in degrees.
pub fn ecliptic_to_equatorial(lon_deg: f64, lat_deg: f64, obliquity_deg: f64) -> (f64, f64) {
    rotate_polar(lon_deg, lat_deg, -obliquity_deg)
}

/// Equatorial (α, δ) to ecliptic (λ, β), all in degrees.
pub fn equatorial_to_ecliptic(ra_deg: f64, dec_deg: f64, obliquity_deg: f64) -> (f64, f64) {
    rotate_polar(ra_deg, dec_deg, obliquity_deg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const EPS: f64 = 23.4392911;

    #[test]
    fn summer_solstice_point_has_declination_equal_obliquity() {
        let (ra, dec) = ecliptic_to_equatorial(90.0, 0.0, EPS);
        assert_abs_diff_eq!(ra, 90.0, epsilon = 1e-10);
        assert_abs_diff_eq!(dec, EPS, epsilon = 1e-10);
    }

    #[test]
    fn equinox_is_fixed() {
        let (ra, dec) = ecliptic_to_equatorial(0.0, 0.0, EPS);
        assert_abs_diff_eq!(ra, 0.0, epsilon = 1e-10);
        assert_abs_diff_eq!(dec, 0.0, epsilon = 1e-10);
    }

    #[test]
    fn ecliptic_pole_maps_to_ra_270() {
        let (ra, dec) = ecliptic_to_equatorial(0.0, 90.0, EPS);
        assert_abs_diff_eq!(ra, 270.0, epsilon = 1e-8);
        assert_abs_diff_eq!(dec, 90.0 - EPS, epsilon = 1e-10);
    }

    #[test]
    fn equatorial_ecliptic_inverse() {
        let (ra, dec) = ecliptic_to_equatorial(211.3, -4.9, EPS);
        let (lon, lat) = equatorial_to_ecliptic(ra, dec, EPS);
        assert_abs_diff_eq!(lon, 211.3, epsilon = 1e-10);
        assert_abs_diff_eq!(lat, -4.9, epsilon = 1e-10);
    }
}
