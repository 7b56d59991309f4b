//! Cartesian ↔ spherical conversion and small vector helpers.

use std::f64::consts::PI;

/// Spherical coordinates: longitude, latitude, distance.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SphericalCoords {
    /// Longitude (or right ascension) in degrees, range [0, 360).
    pub lon_deg: f64,
    /// Latitude (or declination) in degrees, range [-90, 90].
    pub lat_deg: f64,
    /// Distance from origin in km.
    pub distance_km: f64,
}

impl SphericalCoords {
    pub fn new(lon_deg: f64, lat_deg: f64, distance_km: f64) -> Self {
        Self {
            lon_deg,
            lat_deg,
            distance_km,
        }
    }

    /// Cartesian position in km.
    pub fn to_cartesian(&self) -> [f64; 3] {
        spherical_to_cartesian(self)
    }
}

/// Convert Cartesian `[x, y, z]` (km) to spherical coordinates.
///
/// Longitude is measured in the x-y plane from +x toward +y.
/// Latitude is elevation above the x-y plane.
pub fn cartesian_to_spherical(xyz: &[f64; 3]) -> SphericalCoords {
    let [x, y, z] = *xyz;
    let r = norm(xyz);

    if r == 0.0 {
        return SphericalCoords::new(0.0, 0.0, 0.0);
    }

    let lon = y.atan2(x);
    let lat = (z / r).clamp(-1.0, 1.0).asin();

    SphericalCoords {
        lon_deg: if lon < 0.0 { lon + 2.0 * PI } else { lon }.to_degrees(),
        lat_deg: lat.to_degrees(),
        distance_km: r,
    }
}

/// Convert spherical coordinates to Cartesian `[x, y, z]` in km.
pub fn spherical_to_cartesian(s: &SphericalCoords) -> [f64; 3] {
    let (sin_lon, cos_lon) = s.lon_deg.to_radians().sin_cos();
    let (sin_lat, cos_lat) = s.lat_deg.to_radians().sin_cos();
    [
        s.distance_km * cos_lat * cos_lon,
        s.distance_km * cos_lat * sin_lon,
        s.distance_km * sin_lat,
    ]
}

pub fn dot(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

pub fn norm(a: &[f64; 3]) -> f64 {
    dot(a, a).sqrt()
}

/// `a - b`.
pub fn sub(a: &[f64; 3], b: &[f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

pub fn cross(a: &[f64; 3], b: &[f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

/// Angle between two direction vectors in radians, range [0, π].
///
/// Uses `atan2(|a×b|, a·b)`, which stays accurate for nearly parallel
/// vectors. Returns 0 when either vector has zero length.
pub fn angle_between_rad(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    if norm(a) == 0.0 || norm(b) == 0.0 {
        return 0.0;
    }
    norm(&cross(a, b)).atan2(dot(a, b))
}

/// Normalize an angle in degrees to [0, 360).
pub fn normalize_deg_360(deg: f64) -> f64 {
    let r = deg.rem_euclid(360.0);
    if r >= 360.0 { 0.0 } else { r }
}

/// Normalize an angle in degrees to [-180, 180).
pub fn normalize_deg_pm180(deg: f64) -> f64 {
    let r = normalize_deg_360(deg);
    if r >= 180.0 { r - 360.0 } else { r }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn unit_x_is_origin_of_longitude() {
        let s = cartesian_to_spherical(&[1.0, 0.0, 0.0]);
        assert_abs_diff_eq!(s.lon_deg, 0.0);
        assert_abs_diff_eq!(s.lat_deg, 0.0);
        assert_abs_diff_eq!(s.distance_km, 1.0);
    }

    #[test]
    fn negative_y_wraps_to_upper_half() {
        let s = cartesian_to_spherical(&[0.0, -1.0, 0.0]);
        assert_abs_diff_eq!(s.lon_deg, 270.0, epsilon = 1e-12);
    }

    #[test]
    fn zero_vector_is_all_zero() {
        let s = cartesian_to_spherical(&[0.0, 0.0, 0.0]);
        assert_eq!(s, SphericalCoords::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn spherical_cartesian_inverse() {
        let s = SphericalCoords::new(123.4, -56.7, 384_400.0);
        let back = cartesian_to_spherical(&s.to_cartesian());
        assert_abs_diff_eq!(back.lon_deg, s.lon_deg, epsilon = 1e-10);
        assert_abs_diff_eq!(back.lat_deg, s.lat_deg, epsilon = 1e-10);
        assert_abs_diff_eq!(back.distance_km, s.distance_km, epsilon = 1e-6);
    }

    #[test]
    fn angle_between_orthogonal_and_parallel() {
        assert_abs_diff_eq!(
            angle_between_rad(&[1.0, 0.0, 0.0], &[0.0, 5.0, 0.0]),
            PI / 2.0,
            epsilon = 1e-15
        );
        assert_abs_diff_eq!(angle_between_rad(&[2.0, 2.0, 0.0], &[1.0, 1.0, 0.0]), 0.0);
        assert_eq!(angle_between_rad(&[0.0; 3], &[1.0, 0.0, 0.0]), 0.0);
        assert_abs_diff_eq!(
            angle_between_rad(&[1.0, 0.0, 0.0], &[-3.0, 0.0, 0.0]),
            PI,
            epsilon = 1e-15
        );
    }

    #[test]
    fn angle_between_nearly_parallel() {
        // One milliarcsecond apart; acos of the dot product cannot resolve this.
        let eps = (1e-3_f64 / 3600.0).to_radians();
        let a = [384_400.0, 0.0, 0.0];
        let b = [1.0, eps.tan(), 0.0];
        let angle = angle_between_rad(&a, &b);
        assert_abs_diff_eq!(angle, eps, epsilon = eps * 1e-6);
    }

    #[test]
    fn normalization_ranges() {
        assert_abs_diff_eq!(normalize_deg_360(-10.0), 350.0);
        assert_abs_diff_eq!(normalize_deg_360(720.5), 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(normalize_deg_pm180(190.0), -170.0);
        assert_abs_diff_eq!(normalize_deg_pm180(-190.0), 170.0);
        assert_abs_diff_eq!(normalize_deg_pm180(180.0), -180.0);
    }
}
