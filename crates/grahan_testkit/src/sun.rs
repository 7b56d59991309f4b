//! Sun: Meeus, *Astronomical Algorithms*, ch. 25 (low accuracy).

use grahan_core::{AU_KM, J2000_JD, Position};
use grahan_frames::normalize_deg_360;

use crate::nutation_deg;

/// Apparent geocentric ecliptic position of the Sun, of date.
pub fn sun_ecliptic(jd_et: f64) -> Position {
    let t = (jd_et - J2000_JD) / 36_525.0;
    let l0 = 280.46646 + 36_000.76983 * t + 0.0003032 * t * t;
    let m = 357.52911 + 35_999.05029 * t - 0.0001537 * t * t;
    let e = 0.016708634 - 0.000042037 * t - 0.0000001267 * t * t;
    let mr = m.to_radians();
    let c = (1.914602 - 0.004817 * t - 0.000014 * t * t) * mr.sin()
        + (0.019993 - 0.000101 * t) * (2.0 * mr).sin()
        + 0.000289 * (3.0 * mr).sin();
    let true_lon = l0 + c;
    let nu = (m + c).to_radians();
    let r_au = 1.000001018 * (1.0 - e * e) / (1.0 + e * nu.cos());

    let (dpsi, _) = nutation_deg(jd_et);
    let aberration = -20.4898 / 3600.0 / r_au;
    Position::new(normalize_deg_360(true_lon + dpsi + aberration), 0.0, r_au * AU_KM)
}
