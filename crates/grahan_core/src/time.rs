//! Julian dates, sidereal time, mean obliquity and UT ↔ ET conversion.
//!
//! Instants are Julian Day numbers (`f64`). Universal Time and ephemeris
//! time are told apart by naming (`jd_ut`, `jd_et`); `ET = UT + ΔT(UT)`.
//!
//! Sources:
//! - ERA: IERS Conventions 2010, Eq. 5.15.
//! - GMST polynomial: Capitaine et al. 2003, Table 2.
//! - Mean obliquity: IAU 1980 (Lieske et al. 1977).
//! - Calendar conversion: Meeus, *Astronomical Algorithms*, ch. 7.

/// Julian Date of J2000.0 (2000-01-01T12:00:00 TT).
pub const J2000_JD: f64 = 2_451_545.0;

/// Seconds in one day.
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Days in one Julian century.
pub const DAYS_PER_CENTURY: f64 = 36_525.0;

/// Number of ΔT evaluations when recovering UT from ET.
const ET_TO_UT_ITERATIONS: usize = 3;

/// Gregorian calendar date to Julian Date. `day` may carry a fraction.
pub fn calendar_to_jd(year: i32, month: u32, day: f64) -> f64 {
    let (y, m) = if month <= 2 {
        (year as f64 - 1.0, month as f64 + 12.0)
    } else {
        (year as f64, month as f64)
    };
    let a = (y / 100.0).floor();
    let b = 2.0 - a + (a / 4.0).floor();
    (365.25 * (y + 4716.0)).floor() + (30.6001 * (m + 1.0)).floor() + day + b - 1524.5
}

/// Julian Date to Gregorian `(year, month, day_with_fraction)`.
pub fn jd_to_calendar(jd: f64) -> (i32, u32, f64) {
    let z = (jd + 0.5).floor();
    let f = jd + 0.5 - z;
    let alpha = ((z - 1_867_216.25) / 36_524.25).floor();
    let a = z + 1.0 + alpha - (alpha / 4.0).floor();
    let b = a + 1524.0;
    let c = ((b - 122.1) / 365.25).floor();
    let d = (365.25 * c).floor();
    let e = ((b - d) / 30.6001).floor();

    let day = b - d - (30.6001 * e).floor() + f;
    let month = if e < 14.0 { e - 1.0 } else { e - 13.0 };
    let year = if month > 2.0 { c - 4716.0 } else { c - 4715.0 };
    (year as i32, month as u32, day)
}

/// Greenwich mean sidereal time in degrees, range [0, 360).
pub fn gmst_deg(jd_ut: f64) -> f64 {
    let du = jd_ut - J2000_JD;
    let era_turns = 0.779_057_273_264_0 + 1.002_737_811_911_354_6 * du;
    let t = du / DAYS_PER_CENTURY;
    let poly_arcsec = 0.014506 + 4612.156534 * t + 1.3915817 * t * t
        - 0.00000044 * t.powi(3)
        - 0.000029956 * t.powi(4)
        - 0.0000000368 * t.powi(5);
    (era_turns.fract() * 360.0 + poly_arcsec / 3600.0).rem_euclid(360.0)
}

/// Mean obliquity of the ecliptic in degrees.
pub fn mean_obliquity_deg(jd_et: f64) -> f64 {
    let t = (jd_et - J2000_JD) / DAYS_PER_CENTURY;
    let arcsec = 84_381.448 - 46.8150 * t - 0.00059 * t * t + 0.001813 * t * t * t;
    arcsec / 3600.0
}

/// UT to ephemeris time using a ΔT function (seconds).
pub fn ut_to_et(jd_ut: f64, delta_t_seconds: impl Fn(f64) -> f64) -> f64 {
    jd_ut + delta_t_seconds(jd_ut) / SECONDS_PER_DAY
}

/// Ephemeris time to UT.
///
/// ΔT is a function of UT, so it is re-evaluated at the current UT estimate
/// exactly three times.
pub fn et_to_ut(jd_et: f64, delta_t_seconds: impl Fn(f64) -> f64) -> f64 {
    let mut jd_ut = jd_et;
    for _ in 0..ET_TO_UT_ITERATIONS {
        jd_ut = jd_et - delta_t_seconds(jd_ut) / SECONDS_PER_DAY;
    }
    jd_ut
}
