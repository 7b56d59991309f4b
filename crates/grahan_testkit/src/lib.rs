//! Low-precision analytic ephemeris for tests and benchmarks.
//!
//! Implements [`PositionProvider`](grahan_core::PositionProvider) from
//! closed-form series: the Sun from Meeus ch. 25, the Moon from the
//! principal terms of Meeus ch. 47, nutation from the four leading terms
//! of IAU 1980 and ΔT from the Espenak–Meeus polynomials. Accuracy is
//! about 0.01° for the Sun and ten arcseconds for the Moon, enough to
//! reproduce eclipse contact times to within a minute or two.

mod delta_t;
mod ephemeris;
mod moon;
mod recording;
mod sun;

pub use delta_t::delta_t_seconds;
pub use ephemeris::{AnalyticEphemeris, STAR_DISTANCE_KM, StarEntry};
pub use moon::moon_ecliptic;
pub use recording::RecordingProvider;
pub use sun::sun_ecliptic;

use grahan_core::calendar_to_jd;

/// Julian Date (UT) of a civil date and time.
pub fn jd_ut(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> f64 {
    calendar_to_jd(
        year,
        month,
        day as f64 + (hour as f64 + minute as f64 / 60.0) / 24.0,
    )
}

/// Mean nutation in longitude and obliquity, degrees.
pub fn nutation_deg(jd_et: f64) -> (f64, f64) {
    let t = (jd_et - grahan_core::J2000_JD) / 36_525.0;
    let om = (125.04452 - 1934.136261 * t).to_radians();
    let l = (280.4665 + 36_000.7698 * t).to_radians();
    let lp = (218.3165 + 481_267.8813 * t).to_radians();
    let dpsi = -17.20 * om.sin() - 1.32 * (2.0 * l).sin() - 0.23 * (2.0 * lp).sin()
        + 0.21 * (2.0 * om).sin();
    let deps = 9.20 * om.cos() + 0.57 * (2.0 * l).cos() + 0.10 * (2.0 * lp).cos()
        - 0.09 * (2.0 * om).cos();
    (dpsi / 3600.0, deps / 3600.0)
}
