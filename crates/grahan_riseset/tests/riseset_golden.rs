//! Sunrise/sunset/transit checks against published almanac times.
//!
//! Driven by the analytic test ephemeris. Its Sun is good to about 0.01°,
//! a few seconds of time at the horizon; tolerances are about a minute.

use grahan_core::{Body, GeoPosition, Target};
use grahan_riseset::{
    HorizonEvent, HorizonHeight, RiseSetConfig, RiseSetResult, Twilight, next_event, next_rise,
    next_set, next_transit,
};
use grahan_testkit::{AnalyticEphemeris, jd_ut};

fn sun() -> Target {
    Target::Body(Body::Sun)
}

fn hours_after(jd: f64, origin: f64) -> f64 {
    (jd - origin) * 24.0
}

fn event_time(result: RiseSetResult) -> f64 {
    match result {
        RiseSetResult::Event { jd_ut, .. } => jd_ut,
        RiseSetResult::NotFound => panic!("expected an event, got {result:?}"),
    }
}

#[test]
fn new_delhi_equinox_sunrise() {
    let eph = AnalyticEphemeris::new();
    let site = GeoPosition::new(77.209, 28.6139, 0.0);
    let midnight = jd_ut(2024, 3, 20, 0, 0);
    let rise = event_time(next_rise(&eph, &sun(), midnight, &site, &RiseSetConfig::default()).unwrap());
    let hours = hours_after(rise, midnight);
    // Almanac: 06:24 IST; NOAA solar calculator 00:54:52 UTC.
    assert!((hours - 0.9145).abs() < 0.02, "New Delhi sunrise = {hours:.3}h UTC");
}

#[test]
fn new_delhi_equinox_sunset() {
    let eph = AnalyticEphemeris::new();
    let site = GeoPosition::new(77.209, 28.6139, 0.0);
    let midnight = jd_ut(2024, 3, 20, 0, 0);
    let set = event_time(next_set(&eph, &sun(), midnight, &site, &RiseSetConfig::default()).unwrap());
    let hours = hours_after(set, midnight);
    // Almanac: 18:32 IST; NOAA solar calculator 13:02:36 UTC.
    assert!((hours - 13.0433).abs() < 0.02, "New Delhi sunset = {hours:.3}h UTC");
}

#[test]
fn requery_from_rise_returns_next_day() {
    let eph = AnalyticEphemeris::new();
    let site = GeoPosition::new(-0.0015, 51.4779, 46.0);
    let start = jd_ut(2024, 9, 1, 0, 0);
    let cfg = RiseSetConfig::default();
    let first = event_time(next_rise(&eph, &sun(), start, &site, &cfg).unwrap());
    let second = event_time(next_rise(&eph, &sun(), first, &site, &cfg).unwrap());
    let gap = second - first;
    assert!(gap > 0.99 && gap < 1.01, "gap between rises {gap} d");
}

#[test]
fn tromso_midnight_sun_never_sets() {
    let eph = AnalyticEphemeris::new();
    let site = GeoPosition::new(18.96, 69.65, 0.0);
    let start = jd_ut(2024, 6, 21, 0, 0);
    let result = next_set(&eph, &sun(), start, &site, &RiseSetConfig::default()).unwrap();
    assert_eq!(result, RiseSetResult::NotFound);
}

#[test]
fn tromso_polar_night_never_rises() {
    let eph = AnalyticEphemeris::new();
    let site = GeoPosition::new(18.96, 69.65, 0.0);
    let start = jd_ut(2024, 12, 21, 0, 0);
    let result = next_rise(&eph, &sun(), start, &site, &RiseSetConfig::default()).unwrap();
    assert_eq!(result, RiseSetResult::NotFound);
}

#[test]
fn twilight_ordering_before_sunrise() {
    let eph = AnalyticEphemeris::new();
    let site = GeoPosition::new(77.209, 28.6139, 0.0);
    let start = jd_ut(2024, 3, 19, 18, 0);
    let rise = event_time(next_rise(&eph, &sun(), start, &site, &RiseSetConfig::default()).unwrap());
    let mut previous = rise;
    for tw in [Twilight::Civil, Twilight::Nautical, Twilight::Astronomical] {
        let dawn = event_time(next_rise(&eph, &sun(), start, &site, &RiseSetConfig::twilight(tw)).unwrap());
        let minutes = (previous - dawn) * 1440.0;
        assert!(minutes > 20.0 && minutes < 30.0, "{tw:?} dawn {minutes} min before previous");
        previous = dawn;
    }
}

#[test]
fn greenwich_equinox_transit() {
    let eph = AnalyticEphemeris::new();
    let site = GeoPosition::new(0.0, 51.4779, 0.0);
    let midnight = jd_ut(2024, 3, 20, 0, 0);
    let transit = next_transit(&eph, &sun(), midnight, &site, &RiseSetConfig::default()).unwrap();
    let hours = hours_after(transit, midnight);
    // Equation of time is about −7.5 min
    assert!((hours - 12.125).abs() < 0.02, "transit = {hours:.4}h UTC");
}

#[test]
fn lower_transit_is_half_a_day_from_upper() {
    let eph = AnalyticEphemeris::new();
    let site = GeoPosition::new(0.0, 51.4779, 0.0);
    let midnight = jd_ut(2024, 3, 20, 0, 0);
    let cfg = RiseSetConfig::default();
    let upper = next_transit(&eph, &sun(), midnight, &site, &cfg).unwrap();
    let lower =
        event_time(next_event(&eph, &sun(), upper, &site, HorizonEvent::LowerTransit, &cfg).unwrap());
    assert!(((lower - upper) - 0.5).abs() < 0.002, "upper {upper} lower {lower}");
}

#[test]
fn sea_horizon_dip_brings_sunrise_forward() {
    let eph = AnalyticEphemeris::new();
    let site = GeoPosition::new(-16.64, 28.27, 2000.0);
    let start = jd_ut(2024, 7, 1, 0, 0);
    let flat = event_time(next_rise(&eph, &sun(), start, &site, &RiseSetConfig::default()).unwrap());
    let dip_cfg = RiseSetConfig {
        horizon: HorizonHeight::Dip,
        ..RiseSetConfig::default()
    };
    let dip = event_time(next_rise(&eph, &sun(), start, &site, &dip_cfg).unwrap());
    let minutes = (flat - dip) * 1440.0;
    assert!(minutes > 3.0 && minutes < 12.0, "dip advances sunrise by {minutes} min");
}

#[test]
fn moon_rises_and_sets() {
    let eph = AnalyticEphemeris::new();
    let site = GeoPosition::new(2.35, 48.85, 35.0);
    let moon = Target::Body(Body::Moon);
    let start = jd_ut(2024, 5, 1, 0, 0);
    let cfg = RiseSetConfig::default();
    let rise = event_time(next_rise(&eph, &moon, start, &site, &cfg).unwrap());
    let set = event_time(next_set(&eph, &moon, start, &site, &cfg).unwrap());
    assert!(rise > start && rise - start < 1.1);
    assert!(set > start && set - start < 1.1);
}
