//! Eclipse and occultation searches against NASA Five Millennium Catalog
//! circumstances.
//!
//! Driven by the analytic test ephemeris. Its Sun (Meeus ch. 25) is good to
//! about 0.01° and its Moon to about ten arcseconds, which moves local
//! contact times by up to a minute; tolerances are set accordingly.

use grahan_core::{Body, GeoPosition, Target};
use grahan_search::{
    Centrality, EclipseFilter, EclipsePhase, EclipseSearchConfig, Lunation, SearchError,
    SearchOutcome, Syzygy, lunar_eclipse_how, next_lunar_eclipse, next_lunar_eclipse_local,
    next_occultation_global, next_occultation_local, next_solar_eclipse_global,
    next_solar_eclipse_local, occultation_how, occultation_where, prev_lunar_eclipse,
    prev_occultation_global, prev_occultation_local, prev_solar_eclipse_global,
    search_lunar_eclipses, search_solar_eclipses, solar_eclipse_how, solar_eclipse_where,
};
use grahan_testkit::{AnalyticEphemeris, RecordingProvider, StarEntry, jd_ut, moon_ecliptic};

fn hours_off(jd: f64, expected: f64) -> f64 {
    (jd - expected).abs() * 24.0
}

fn found(outcome: SearchOutcome<grahan_search::EclipseEvent>) -> grahan_search::EclipseEvent {
    match outcome {
        SearchOutcome::Found(event) => event,
        SearchOutcome::Retry { next_start_jd_ut } => {
            panic!("expected an event, got a retry from JD {next_start_jd_ut}")
        }
    }
}

// ---------------------------------------------------------------------------
// Solar eclipses (global)
// ---------------------------------------------------------------------------

/// 2017-Aug-21: Total solar eclipse.
/// NASA catalog: greatest eclipse 18:25:37 UT at 36°58'N 87°40'W.
#[test]
fn solar_2017_aug_total_global() {
    let eph = AnalyticEphemeris::new();
    let config = EclipseSearchConfig::default();
    let event = found(next_solar_eclipse_global(&eph, jd_ut(2017, 8, 1, 0, 0), &config).unwrap());

    let expected = jd_ut(2017, 8, 21, 18, 26);
    let off = hours_off(event.contacts.maximum, expected);
    assert!(off < 0.1, "greatest eclipse off by {off:.3}h");
    assert_eq!(event.event_type.phase, EclipsePhase::Total);
    assert_eq!(event.event_type.centrality, Some(Centrality::Central));
    assert!(event.attributes.core_diameter_km < 0.0);

    let at = event.location.expect("global search reports the central point");
    assert!((at.latitude_deg - 36.97).abs() < 1.0, "lat = {}", at.latitude_deg);
    assert!((at.longitude_deg + 87.67).abs() < 1.5, "lon = {}", at.longitude_deg);

    // P1 15:46:48 UT, P4 21:04:19 UT.
    let p1 = event.contacts.partial_begin.expect("first contact");
    let p4 = event.contacts.partial_end.expect("last contact");
    assert!(hours_off(p1, jd_ut(2017, 8, 21, 15, 47)) < 0.1, "P1 = {p1}");
    assert!(hours_off(p4, jd_ut(2017, 8, 21, 21, 4)) < 0.1, "P4 = {p4}");
    assert!(event.contacts.totality_begin.is_some());
    assert!(event.contacts.center_line_begin.is_some());
    assert!(event.contacts.is_ordered(), "{:?}", event.contacts);
}

/// Local apparent noon of 2017-Aug-21: Sun and Moon share a right
/// ascension close to greatest eclipse, inside the partial phase.
#[test]
fn solar_2017_aug_local_noon() {
    let eph = AnalyticEphemeris::new();
    let config = EclipseSearchConfig::default();
    let event = found(next_solar_eclipse_global(&eph, jd_ut(2017, 8, 1, 0, 0), &config).unwrap());
    let noon = event.contacts.local_noon.expect("right-ascension conjunction");
    let p1 = event.contacts.partial_begin.expect("first contact");
    let p4 = event.contacts.partial_end.expect("last contact");
    assert!(p1 < noon && noon < p4, "noon {noon} outside [{p1}, {p4}]");
    assert!(hours_off(noon, event.contacts.maximum) < 0.75, "noon = {noon}");
}

/// 2023-Apr-20: hybrid eclipse, greatest eclipse 04:17 UT (total there,
/// annular near both ends of the path).
#[test]
fn solar_2023_apr_hybrid() {
    let eph = AnalyticEphemeris::new();
    let config = EclipseSearchConfig::default();
    let event = found(next_solar_eclipse_global(&eph, jd_ut(2023, 4, 1, 0, 0), &config).unwrap());
    let off = hours_off(event.contacts.maximum, jd_ut(2023, 4, 20, 4, 17));
    assert!(off < 0.1, "greatest eclipse off by {off:.3}h");
    assert_eq!(event.event_type.phase, EclipsePhase::AnnularTotal);
    assert_eq!(event.event_type.centrality, Some(Centrality::Central));
    assert!(event.attributes.core_diameter_km < 0.0);
    assert!(event.contacts.totality_begin.is_some() && event.contacts.totality_end.is_some());
    assert!(event.contacts.is_ordered(), "{:?}", event.contacts);

    let config = EclipseSearchConfig::with_filter(EclipseFilter::ANNULAR_TOTAL);
    let event = found(next_solar_eclipse_global(&eph, jd_ut(2022, 1, 1, 0, 0), &config).unwrap());
    assert!(hours_off(event.contacts.maximum, jd_ut(2023, 4, 20, 4, 17)) < 0.1);
}

/// An annular-only filter skips the 2024-Apr-08 total eclipse and returns
/// the 2024-Oct-02 annular eclipse (greatest eclipse 18:45 UT).
#[test]
fn annular_filter_skips_total() {
    let eph = AnalyticEphemeris::new();
    let config = EclipseSearchConfig::with_filter(EclipseFilter::ANNULAR);
    let event = found(next_solar_eclipse_global(&eph, jd_ut(2024, 3, 1, 0, 0), &config).unwrap());
    let off = hours_off(event.contacts.maximum, jd_ut(2024, 10, 2, 18, 45));
    assert!(off < 0.1, "annular eclipse off by {off:.3}h");
    assert_eq!(event.event_type.phase, EclipsePhase::Annular);
    assert!(event.attributes.core_diameter_km > 0.0);
}

/// 2023-Oct-14: Annular, greatest eclipse 18:00 UT.
#[test]
fn prev_solar_from_april_2024() {
    let eph = AnalyticEphemeris::new();
    let config = EclipseSearchConfig::default();
    let event = found(prev_solar_eclipse_global(&eph, jd_ut(2024, 4, 1, 0, 0), &config).unwrap());
    let off = hours_off(event.contacts.maximum, jd_ut(2023, 10, 14, 18, 0));
    assert!(off < 0.1, "annular eclipse off by {off:.3}h");
    assert_eq!(event.event_type.phase, EclipsePhase::Annular);
}

/// 2022-Oct-25: Partial, greatest eclipse 11:00 UT, magnitude 0.862.
#[test]
fn solar_2022_oct_partial() {
    let eph = AnalyticEphemeris::new();
    let config = EclipseSearchConfig::default();
    let event = found(next_solar_eclipse_global(&eph, jd_ut(2022, 10, 1, 0, 0), &config).unwrap());
    let off = hours_off(event.contacts.maximum, jd_ut(2022, 10, 25, 11, 0));
    assert!(off < 0.15, "partial eclipse off by {off:.3}h");
    assert_eq!(event.event_type.phase, EclipsePhase::Partial);
    assert_eq!(event.event_type.centrality, Some(Centrality::NonCentral));
    assert!(event.contacts.totality_begin.is_none() || event.contacts.totality_begin == Some(event.contacts.maximum));
}

#[test]
fn where_and_how_at_2024_apr_totality() {
    let eph = AnalyticEphemeris::new();
    let config = EclipseSearchConfig::default();
    let w = solar_eclipse_where(&eph, jd_ut(2024, 4, 8, 18, 17), &config).unwrap();
    assert_eq!(w.phase, EclipsePhase::Total);
    assert_eq!(w.centrality, Some(Centrality::Central));
    // Greatest eclipse near 25.3N 104.1W.
    assert!((w.location.latitude_deg - 25.3).abs() < 1.0, "{:?}", w.location);
    assert!((w.location.longitude_deg + 104.1).abs() < 1.5, "{:?}", w.location);

    // Dallas, totality 18:40:43–18:44:35 UT.
    let dallas = GeoPosition::new(-96.80, 32.78, 140.0);
    let how = solar_eclipse_how(&eph, jd_ut(2024, 4, 8, 18, 42), &dallas, &config).unwrap();
    assert_eq!(how.event_type.phase, EclipsePhase::Total);
    assert!(how.attributes.magnitude > 1.0);
    assert!((how.attributes.obscuration - 1.0).abs() < 1e-12);
    assert!(how.attributes.apparent_altitude_deg > 60.0);
    assert_eq!(how.event_type.visibility.map(|v| v.maximum), Some(true));
}

#[test]
fn no_eclipse_outside_syzygy() {
    let eph = AnalyticEphemeris::new();
    let config = EclipseSearchConfig::default();
    let w = solar_eclipse_where(&eph, jd_ut(2024, 4, 15, 0, 0), &config).unwrap();
    assert_eq!(w.phase, EclipsePhase::None);
    assert_eq!(w.centrality, None);
    assert_eq!(w.core.umbra_surface_km, 0.0);
}

#[test]
fn solar_range_2024() {
    let eph = AnalyticEphemeris::new();
    let config = EclipseSearchConfig::default();
    let events = search_solar_eclipses(&eph, jd_ut(2024, 1, 1, 0, 0), jd_ut(2024, 12, 31, 0, 0), &config)
        .unwrap();
    let phases: Vec<EclipsePhase> = events.iter().map(|e| e.event_type.phase).collect();
    assert_eq!(phases, vec![EclipsePhase::Total, EclipsePhase::Annular]);
}

#[test]
fn range_must_be_forward() {
    let eph = AnalyticEphemeris::new();
    let config = EclipseSearchConfig::default();
    let err = search_solar_eclipses(&eph, 2_460_000.0, 2_459_000.0, &config).unwrap_err();
    assert!(matches!(err, SearchError::InvalidConfig(_)));
}

// ---------------------------------------------------------------------------
// Search control
// ---------------------------------------------------------------------------

#[test]
fn prefiltered_lunations_cost_no_queries() {
    let eph = RecordingProvider::new(AnalyticEphemeris::new());
    let config = EclipseSearchConfig::default();
    let event = found(next_solar_eclipse_global(&eph, jd_ut(2024, 4, 15, 0, 0), &config).unwrap());
    assert!(hours_off(event.contacts.maximum, jd_ut(2024, 10, 2, 18, 45)) < 0.1);

    // New moons of May, June and July 2024 lie far from the nodes.
    let epochs = eph.epochs();
    for index in 302..=304 {
        let new_moon = Lunation { index, syzygy: Syzygy::NewMoon }.approximate_jd_et();
        assert!(
            epochs.iter().all(|t| (t - new_moon).abs() > 3.0),
            "provider queried near pre-filtered lunation {index}"
        );
    }
}

#[test]
fn invalid_height_fails_before_any_query() {
    let eph = RecordingProvider::new(AnalyticEphemeris::new());
    let site = GeoPosition::new(0.0, 0.0, -10_000.0);
    let config = EclipseSearchConfig::default();
    let err = next_solar_eclipse_local(&eph, 2_460_000.0, &site, &config).unwrap_err();
    assert_eq!(err, SearchError::InvalidGeographicAltitude { height_m: -10_000.0 });
    let err = next_lunar_eclipse_local(&eph, 2_460_000.0, &site, &config).unwrap_err();
    assert!(matches!(err, SearchError::InvalidGeographicAltitude { .. }));
    assert_eq!(eph.calls(), 0);
}

#[test]
fn single_attempt_returns_retry() {
    let eph = AnalyticEphemeris::new();
    let config = EclipseSearchConfig {
        single_attempt: true,
        ..EclipseSearchConfig::with_filter(EclipseFilter::TOTAL)
    };
    // The first real candidate after mid-April 2024 is the October annular.
    let outcome = next_solar_eclipse_global(&eph, jd_ut(2024, 4, 15, 0, 0), &config).unwrap();
    match outcome {
        SearchOutcome::Retry { next_start_jd_ut } => {
            assert!(hours_off(next_start_jd_ut, jd_ut(2024, 10, 2, 18, 45)) < 0.2);
        }
        SearchOutcome::Found(e) => panic!("expected a retry, found {e:?}"),
    }
}

#[test]
fn coverage_end_exhausts_search() {
    let eph = AnalyticEphemeris::new().with_coverage(2_460_000.0, 2_460_100.0);
    let config = EclipseSearchConfig::with_filter(EclipseFilter::TOTAL);
    let err = next_lunar_eclipse(&eph, 2_460_010.0, &config).unwrap_err();
    assert!(matches!(err, SearchError::SearchExhausted { .. }), "{err:?}");
}

// ---------------------------------------------------------------------------
// Solar eclipses (local)
// ---------------------------------------------------------------------------

/// Nashville, 2017-Aug-21. The city lies south of the centre line, so its
/// totality is shorter than the 2m40s of greatest duration: NASA local
/// circumstances give about 1m57s, centred near 18:28:20 UT.
#[test]
fn nashville_2017_total() {
    let eph = AnalyticEphemeris::new();
    let site = GeoPosition::new(-86.78, 36.16, 180.0);
    let config = EclipseSearchConfig::default();
    let event = found(next_solar_eclipse_local(&eph, jd_ut(2017, 8, 1, 0, 0), &site, &config).unwrap());
    assert_eq!(event.event_type.phase, EclipsePhase::Total);
    let mid_totality = jd_ut(2017, 8, 21, 18, 28) + 20.0 / 86_400.0;
    let off = hours_off(event.contacts.maximum, mid_totality);
    assert!(off < 0.025, "local maximum off by {off:.3}h");
    let c2 = event.contacts.totality_begin.expect("second contact");
    let c3 = event.contacts.totality_end.expect("third contact");
    let minutes = (c3 - c2) * 1440.0;
    assert!((minutes - 1.95).abs() < 0.25, "totality lasts {minutes:.2} min");
    assert!(minutes < 2.67, "longer than on the centre line: {minutes:.2} min");
    assert!(c2 < event.contacts.maximum && event.contacts.maximum < c3);
    assert!(event.contacts.is_ordered(), "{:?}", event.contacts);
    assert!(event.location.is_none());
    let visibility = event.event_type.visibility.expect("local visibility");
    assert!(visibility.maximum && visibility.partial_begin && visibility.partial_end);
}

/// Berlin, 2022-Oct-25: partial, maximum about 10:10 UT.
#[test]
fn berlin_2022_partial() {
    let eph = AnalyticEphemeris::new();
    let site = GeoPosition::new(13.40, 52.52, 34.0);
    let config = EclipseSearchConfig::default();
    let event = found(next_solar_eclipse_local(&eph, jd_ut(2022, 10, 1, 0, 0), &site, &config).unwrap());
    assert_eq!(event.event_type.phase, EclipsePhase::Partial);
    let off = hours_off(event.contacts.maximum, jd_ut(2022, 10, 25, 10, 10));
    assert!(off < 0.25, "local maximum off by {off:.3}h");
    assert!(event.attributes.magnitude > 0.2 && event.attributes.magnitude < 0.5);
    assert!(event.attributes.obscuration > 0.0 && event.attributes.obscuration < event.attributes.magnitude);
    assert!(event.contacts.totality_begin.is_none());
}

// ---------------------------------------------------------------------------
// Lunar eclipses
// ---------------------------------------------------------------------------

/// 2022-Nov-08: Total, greatest eclipse 10:59 UT, umbral magnitude 1.359.
#[test]
fn lunar_2022_nov_total() {
    let eph = AnalyticEphemeris::new();
    let config = EclipseSearchConfig::default();
    let event = found(next_lunar_eclipse(&eph, jd_ut(2022, 10, 20, 0, 0), &config).unwrap());
    let off = hours_off(event.contacts.maximum, jd_ut(2022, 11, 8, 10, 59));
    assert!(off < 0.1, "greatest eclipse off by {off:.3}h");
    assert_eq!(event.event_type.phase, EclipsePhase::Total);
    assert!((event.attributes.magnitude - 1.359).abs() < 0.05, "{}", event.attributes.magnitude);
    assert!(event.attributes.penumbral_magnitude > event.attributes.magnitude);

    // U2 10:16:39 UT, U3 11:41:35 UT.
    let u2 = event.contacts.totality_begin.expect("totality begins");
    let u3 = event.contacts.totality_end.expect("totality ends");
    assert!(hours_off(u2, jd_ut(2022, 11, 8, 10, 17)) < 0.1, "U2 = {u2}");
    assert!(hours_off(u3, jd_ut(2022, 11, 8, 11, 42)) < 0.1, "U3 = {u3}");
    assert!(event.contacts.penumbral_begin.is_some() && event.contacts.partial_begin.is_some());
    assert!(event.contacts.is_ordered(), "{:?}", event.contacts);
    assert_eq!(event.event_type.centrality, None);
}

/// 2023-May-05: Penumbral, greatest eclipse 17:23 UT.
#[test]
fn lunar_2023_may_penumbral() {
    let eph = AnalyticEphemeris::new();
    let config = EclipseSearchConfig::default();
    let event = found(next_lunar_eclipse(&eph, jd_ut(2023, 4, 25, 0, 0), &config).unwrap());
    assert!(hours_off(event.contacts.maximum, jd_ut(2023, 5, 5, 17, 23)) < 0.1);
    assert_eq!(event.event_type.phase, EclipsePhase::Penumbral);
    assert!(event.contacts.partial_begin.is_none());
    assert!(event.attributes.magnitude < 0.0);
}

/// No total lunar eclipse in 2023 or 2024; the next is 2025-Mar-14, 06:59 UT.
#[test]
fn total_only_lunar_filter() {
    let eph = AnalyticEphemeris::new();
    let config = EclipseSearchConfig::with_filter(EclipseFilter::TOTAL);
    let event = found(next_lunar_eclipse(&eph, jd_ut(2023, 1, 1, 0, 0), &config).unwrap());
    assert!(hours_off(event.contacts.maximum, jd_ut(2025, 3, 14, 6, 59)) < 0.1);
    assert_eq!(event.event_type.phase, EclipsePhase::Total);
}

#[test]
fn prev_lunar_from_2023() {
    let eph = AnalyticEphemeris::new();
    let config = EclipseSearchConfig::default();
    let event = found(prev_lunar_eclipse(&eph, jd_ut(2023, 1, 1, 0, 0), &config).unwrap());
    assert!(hours_off(event.contacts.maximum, jd_ut(2022, 11, 8, 10, 59)) < 0.1);
}

#[test]
fn lunar_range_2025() {
    let eph = AnalyticEphemeris::new();
    let config = EclipseSearchConfig::default();
    let events = search_lunar_eclipses(&eph, jd_ut(2025, 1, 1, 0, 0), jd_ut(2025, 12, 31, 0, 0), &config)
        .unwrap();
    assert_eq!(events.len(), 2);
    assert!(hours_off(events[1].contacts.maximum, jd_ut(2025, 9, 7, 18, 12)) < 0.1);
    assert!(events.iter().all(|e| e.event_type.phase == EclipsePhase::Total));
}

/// New Delhi, 2022-Nov-08: the Moon rises near 12:00 UT, after totality
/// and before the end of the partial phase (U4 12:49 UT).
#[test]
fn new_delhi_2022_nov_moonrise_during_eclipse() {
    let eph = AnalyticEphemeris::new();
    let site = GeoPosition::new(77.209, 28.6139, 216.0);
    let config = EclipseSearchConfig::default();
    let event = found(next_lunar_eclipse_local(&eph, jd_ut(2022, 10, 20, 0, 0), &site, &config).unwrap());
    let rise = event.contacts.body_rise.expect("moonrise during the eclipse");
    let day = jd_ut(2022, 11, 8, 0, 0);
    let hours = (rise - day) * 24.0;
    assert!((11.5..12.6).contains(&hours), "moonrise at {hours:.2}h UT");
    assert_eq!(event.contacts.maximum, rise);
    assert!(event.contacts.penumbral_begin.is_none());
    assert!(event.contacts.totality_end.is_none());
    assert!(event.contacts.partial_end.is_some());
    let visibility = event.event_type.visibility.expect("local visibility");
    assert!(visibility.maximum && visibility.partial_end && !visibility.totality_begin);
    assert!(event.contacts.is_ordered(), "{:?}", event.contacts);
}

/// The total-only filter holds at the horizon: seen from New Delhi the
/// 2022-Nov-08 eclipse is partial by moonrise, and 2025-Mar-14 happens with
/// the Moon down, so the next total one is 2025-Sep-07 (18:12 UT).
#[test]
fn new_delhi_total_filter_checks_phase_at_moonrise() {
    let eph = AnalyticEphemeris::new();
    let site = GeoPosition::new(77.209, 28.6139, 216.0);
    let config = EclipseSearchConfig::with_filter(EclipseFilter::TOTAL);
    let event = found(next_lunar_eclipse_local(&eph, jd_ut(2022, 10, 20, 0, 0), &site, &config).unwrap());
    assert_eq!(event.event_type.phase, EclipsePhase::Total);
    let off = hours_off(event.contacts.maximum, jd_ut(2025, 9, 7, 18, 12));
    assert!(off < 0.1, "maximum off by {off:.3}h");
    assert!(event.contacts.totality_begin.is_some() && event.contacts.totality_end.is_some());
    assert!(event.contacts.body_rise.is_none() && event.contacts.body_set.is_none());

    // Single attempt reports the 2022 eclipse as rejected.
    let config = EclipseSearchConfig { single_attempt: true, ..config };
    let outcome = next_lunar_eclipse_local(&eph, jd_ut(2022, 10, 20, 0, 0), &site, &config).unwrap();
    match outcome {
        SearchOutcome::Retry { next_start_jd_ut } => {
            assert!(hours_off(next_start_jd_ut, jd_ut(2022, 11, 8, 12, 0)) < 1.5);
        }
        SearchOutcome::Found(e) => panic!("expected a retry, found {e:?}"),
    }
}

#[test]
fn lunar_how_at_greatest_eclipse() {
    let eph = AnalyticEphemeris::new();
    let config = EclipseSearchConfig::default();
    let t = jd_ut(2022, 11, 8, 10, 59);
    let global = lunar_eclipse_how(&eph, t, None, &config).unwrap();
    assert_eq!(global.event_type.phase, EclipsePhase::Total);
    assert_eq!(global.event_type.visibility, None);
    // Honolulu sees the whole eclipse high in the sky.
    let honolulu = GeoPosition::new(-157.86, 21.31, 5.0);
    let local = lunar_eclipse_how(&eph, t, Some(&honolulu), &config).unwrap();
    assert!(local.attributes.apparent_altitude_deg > 30.0);
    assert_eq!(local.event_type.visibility.map(|v| v.maximum), Some(true));
    assert_eq!(local.attributes.magnitude, global.attributes.magnitude);
}

// ---------------------------------------------------------------------------
// Occultations
// ---------------------------------------------------------------------------

/// A star placed 0.1° north of the Moon's centre at 2024-06-01 00:00 UT.
fn star_on_moon_path() -> (AnalyticEphemeris, Target, f64) {
    let when = jd_ut(2024, 6, 1, 0, 0);
    // ΔT is about 69 s in 2024; the Moon moves 0.01° in that time.
    let moon = moon_ecliptic(when + 69.0 / 86_400.0);
    let eph = AnalyticEphemeris::new().with_star(StarEntry::of_date(
        "test",
        moon.lon_deg,
        moon.lat_deg + 0.1,
    ));
    (eph, Target::star("test"), when)
}

#[test]
fn occultation_of_star_on_moon_path() {
    let (eph, star, when) = star_on_moon_path();
    let config = EclipseSearchConfig::default();
    let event = found(next_occultation_global(&eph, &star, when - 2.0, &config).unwrap());
    assert!(hours_off(event.contacts.maximum, when) < 1.0, "max = {}", event.contacts.maximum);
    assert_eq!(event.event_type.phase, EclipsePhase::Total);
    assert_eq!(event.event_type.centrality, Some(Centrality::Central));
    assert!(event.location.is_some());
    assert!(event.contacts.is_ordered(), "{:?}", event.contacts);
}

#[test]
fn occultation_targets_are_checked() {
    let eph = RecordingProvider::new(
        AnalyticEphemeris::new().with_star(StarEntry::of_date("polar", 100.0, 10.0)),
    );
    let config = EclipseSearchConfig::default();
    let err =
        next_occultation_global(&eph, &Target::Body(Body::Moon), 2_460_000.0, &config).unwrap_err();
    assert!(matches!(err, SearchError::InvalidTarget(_)));
    assert_eq!(eph.calls(), 0);
    let err = next_occultation_global(&eph, &Target::star("polar"), 2_460_000.0, &config).unwrap_err();
    assert!(matches!(err, SearchError::InvalidTarget(_)), "{err:?}");
}

#[test]
fn prev_occultation_finds_the_same_conjunction() {
    let (eph, star, when) = star_on_moon_path();
    let config = EclipseSearchConfig::default();
    let next = found(next_occultation_global(&eph, &star, when - 2.0, &config).unwrap());
    let prev = found(prev_occultation_global(&eph, &star, when + 2.0, &config).unwrap());
    assert!(hours_off(prev.contacts.maximum, next.contacts.maximum) < 0.01);
    assert_eq!(prev.event_type.phase, next.event_type.phase);
}

#[test]
fn occultation_where_and_how_at_maximum() {
    let (eph, star, when) = star_on_moon_path();
    let config = EclipseSearchConfig::default();
    let event = found(next_occultation_global(&eph, &star, when - 2.0, &config).unwrap());
    let central = event.location.expect("central point");

    let w = occultation_where(&eph, &star, event.contacts.maximum, &config).unwrap();
    assert_eq!(w.phase, EclipsePhase::Total);
    assert_eq!(w.centrality, Some(Centrality::Central));
    assert!((w.location.latitude_deg - central.latitude_deg).abs() < 0.5, "{:?}", w.location);

    let how = occultation_how(&eph, &star, event.contacts.maximum, &central, &config).unwrap();
    assert_eq!(how.event_type.phase, EclipsePhase::Total);
    assert!(how.attributes.apparent_altitude_deg > 45.0);
    assert_eq!(how.event_type.visibility.map(|v| v.maximum), Some(true));

    // Three days on the Moon is some 40° away.
    let w = occultation_where(&eph, &star, when + 3.0, &config).unwrap();
    assert_eq!(w.phase, EclipsePhase::None);
}

#[test]
fn occultation_seen_from_the_central_point() {
    let (eph, star, when) = star_on_moon_path();
    let config = EclipseSearchConfig::default();
    let global = found(next_occultation_global(&eph, &star, when - 2.0, &config).unwrap());
    let site = global.location.expect("central point");

    let local = found(next_occultation_local(&eph, &star, when - 2.0, &site, &config).unwrap());
    assert!(hours_off(local.contacts.maximum, global.contacts.maximum) < 0.25);
    assert_eq!(local.event_type.phase, EclipsePhase::Total);
    assert!(local.location.is_none());
    let disappears = local.contacts.partial_begin.expect("disappearance");
    let reappears = local.contacts.partial_end.expect("reappearance");
    assert!(disappears < local.contacts.maximum && local.contacts.maximum < reappears);
    assert!((reappears - disappears) * 24.0 < 2.0);
    let visibility = local.event_type.visibility.expect("local visibility");
    assert!(visibility.maximum);

    let back = found(prev_occultation_local(&eph, &star, when + 2.0, &site, &config).unwrap());
    assert!(hours_off(back.contacts.maximum, local.contacts.maximum) < 0.01);
}
