//! Occultations of planets, minor planets and stars by the Moon.
//!
//! Candidate epochs are conjunctions in ecliptic longitude, found by
//! stepping the longitude difference at the Moon's mean relative speed.
//! Conjunctions with the target more than 2° from the Moon in latitude are
//! skipped 20 days at a time.

use grahan_core::{
    Body, CoordinateFrame, EclipseKind, GeoPosition, Observer, PositionProvider, ProviderContext,
    ProviderError, Target,
};
use grahan_frames::{normalize_deg_360, normalize_deg_pm180};

use crate::eclipse_types::{
    EclipseCircumstances, EclipseEvent, EclipseLocation, EclipseSearchConfig, SearchDirection,
    SearchOutcome,
};
use crate::error::{SearchError, check_site};
use crate::global::GlobalSearch;
use crate::local::LocalSearch;
use crate::machine::{Epoch, Limits, drive};
use crate::shadow::{circumstances, shadow_where};

/// Moon's mean daily motion relative to the stars, rounded, deg/day.
const MOON_RELATIVE_SPEED_DEG_PER_DAY: f64 = 13.0;

/// Conjunction accepted once the longitude difference is this small, deg.
const CONJUNCTION_TOLERANCE_DEG: f64 = 0.1;

/// Iteration guard for the conjunction stepper.
const CONJUNCTION_MAX_STEPS: usize = 30;

/// Conjunctions with a larger latitude difference cannot be occultations, deg.
pub(crate) const OCCULTATION_LATITUDE_CUTOFF_DEG: f64 = 2.0;

/// Stars farther than this from the ecliptic are never occulted by the
/// Moon, deg.
pub const MAX_OCCULTABLE_LATITUDE_DEG: f64 = 6.6;

/// A Moon/target conjunction in ecliptic longitude.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Conjunction {
    pub jd_et: f64,
    /// Target latitude minus Moon latitude, deg.
    pub latitude_gap_deg: f64,
}

impl Conjunction {
    pub fn close_enough(&self) -> bool {
        self.latitude_gap_deg.abs() <= OCCULTATION_LATITUDE_CUTOFF_DEG
    }
}

fn ecliptic_gap<P: PositionProvider + ?Sized>(
    ctx: &ProviderContext<'_, P>,
    target: &Target,
    jd_et: f64,
) -> Result<(f64, f64), ProviderError> {
    let moon = ctx.position(
        &Target::Body(Body::Moon),
        jd_et,
        CoordinateFrame::Ecliptic,
        Observer::Geocentric,
    )?;
    let body = ctx.position(target, jd_et, CoordinateFrame::Ecliptic, Observer::Geocentric)?;
    Ok((body.lon_deg - moon.lon_deg, body.lat_deg - moon.lat_deg))
}

/// Next (or previous) conjunction of the Moon with `target` from `from_et`.
pub(crate) fn find_conjunction<P: PositionProvider + ?Sized>(
    ctx: &ProviderContext<'_, P>,
    target: &Target,
    from_et: f64,
    direction: SearchDirection,
) -> Result<Conjunction, ProviderError> {
    let mut t = from_et;
    let (dl, mut db) = ecliptic_gap(ctx, target, t)?;
    let mut dl = normalize_deg_360(dl);
    if direction == SearchDirection::Backward {
        dl -= 360.0;
    }
    for _ in 0..CONJUNCTION_MAX_STEPS {
        if dl.abs() <= CONJUNCTION_TOLERANCE_DEG {
            break;
        }
        t += dl / MOON_RELATIVE_SPEED_DEG_PER_DAY;
        let (l, b) = ecliptic_gap(ctx, target, t)?;
        dl = normalize_deg_pm180(l);
        db = b;
    }
    tracing::trace!(%target, jd_et = t, latitude_gap = db, "conjunction");
    Ok(Conjunction {
        jd_et: t,
        latitude_gap_deg: db,
    })
}

/// Targets the Moon can occult. Stars are checked against the ecliptic
/// band at `jd_ut`.
fn check_target<P: PositionProvider + ?Sized>(
    ctx: &ProviderContext<'_, P>,
    target: &Target,
    jd_ut: f64,
) -> Result<(), SearchError> {
    if target.is_body(Body::Moon) {
        return Err(SearchError::InvalidTarget("the Moon cannot occult itself".into()));
    }
    if target.is_computed_point() {
        return Err(SearchError::InvalidTarget(format!("{target} is not a physical body")));
    }
    if target.is_star() {
        let pos = ctx.position(
            target,
            ctx.ut_to_et(jd_ut),
            CoordinateFrame::Ecliptic,
            Observer::Geocentric,
        )?;
        if pos.lat_deg.abs() > MAX_OCCULTABLE_LATITUDE_DEG {
            return Err(SearchError::InvalidTarget(format!(
                "{target} at ecliptic latitude {:.2} deg is never occulted by the Moon",
                pos.lat_deg
            )));
        }
    }
    Ok(())
}

/// Where the Moon's shadow with respect to `target` falls at `jd_ut`.
pub fn occultation_where<P: PositionProvider + ?Sized>(
    provider: &P,
    target: &Target,
    jd_ut: f64,
    config: &EclipseSearchConfig,
) -> Result<EclipseLocation, SearchError> {
    let ctx = ProviderContext::new(provider, config.ephemeris);
    check_target(&ctx, target, jd_ut)?;
    Ok(shadow_where(&ctx, target, jd_ut)?)
}

/// How an occultation of `target` looks from `site` at `jd_ut`.
pub fn occultation_how<P: PositionProvider + ?Sized>(
    provider: &P,
    target: &Target,
    jd_ut: f64,
    site: &GeoPosition,
    config: &EclipseSearchConfig,
) -> Result<EclipseCircumstances, SearchError> {
    check_site(site)?;
    let ctx = ProviderContext::new(provider, config.ephemeris);
    check_target(&ctx, target, jd_ut)?;
    Ok(circumstances(&ctx, target, EclipseKind::Occultation, jd_ut, site, &config.atmosphere)?)
}

fn occultation_global<P: PositionProvider + ?Sized>(
    provider: &P,
    target: &Target,
    jd_ut: f64,
    direction: SearchDirection,
    config: &EclipseSearchConfig,
) -> Result<SearchOutcome<EclipseEvent>, SearchError> {
    config.validate()?;
    let filter = config.filter.normalized_solar()?;
    let ctx = ProviderContext::new(provider, config.ephemeris);
    check_target(&ctx, target, jd_ut)?;
    let mut machine = GlobalSearch::new(
        ctx,
        target,
        EclipseKind::Occultation,
        jd_ut,
        direction,
        filter,
        config.atmosphere,
    );
    let first = Epoch::Cursor(ctx.ut_to_et(jd_ut) - direction.sign());
    drive(&mut machine, first, Limits::from(config))
}

fn occultation_local<P: PositionProvider + ?Sized>(
    provider: &P,
    target: &Target,
    jd_ut: f64,
    site: &GeoPosition,
    direction: SearchDirection,
    config: &EclipseSearchConfig,
) -> Result<SearchOutcome<EclipseEvent>, SearchError> {
    check_site(site)?;
    config.validate()?;
    let filter = config.filter.normalized_solar()?;
    let ctx = ProviderContext::new(provider, config.ephemeris);
    check_target(&ctx, target, jd_ut)?;
    let mut machine = LocalSearch::new(
        provider,
        target,
        EclipseKind::Occultation,
        *site,
        jd_ut,
        direction,
        filter,
        config.atmosphere,
        config.ephemeris,
    );
    let first = Epoch::Cursor(ctx.ut_to_et(jd_ut) - direction.sign());
    drive(&mut machine, first, Limits::from(config))
}

/// Next occultation of `target` by the Moon anywhere on Earth after `jd_ut`.
pub fn next_occultation_global<P: PositionProvider + ?Sized>(
    provider: &P,
    target: &Target,
    jd_ut: f64,
    config: &EclipseSearchConfig,
) -> Result<SearchOutcome<EclipseEvent>, SearchError> {
    occultation_global(provider, target, jd_ut, SearchDirection::Forward, config)
}

/// Previous occultation of `target` by the Moon anywhere on Earth before `jd_ut`.
pub fn prev_occultation_global<P: PositionProvider + ?Sized>(
    provider: &P,
    target: &Target,
    jd_ut: f64,
    config: &EclipseSearchConfig,
) -> Result<SearchOutcome<EclipseEvent>, SearchError> {
    occultation_global(provider, target, jd_ut, SearchDirection::Backward, config)
}

/// Next occultation of `target` visible from `site` after `jd_ut`.
pub fn next_occultation_local<P: PositionProvider + ?Sized>(
    provider: &P,
    target: &Target,
    jd_ut: f64,
    site: &GeoPosition,
    config: &EclipseSearchConfig,
) -> Result<SearchOutcome<EclipseEvent>, SearchError> {
    occultation_local(provider, target, jd_ut, site, SearchDirection::Forward, config)
}

/// Previous occultation of `target` visible from `site` before `jd_ut`.
pub fn prev_occultation_local<P: PositionProvider + ?Sized>(
    provider: &P,
    target: &Target,
    jd_ut: f64,
    site: &GeoPosition,
    config: &EclipseSearchConfig,
) -> Result<SearchOutcome<EclipseEvent>, SearchError> {
    occultation_local(provider, target, jd_ut, site, SearchDirection::Backward, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use grahan_core::{Position, PositionRequest};

    /// Moon circling the ecliptic at 13.2°/day with a 5° inclined orbit,
    /// and one fixed star.
    struct Circle {
        star_lat: f64,
    }

    impl PositionProvider for Circle {
        fn position(&self, req: &PositionRequest<'_>) -> Result<Position, ProviderError> {
            match req.target {
                Target::Body(Body::Moon) => {
                    let lon = normalize_deg_360(13.2 * (req.jd_et - 2_460_000.0));
                    let lat = 5.0 * lon.to_radians().sin();
                    Ok(Position::new(lon, lat, 384_400.0))
                }
                Target::Star(_) => Ok(Position::new(100.0, self.star_lat, 9.46e13)),
                _ => Err(ProviderError::UnsupportedTarget(req.target.to_string())),
            }
        }

        fn delta_t_seconds(&self, _: f64) -> f64 {
            69.0
        }
    }

    #[test]
    fn conjunction_forward_and_backward() {
        let sky = Circle { star_lat: 4.0 };
        let ctx = ProviderContext::new(&sky, Default::default());
        let star = Target::star("test");
        let conj_at = 2_460_000.0 + 100.0 / 13.2;
        let fwd = find_conjunction(&ctx, &star, 2_460_000.0, SearchDirection::Forward).unwrap();
        assert_abs_diff_eq!(fwd.jd_et, conj_at, epsilon = 0.1 / 13.2);
        let bwd = find_conjunction(&ctx, &star, conj_at + 3.0, SearchDirection::Backward).unwrap();
        assert_abs_diff_eq!(bwd.jd_et, conj_at, epsilon = 0.1 / 13.2);
        // Moon at latitude 5·sin(100°) ≈ 4.92°, star at 4°.
        assert!(fwd.close_enough());
    }

    #[test]
    fn far_conjunction_is_cut_off() {
        let sky = Circle { star_lat: 1.0 };
        let ctx = ProviderContext::new(&sky, Default::default());
        let conj =
            find_conjunction(&ctx, &Target::star("x"), 2_460_000.0, SearchDirection::Forward)
                .unwrap();
        assert!(!conj.close_enough());
    }

    #[test]
    fn invalid_targets() {
        let sky = Circle { star_lat: 10.0 };
        let ctx = ProviderContext::new(&sky, Default::default());
        let err = check_target(&ctx, &Target::Body(Body::Moon), 2_460_000.0).unwrap_err();
        assert!(matches!(err, SearchError::InvalidTarget(_)));
        let err = check_target(&ctx, &Target::Body(Body::TrueNode), 2_460_000.0).unwrap_err();
        assert!(matches!(err, SearchError::InvalidTarget(_)));
        let err = check_target(&ctx, &Target::star("far"), 2_460_000.0).unwrap_err();
        assert!(err.to_string().contains("never occulted"));
    }
}
