//! Solar eclipses: where and how at an instant, and global and local
//! searches over new moons.

use grahan_core::{Body, EclipseKind, GeoPosition, PositionProvider, ProviderContext, Target};

use crate::eclipse_types::{
    EclipseCircumstances, EclipseEvent, EclipseLocation, EclipseSearchConfig, SearchDirection,
    SearchOutcome,
};
use crate::error::{SearchError, check_site};
use crate::global::GlobalSearch;
use crate::local::LocalSearch;
use crate::lunation::{Lunation, Syzygy};
use crate::machine::{Epoch, Limits, collect_forward, drive};
use crate::shadow::{circumstances, shadow_where};

static SUN: Target = Target::Body(Body::Sun);

// ---------------------------------------------------------------------------
// At one instant
// ---------------------------------------------------------------------------

/// Where the Moon's shadow falls at `jd_ut`: central point, classification
/// and shadow-cone metrics.
///
/// With no eclipse the phase is [`EclipsePhase::None`](crate::EclipsePhase::None),
/// the metrics are zero, and the location is the point of the Earth nearest
/// the shadow axis.
pub fn solar_eclipse_where<P: PositionProvider + ?Sized>(
    provider: &P,
    jd_ut: f64,
    config: &EclipseSearchConfig,
) -> Result<EclipseLocation, SearchError> {
    let ctx = ProviderContext::new(provider, config.ephemeris);
    Ok(shadow_where(&ctx, &SUN, jd_ut)?)
}

/// How a solar eclipse looks from `site` at `jd_ut`.
pub fn solar_eclipse_how<P: PositionProvider + ?Sized>(
    provider: &P,
    jd_ut: f64,
    site: &GeoPosition,
    config: &EclipseSearchConfig,
) -> Result<EclipseCircumstances, SearchError> {
    check_site(site)?;
    let ctx = ProviderContext::new(provider, config.ephemeris);
    Ok(circumstances(&ctx, &SUN, EclipseKind::Solar, jd_ut, site, &config.atmosphere)?)
}

// ---------------------------------------------------------------------------
// Searches
// ---------------------------------------------------------------------------

fn solar_global<P: PositionProvider + ?Sized>(
    provider: &P,
    jd_ut: f64,
    direction: SearchDirection,
    config: &EclipseSearchConfig,
) -> Result<SearchOutcome<EclipseEvent>, SearchError> {
    config.validate()?;
    let filter = config.filter.normalized_solar()?;
    let ctx = ProviderContext::new(provider, config.ephemeris);
    let mut machine = GlobalSearch::new(
        ctx,
        &SUN,
        EclipseKind::Solar,
        jd_ut,
        direction,
        filter,
        config.atmosphere,
    );
    let first = Epoch::Lunation(Lunation::starting_at(jd_ut, Syzygy::NewMoon, direction));
    drive(&mut machine, first, Limits::from(config))
}

fn solar_local<P: PositionProvider + ?Sized>(
    provider: &P,
    jd_ut: f64,
    site: &GeoPosition,
    direction: SearchDirection,
    config: &EclipseSearchConfig,
) -> Result<SearchOutcome<EclipseEvent>, SearchError> {
    check_site(site)?;
    config.validate()?;
    let filter = config.filter.normalized_solar()?;
    let mut machine = LocalSearch::new(
        provider,
        &SUN,
        EclipseKind::Solar,
        *site,
        jd_ut,
        direction,
        filter,
        config.atmosphere,
        config.ephemeris,
    );
    let first = Epoch::Lunation(Lunation::starting_at(jd_ut, Syzygy::NewMoon, direction));
    drive(&mut machine, first, Limits::from(config))
}

/// Next solar eclipse anywhere on Earth with its maximum after `jd_ut`.
///
/// # Example
///
/// ```no_run
/// # fn demo<P: grahan_core::PositionProvider>(provider: &P) -> Result<(), grahan_search::SearchError> {
/// use grahan_search::{EclipseFilter, EclipseSearchConfig, next_solar_eclipse_global};
///
/// let config = EclipseSearchConfig::with_filter(EclipseFilter::TOTAL);
/// if let Some(event) = next_solar_eclipse_global(provider, 2_460_400.5, &config)?.into_found() {
///     println!("total eclipse at JD {}", event.contacts.maximum);
/// }
/// # Ok(())
/// # }
/// ```
pub fn next_solar_eclipse_global<P: PositionProvider + ?Sized>(
    provider: &P,
    jd_ut: f64,
    config: &EclipseSearchConfig,
) -> Result<SearchOutcome<EclipseEvent>, SearchError> {
    solar_global(provider, jd_ut, SearchDirection::Forward, config)
}

/// Previous solar eclipse anywhere on Earth with its maximum before `jd_ut`.
pub fn prev_solar_eclipse_global<P: PositionProvider + ?Sized>(
    provider: &P,
    jd_ut: f64,
    config: &EclipseSearchConfig,
) -> Result<SearchOutcome<EclipseEvent>, SearchError> {
    solar_global(provider, jd_ut, SearchDirection::Backward, config)
}

/// Next solar eclipse visible from `site` after `jd_ut`.
///
/// The filter applies to the phase seen from the site; the centrality in
/// the result is that of the global eclipse at the local maximum.
pub fn next_solar_eclipse_local<P: PositionProvider + ?Sized>(
    provider: &P,
    jd_ut: f64,
    site: &GeoPosition,
    config: &EclipseSearchConfig,
) -> Result<SearchOutcome<EclipseEvent>, SearchError> {
    solar_local(provider, jd_ut, site, SearchDirection::Forward, config)
}

/// Previous solar eclipse visible from `site` before `jd_ut`.
pub fn prev_solar_eclipse_local<P: PositionProvider + ?Sized>(
    provider: &P,
    jd_ut: f64,
    site: &GeoPosition,
    config: &EclipseSearchConfig,
) -> Result<SearchOutcome<EclipseEvent>, SearchError> {
    solar_local(provider, jd_ut, site, SearchDirection::Backward, config)
}

/// All solar eclipses (global) with maxima after `jd_start` and up to
/// `jd_end`, in time order. `single_attempt` is ignored.
pub fn search_solar_eclipses<P: PositionProvider + ?Sized>(
    provider: &P,
    jd_start: f64,
    jd_end: f64,
    config: &EclipseSearchConfig,
) -> Result<Vec<EclipseEvent>, SearchError> {
    if jd_end <= jd_start {
        return Err(SearchError::InvalidConfig("jd_end must be after jd_start"));
    }
    let config = EclipseSearchConfig {
        single_attempt: false,
        ..*config
    };
    collect_forward(jd_start, jd_end, |t| {
        solar_global(provider, t, SearchDirection::Forward, &config)
    })
}
