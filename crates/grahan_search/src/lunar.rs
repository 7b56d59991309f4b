//! Lunar eclipses: circumstances at an instant and searches over full moons.
//!
//! Contacts are the instants the Moon's limb crosses the penumbra and umbra
//! of the Earth's shadow at the Moon's distance. Local searches also require
//! the Moon to be above the horizon for part of the eclipse and trim the
//! contacts to the time it is up.

use grahan_core::{
    Atmosphere, Body, CoordinateFrame, EclipseKind, EphemerisSelector, GeoPosition,
    HorizontalPosition, Observer, PositionProvider, ProviderContext, ProviderError, Target,
    horizontal_position,
};
use grahan_frames::{angle_between_rad, norm, sub};
use grahan_riseset::{RiseSetConfig, next_rise, next_set};

use crate::eclipse_types::{
    ContactTimes, ContactVisibility, EclipseAttributes, EclipseCircumstances, EclipseEvent,
    EclipseFilter, EclipsePhase, EclipseSearchConfig, EventType, SearchDirection, SearchOutcome,
};
use crate::error::{SearchError, check_site};
use crate::lunation::{Lunation, Syzygy};
use crate::machine::{Epoch, Limits, RejectReason, Rejection, SearchMachine, Step, collect_forward, drive};
use crate::refine::{Grid, bracket_contacts, polish_contact, refine_extremum};
use crate::shadow::{EARTH_RADIUS_KM, LunarShadow, angular_radius_deg, lunar_shadow};

static MOON: Target = Target::Body(Body::Moon);
static SUN: Target = Target::Body(Body::Sun);

/// Half-width of the contact bracket around the maximum, days.
const CONTACT_WINDOW_DAYS: f64 = 2.0 / 24.0;

/// First secant step for polishing contacts, days.
const CONTACT_STEP_DAYS: f64 = 2.0 / 1440.0;

/// Rise/set searches start this long before the first contact, days.
const RISE_SET_LEAD_DAYS: f64 = 0.001;

/// Earth-shadow boundary crossed by the Moon's limb.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Boundary {
    Penumbra,
    /// Umbral first and last contact.
    UmbraOuter,
    /// Totality.
    UmbraInner,
}

impl Boundary {
    fn gap(self, shadow: &LunarShadow) -> f64 {
        match self {
            Self::Penumbra => shadow.penumbral_contact(),
            Self::UmbraOuter => shadow.partial_contact(),
            Self::UmbraInner => shadow.total_contact(),
        }
    }
}

pub(crate) struct LunarDraft {
    max_ut: f64,
    phase: EclipsePhase,
    contacts: ContactTimes,
}

pub(crate) struct LunarSearch<'a, P: ?Sized> {
    ctx: ProviderContext<'a, P>,
    /// Observer for local searches.
    site: Option<GeoPosition>,
    start_jd_ut: f64,
    direction: SearchDirection,
    filter: EclipseFilter,
    atmosphere: Atmosphere,
    ephemeris: EphemerisSelector,
}

impl<'a, P: PositionProvider + ?Sized> LunarSearch<'a, P> {
    pub fn new(
        provider: &'a P,
        site: Option<GeoPosition>,
        start_jd_ut: f64,
        direction: SearchDirection,
        filter: EclipseFilter,
        config: &EclipseSearchConfig,
    ) -> Self {
        Self {
            ctx: ProviderContext::new(provider, config.ephemeris),
            site,
            start_jd_ut,
            direction,
            filter,
            atmosphere: config.atmosphere,
            ephemeris: config.ephemeris,
        }
    }

    /// Angle between the Sun and the Earth's centre seen from the Moon,
    /// less both angular radii, degrees. Minimal at greatest eclipse.
    fn alignment_gap(&self, jd_et: f64) -> Result<f64, ProviderError> {
        let moon = self.ctx.geocentric_xyz(&MOON, jd_et)?;
        let sun = self.ctx.geocentric_xyz(&SUN, jd_et)?;
        let to_earth = [-moon[0], -moon[1], -moon[2]];
        let to_sun = sub(&sun, &moon);
        let angle = angle_between_rad(&to_earth, &to_sun).to_degrees();
        Ok(angle
            - angular_radius_deg(EARTH_RADIUS_KM, norm(&moon))
            - angular_radius_deg(SUN.radius_km(), norm(&to_sun)))
    }

    fn contacts_at(&self, boundary: Boundary, max_ut: f64) -> Result<Option<(f64, f64)>, ProviderError> {
        let f = |t: f64| -> Result<f64, ProviderError> {
            Ok(boundary.gap(&lunar_shadow(&self.ctx, t)?))
        };
        let Some((a, b)) = bracket_contacts(max_ut, CONTACT_WINDOW_DAYS, f)? else {
            tracing::trace!(?boundary, max_ut, "no contacts bracketed");
            return Ok(None);
        };
        let a = polish_contact(a, CONTACT_STEP_DAYS, 2.0, 3, f)?;
        let b = polish_contact(b, CONTACT_STEP_DAYS, 2.0, 3, f)?;
        Ok(Some((a, b)))
    }

    fn reject(&self, epoch: Epoch, reason: RejectReason, max_ut: f64) -> Step<LunarDraft> {
        Step::Rejected(epoch, Rejection::candidate(reason, max_ut, self.direction))
    }

    /// Trims the eclipse to the time the Moon is above the horizon at
    /// `site`. `None` when it is never up.
    fn trim_to_horizon(
        &self,
        site: &GeoPosition,
        draft: &mut LunarDraft,
    ) -> Result<Option<ContactVisibility>, SearchError> {
        let c = draft.contacts;
        let up = |t: Option<f64>| -> Result<bool, ProviderError> {
            match t {
                Some(t) => Ok(moon_horizontal(&self.ctx, t, site, &self.atmosphere)?
                    .apparent_altitude_deg
                    > 0.0),
                None => Ok(false),
            }
        };
        let mut visibility = ContactVisibility {
            maximum: up(Some(c.maximum))?,
            partial_begin: up(c.partial_begin)?,
            totality_begin: up(c.totality_begin)?,
            totality_end: up(c.totality_end)?,
            partial_end: up(c.partial_end)?,
            penumbral_begin: up(c.penumbral_begin)?,
            penumbral_end: up(c.penumbral_end)?,
        };
        if !visibility.any() {
            return Ok(None);
        }

        let first = c.penumbral_begin.unwrap_or(c.maximum);
        let last = c.penumbral_end.unwrap_or(c.maximum);
        let config = RiseSetConfig {
            atmosphere: self.atmosphere,
            ephemeris: self.ephemeris,
            ..RiseSetConfig::disc_bottom()
        };
        let provider = self.ctx.provider();
        let from = first - RISE_SET_LEAD_DAYS;
        let rise = next_rise(provider, &MOON, from, site, &config)?.jd_ut();
        let set = next_set(provider, &MOON, from, site, &config)?.jd_ut();
        if let Some(set) = set {
            let rises_after_end = rise.is_some_and(|r| set > r && r > last);
            if set < first || rises_after_end {
                return Ok(None);
            }
        }

        let contacts = &mut draft.contacts;
        if let Some(r) = rise.filter(|r| *r > first && *r < last) {
            let before = |t: &mut Option<f64>, seen: &mut bool| {
                if t.is_some_and(|t| t <= r) {
                    *t = None;
                    *seen = false;
                }
            };
            before(&mut contacts.penumbral_begin, &mut visibility.penumbral_begin);
            before(&mut contacts.partial_begin, &mut visibility.partial_begin);
            before(&mut contacts.totality_begin, &mut visibility.totality_begin);
            before(&mut contacts.totality_end, &mut visibility.totality_end);
            before(&mut contacts.partial_end, &mut visibility.partial_end);
            contacts.body_rise = Some(r);
            contacts.maximum = contacts.maximum.max(r);
        }
        if let Some(s) = set.filter(|s| *s > first && *s < last) {
            let after = |t: &mut Option<f64>, seen: &mut bool| {
                if t.is_some_and(|t| t >= s) {
                    *t = None;
                    *seen = false;
                }
            };
            after(&mut contacts.penumbral_end, &mut visibility.penumbral_end);
            after(&mut contacts.partial_end, &mut visibility.partial_end);
            after(&mut contacts.totality_end, &mut visibility.totality_end);
            after(&mut contacts.totality_begin, &mut visibility.totality_begin);
            after(&mut contacts.partial_begin, &mut visibility.partial_begin);
            contacts.body_set = Some(s);
            contacts.maximum = contacts.maximum.min(s);
        }
        if contacts.maximum != c.maximum {
            visibility.maximum = true;
            tracing::trace!(from = c.maximum, to = contacts.maximum, "maximum moved to horizon");
        }
        draft.max_ut = contacts.maximum;
        Ok(Some(visibility))
    }
}

impl<P: PositionProvider + ?Sized> SearchMachine for LunarSearch<'_, P> {
    type Draft = LunarDraft;

    fn direction(&self) -> SearchDirection {
        self.direction
    }

    fn seek(&mut self, epoch: Epoch) -> Result<Step<LunarDraft>, SearchError> {
        match epoch {
            Epoch::Lunation(l) if !l.may_eclipse() => {
                Ok(Step::Rejected(epoch, Rejection::skip(RejectReason::OutsideNodeWindow)))
            }
            Epoch::Lunation(l) => Ok(Step::Candidate(epoch, l.approximate_jd_et())),
            Epoch::Cursor(_) => unreachable!("lunar searches step by full moons"),
        }
    }

    fn refine(&mut self, epoch: Epoch, approx_jd_et: f64) -> Result<Step<LunarDraft>, SearchError> {
        let start = if approx_jd_et > 2_000_000.0 && approx_jd_et < 2_500_000.0 {
            0.1
        } else {
            5.0
        };
        let grid = Grid::uniform(start, 4.0, 1e-3);
        let max_et = refine_extremum(approx_jd_et, grid, |t| self.alignment_gap(t))?;
        let max_ut = self.ctx.et_to_ut(max_et);
        tracing::trace!(?epoch, max_ut, "maximum refined");
        Ok(Step::Classifying(
            epoch,
            LunarDraft {
                max_ut,
                phase: EclipsePhase::None,
                contacts: ContactTimes::at_maximum(max_ut),
            },
        ))
    }

    fn classify(&mut self, epoch: Epoch, mut draft: LunarDraft) -> Result<Step<LunarDraft>, SearchError> {
        if !self.direction.is_beyond(draft.max_ut, self.start_jd_ut) {
            return Ok(Step::Rejected(epoch, Rejection::skip(RejectReason::BeforeStart)));
        }
        let shadow = lunar_shadow(&self.ctx, draft.max_ut)?;
        if !shadow.phase.is_eclipse() {
            return Ok(self.reject(epoch, RejectReason::NoEventAtMaximum, draft.max_ut));
        }
        if !self.filter.accepts_final(shadow.phase) {
            return Ok(self.reject(epoch, RejectReason::FilteredOut, draft.max_ut));
        }
        draft.phase = shadow.phase;
        Ok(Step::SolvingContacts(epoch, draft))
    }

    fn solve_contacts(
        &mut self,
        epoch: Epoch,
        mut draft: LunarDraft,
    ) -> Result<Step<LunarDraft>, SearchError> {
        let max_ut = draft.max_ut;
        let c = &mut draft.contacts;
        if let Some((a, b)) = self.contacts_at(Boundary::Penumbra, max_ut)? {
            c.penumbral_begin = Some(a);
            c.penumbral_end = Some(b);
        }
        if matches!(draft.phase, EclipsePhase::Partial | EclipsePhase::Total) {
            if let Some((a, b)) = self.contacts_at(Boundary::UmbraOuter, max_ut)? {
                c.partial_begin = Some(a);
                c.partial_end = Some(b);
            }
        }
        if draft.phase == EclipsePhase::Total {
            if let Some((a, b)) = self.contacts_at(Boundary::UmbraInner, max_ut)? {
                c.totality_begin = Some(a);
                c.totality_end = Some(b);
            }
        }
        Ok(Step::Validating(epoch, draft))
    }

    fn validate(&mut self, epoch: Epoch, mut draft: LunarDraft) -> Result<Step<LunarDraft>, SearchError> {
        let mut visibility = None;
        if let Some(site) = self.site {
            match self.trim_to_horizon(&site, &mut draft)? {
                Some(v) => visibility = Some(v),
                None => return Ok(self.reject(epoch, RejectReason::NotVisible, draft.max_ut)),
            }
        }
        let max_ut = draft.max_ut;
        let shadow = lunar_shadow(&self.ctx, max_ut)?;
        let mut phase = draft.phase;
        if self.site.is_some() && shadow.phase.is_eclipse() && shadow.phase != phase {
            // Maximum moved to the horizon; the phase seen there must still pass.
            if !self.filter.accepts_final(shadow.phase) {
                return Ok(self.reject(epoch, RejectReason::FilteredOut, max_ut));
            }
            phase = shadow.phase;
        }
        let horizontal = match &self.site {
            Some(site) => Some(moon_horizontal(&self.ctx, max_ut, site, &self.atmosphere)?),
            None => None,
        };
        let attributes = lunar_attributes(
            &shadow,
            horizontal,
            self.ctx.provider().saros(EclipseKind::Lunar, max_ut),
        );
        Ok(Step::Accepted(EclipseEvent {
            kind: EclipseKind::Lunar,
            event_type: EventType {
                phase,
                centrality: None,
                visibility,
            },
            contacts: draft.contacts,
            attributes,
            location: None,
        }))
    }
}

fn moon_horizontal<P: PositionProvider + ?Sized>(
    ctx: &ProviderContext<'_, P>,
    jd_ut: f64,
    site: &GeoPosition,
    atmosphere: &Atmosphere,
) -> Result<HorizontalPosition, ProviderError> {
    let moon = ctx.position(
        &MOON,
        ctx.ut_to_et(jd_ut),
        CoordinateFrame::Equatorial,
        Observer::Topocentric(*site),
    )?;
    Ok(horizontal_position(
        ctx.provider(),
        jd_ut,
        site,
        atmosphere,
        &moon,
        CoordinateFrame::Equatorial,
    ))
}

fn lunar_attributes(
    shadow: &LunarShadow,
    horizontal: Option<HorizontalPosition>,
    saros: Option<grahan_core::SarosId>,
) -> EclipseAttributes {
    let eclipsed = shadow.phase.is_eclipse();
    let h = horizontal.unwrap_or(HorizontalPosition {
        azimuth_deg: 0.0,
        true_altitude_deg: 0.0,
        apparent_altitude_deg: 0.0,
    });
    EclipseAttributes {
        magnitude: if eclipsed { shadow.umbral_magnitude } else { 0.0 },
        penumbral_magnitude: if eclipsed { shadow.penumbral_magnitude } else { 0.0 },
        separation_deg: shadow.opposition_distance_deg,
        azimuth_deg: h.azimuth_deg,
        true_altitude_deg: h.true_altitude_deg,
        apparent_altitude_deg: h.apparent_altitude_deg,
        saros: if eclipsed { saros } else { None },
        ..EclipseAttributes::default()
    }
}

/// Lunar eclipse circumstances at `jd_ut`.
///
/// Magnitudes and phase are the same everywhere the Moon is up; `site`
/// adds the Moon's azimuth and altitude and the visibility of the instant.
pub fn lunar_eclipse_how<P: PositionProvider + ?Sized>(
    provider: &P,
    jd_ut: f64,
    site: Option<&GeoPosition>,
    config: &EclipseSearchConfig,
) -> Result<EclipseCircumstances, SearchError> {
    if let Some(site) = site {
        check_site(site)?;
    }
    let ctx = ProviderContext::new(provider, config.ephemeris);
    let shadow = lunar_shadow(&ctx, jd_ut)?;
    let horizontal = match site {
        Some(site) => Some(moon_horizontal(&ctx, jd_ut, site, &config.atmosphere)?),
        None => None,
    };
    let visibility = horizontal.map(|h| ContactVisibility {
        maximum: shadow.phase.is_eclipse() && h.apparent_altitude_deg > 0.0,
        ..ContactVisibility::default()
    });
    Ok(EclipseCircumstances {
        event_type: EventType {
            phase: shadow.phase,
            centrality: None,
            visibility,
        },
        attributes: lunar_attributes(&shadow, horizontal, provider.saros(EclipseKind::Lunar, jd_ut)),
    })
}

fn lunar_search<P: PositionProvider + ?Sized>(
    provider: &P,
    jd_ut: f64,
    site: Option<&GeoPosition>,
    direction: SearchDirection,
    config: &EclipseSearchConfig,
) -> Result<SearchOutcome<EclipseEvent>, SearchError> {
    if let Some(site) = site {
        check_site(site)?;
    }
    config.validate()?;
    let filter = config.filter.normalized_lunar();
    let mut machine = LunarSearch::new(provider, site.copied(), jd_ut, direction, filter, config);
    let first = Epoch::Lunation(Lunation::starting_at(jd_ut, Syzygy::FullMoon, direction));
    drive(&mut machine, first, Limits::from(config))
}

/// Next lunar eclipse with its maximum after `jd_ut`.
pub fn next_lunar_eclipse<P: PositionProvider + ?Sized>(
    provider: &P,
    jd_ut: f64,
    config: &EclipseSearchConfig,
) -> Result<SearchOutcome<EclipseEvent>, SearchError> {
    lunar_search(provider, jd_ut, None, SearchDirection::Forward, config)
}

/// Previous lunar eclipse with its maximum before `jd_ut`.
pub fn prev_lunar_eclipse<P: PositionProvider + ?Sized>(
    provider: &P,
    jd_ut: f64,
    config: &EclipseSearchConfig,
) -> Result<SearchOutcome<EclipseEvent>, SearchError> {
    lunar_search(provider, jd_ut, None, SearchDirection::Backward, config)
}

/// Next lunar eclipse with the Moon above the horizon at `site` for part
/// of it.
///
/// Contacts while the Moon is down are dropped and the Moon's rise or set
/// during the eclipse is reported; the maximum moves to that instant when
/// the true maximum is not visible.
pub fn next_lunar_eclipse_local<P: PositionProvider + ?Sized>(
    provider: &P,
    jd_ut: f64,
    site: &GeoPosition,
    config: &EclipseSearchConfig,
) -> Result<SearchOutcome<EclipseEvent>, SearchError> {
    lunar_search(provider, jd_ut, Some(site), SearchDirection::Forward, config)
}

/// Previous lunar eclipse visible from `site`.
pub fn prev_lunar_eclipse_local<P: PositionProvider + ?Sized>(
    provider: &P,
    jd_ut: f64,
    site: &GeoPosition,
    config: &EclipseSearchConfig,
) -> Result<SearchOutcome<EclipseEvent>, SearchError> {
    lunar_search(provider, jd_ut, Some(site), SearchDirection::Backward, config)
}

/// All lunar eclipses with maxima after `jd_start` and up to `jd_end`, in
/// time order. `single_attempt` is ignored.
pub fn search_lunar_eclipses<P: PositionProvider + ?Sized>(
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
        lunar_search(provider, t, None, SearchDirection::Forward, &config)
    })
}
