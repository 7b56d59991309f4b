//! Local search: the next solar eclipse or occultation visible from a site.

use grahan_core::{
    Atmosphere, EclipseKind, EphemerisSelector, GeoPosition, PositionProvider, ProviderContext,
    ProviderError, Target,
};
use grahan_riseset::{RiseSetConfig, next_rise, next_set};

use crate::eclipse_types::{
    ContactTimes, ContactVisibility, EclipseAttributes, EclipseEvent, EclipseFilter, EclipsePhase,
    EventType, SearchDirection,
};
use crate::error::SearchError;
use crate::machine::{Epoch, RejectReason, Rejection, SearchMachine, Step};
use crate::occultation::find_conjunction;
use crate::refine::{Grid, bracket_contacts, polish_contact, refine_extremum};
use crate::shadow::{LocalAppearance, disc_phase, local_appearance, shadow_where, topocentric_discs};

/// Half-width of the bracket for second and third contact, days.
const INNER_WINDOW_DAYS: f64 = 2.0 / 1440.0;

/// Half-width of the bracket for first and fourth contact, days.
const OUTER_WINDOW_DAYS: f64 = 2.0 / 24.0;

/// First secant step for second/third contact, days.
const INNER_STEP_DAYS: f64 = 10.0 / 86_400.0;

/// First secant step for first/fourth contact, days.
const OUTER_STEP_DAYS: f64 = 10.0 / 1440.0;

/// Rise/set searches start this long before first contact, days.
const RISE_SET_LEAD_DAYS: f64 = 0.001;

/// Lunar limb profile correction applied to the Moon's radius for second
/// and third contact of solar eclipses.
pub(crate) const LIMB_PROFILE_FACTOR: f64 = 0.99916;

pub(crate) struct LocalDraft {
    max_et: f64,
    max_ut: f64,
    phase: EclipsePhase,
    contacts: ContactTimes,
}

pub(crate) struct LocalSearch<'a, P: ?Sized> {
    ctx: ProviderContext<'a, P>,
    target: &'a Target,
    kind: EclipseKind,
    site: GeoPosition,
    start_jd_ut: f64,
    direction: SearchDirection,
    filter: EclipseFilter,
    atmosphere: Atmosphere,
    ephemeris: EphemerisSelector,
    /// Scale of the Moon's radius for second/third contact.
    inner_radius_factor: f64,
}

impl<'a, P: PositionProvider + ?Sized> LocalSearch<'a, P> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        provider: &'a P,
        target: &'a Target,
        kind: EclipseKind,
        site: GeoPosition,
        start_jd_ut: f64,
        direction: SearchDirection,
        filter: EclipseFilter,
        atmosphere: Atmosphere,
        ephemeris: EphemerisSelector,
    ) -> Self {
        let inner_radius_factor = match kind {
            EclipseKind::Solar => LIMB_PROFILE_FACTOR,
            _ => 1.0,
        };
        Self {
            ctx: ProviderContext::new(provider, ephemeris),
            target,
            kind,
            site,
            start_jd_ut,
            direction,
            filter,
            atmosphere,
            ephemeris,
            inner_radius_factor,
        }
    }

    fn separation(&self, jd_et: f64) -> Result<f64, ProviderError> {
        Ok(topocentric_discs(&self.ctx, self.target, jd_et, &self.site)?.0)
    }

    /// Positive between second and third contact.
    fn inner_gap(&self, jd_et: f64) -> Result<f64, ProviderError> {
        let (d, rs, rm, _) = topocentric_discs(&self.ctx, self.target, jd_et, &self.site)?;
        Ok((rs - rm * self.inner_radius_factor).abs() - d)
    }

    /// Positive between first and fourth contact.
    fn outer_gap(&self, jd_et: f64) -> Result<f64, ProviderError> {
        let (d, rs, rm, _) = topocentric_discs(&self.ctx, self.target, jd_et, &self.site)?;
        Ok(rs + rm - d)
    }

    fn appearance(&self, jd_ut: f64) -> Result<LocalAppearance, ProviderError> {
        local_appearance(&self.ctx, self.target, jd_ut, &self.site, &self.atmosphere)
    }

    fn body_up(&self, jd_ut: Option<f64>) -> Result<bool, ProviderError> {
        match jd_ut {
            Some(t) => Ok(self.appearance(t)?.horizontal.apparent_altitude_deg > 0.0),
            None => Ok(false),
        }
    }

    fn reject(&self, epoch: Epoch, reason: RejectReason, max_ut: f64) -> Step<LocalDraft> {
        Step::Rejected(epoch, Rejection::candidate(reason, max_ut, self.direction))
    }
}

impl<P: PositionProvider + ?Sized> SearchMachine for LocalSearch<'_, P> {
    type Draft = LocalDraft;

    fn direction(&self) -> SearchDirection {
        self.direction
    }

    fn seek(&mut self, epoch: Epoch) -> Result<Step<LocalDraft>, SearchError> {
        match epoch {
            Epoch::Lunation(l) => {
                if !l.may_eclipse() {
                    return Ok(Step::Rejected(epoch, Rejection::skip(RejectReason::OutsideNodeWindow)));
                }
                Ok(Step::Candidate(epoch, l.approximate_jd_et()))
            }
            Epoch::Cursor(from) => {
                let conj = find_conjunction(&self.ctx, self.target, from, self.direction)?;
                let epoch = Epoch::Cursor(conj.jd_et);
                if !conj.close_enough() {
                    let at = self.ctx.et_to_ut(conj.jd_et);
                    return Ok(self.reject(epoch, RejectReason::LatitudeCutoff, at));
                }
                Ok(Step::Candidate(epoch, conj.jd_et))
            }
        }
    }

    fn refine(&mut self, epoch: Epoch, approx_jd_et: f64) -> Result<Step<LocalDraft>, SearchError> {
        let start = match epoch {
            Epoch::Lunation(_) if approx_jd_et < 1_900_000.0 || approx_jd_et > 2_500_000.0 => 2.0,
            _ => 0.5,
        };
        let grid = Grid {
            start,
            precision: 1e-5,
            divisor: 2.0,
            fine_divisor: 3.0,
            fine_below: 0.1,
        };
        let max_et = refine_extremum(approx_jd_et, grid, |t| self.separation(t))?;
        let max_ut = self.ctx.et_to_ut(max_et);
        Ok(Step::Classifying(
            epoch,
            LocalDraft {
                max_et,
                max_ut,
                phase: EclipsePhase::None,
                contacts: ContactTimes::at_maximum(max_ut),
            },
        ))
    }

    fn classify(&mut self, epoch: Epoch, mut draft: LocalDraft) -> Result<Step<LocalDraft>, SearchError> {
        if !self.direction.is_beyond(draft.max_ut, self.start_jd_ut) {
            return Ok(Step::Rejected(epoch, Rejection::skip(RejectReason::BeforeStart)));
        }
        let (d, rs, rm, _) = topocentric_discs(&self.ctx, self.target, draft.max_et, &self.site)?;
        if d > rs + rm {
            return Ok(self.reject(epoch, RejectReason::NoEventAtMaximum, draft.max_ut));
        }
        draft.phase = disc_phase(d, rs, rm);
        if !self.filter.accepts_final(draft.phase) {
            return Ok(self.reject(epoch, RejectReason::FilteredOut, draft.max_ut));
        }
        Ok(Step::SolvingContacts(epoch, draft))
    }

    fn solve_contacts(
        &mut self,
        epoch: Epoch,
        mut draft: LocalDraft,
    ) -> Result<Step<LocalDraft>, SearchError> {
        let max_et = draft.max_et;
        if draft.phase != EclipsePhase::Partial {
            let g = |t| self.inner_gap(t);
            if let Some((a, b)) = bracket_contacts(max_et, INNER_WINDOW_DAYS, g)? {
                let a = polish_contact(a, INNER_STEP_DAYS, 10.0, 2, g)?;
                let b = polish_contact(b, INNER_STEP_DAYS, 10.0, 2, g)?;
                draft.contacts.totality_begin = Some(self.ctx.et_to_ut(a));
                draft.contacts.totality_end = Some(self.ctx.et_to_ut(b));
            }
        }
        let g = |t| self.outer_gap(t);
        if let Some((a, b)) = bracket_contacts(max_et, OUTER_WINDOW_DAYS, g)? {
            let a = polish_contact(a, OUTER_STEP_DAYS, 10.0, 3, g)?;
            let b = polish_contact(b, OUTER_STEP_DAYS, 10.0, 3, g)?;
            draft.contacts.partial_begin = Some(self.ctx.et_to_ut(a));
            draft.contacts.partial_end = Some(self.ctx.et_to_ut(b));
        }
        Ok(Step::Validating(epoch, draft))
    }

    fn validate(&mut self, epoch: Epoch, mut draft: LocalDraft) -> Result<Step<LocalDraft>, SearchError> {
        let c = draft.contacts;
        let visibility = ContactVisibility {
            maximum: self.body_up(Some(c.maximum))?,
            partial_begin: self.body_up(c.partial_begin)?,
            totality_begin: self.body_up(c.totality_begin)?,
            totality_end: self.body_up(c.totality_end)?,
            partial_end: self.body_up(c.partial_end)?,
            penumbral_begin: false,
            penumbral_end: false,
        };
        if !visibility.any() {
            return Ok(self.reject(epoch, RejectReason::NotVisible, draft.max_ut));
        }

        let first = c.partial_begin.unwrap_or(c.maximum);
        let last = c.partial_end.unwrap_or(c.maximum);
        let config = RiseSetConfig {
            atmosphere: self.atmosphere,
            ephemeris: self.ephemeris,
            ..RiseSetConfig::disc_bottom()
        };
        let provider = self.ctx.provider();
        let from = first - RISE_SET_LEAD_DAYS;
        let rise = next_rise(provider, self.target, from, &self.site, &config)?.jd_ut();
        let set = next_set(provider, self.target, from, &self.site, &config)?.jd_ut();
        if let Some(set) = set {
            let rises_after_end = rise.is_some_and(|r| set > r && r > last);
            if set < first || rises_after_end {
                return Ok(self.reject(epoch, RejectReason::NotVisible, draft.max_ut));
            }
        }
        if let Some(r) = rise.filter(|r| *r > first && *r < last) {
            draft.contacts.body_rise = Some(r);
            if !visibility.maximum {
                draft.contacts.maximum = r;
            }
        }
        if let Some(s) = set.filter(|s| *s > first && *s < last) {
            draft.contacts.body_set = Some(s);
            if !visibility.maximum {
                draft.contacts.maximum = s;
            }
        }

        let max_ut = draft.contacts.maximum;
        let how = self.appearance(max_ut)?;
        if how.phase.is_eclipse() && how.phase != draft.phase {
            // Maximum moved to the horizon; the phase seen there must still pass.
            if !self.filter.accepts_final(how.phase) {
                return Ok(self.reject(epoch, RejectReason::FilteredOut, max_ut));
            }
            draft.phase = how.phase;
        }
        let w = shadow_where(&self.ctx, self.target, max_ut)?;
        let attributes = EclipseAttributes {
            magnitude: how.magnitude,
            diameter_ratio: how.diameter_ratio,
            obscuration: how.obscuration,
            core_diameter_km: w.core.umbra_surface_km,
            azimuth_deg: how.horizontal.azimuth_deg,
            true_altitude_deg: how.horizontal.true_altitude_deg,
            apparent_altitude_deg: how.horizontal.apparent_altitude_deg,
            separation_deg: how.separation_deg,
            penumbral_magnitude: 0.0,
            saros: self.ctx.provider().saros(self.kind, max_ut),
        };
        Ok(Step::Accepted(EclipseEvent {
            kind: self.kind,
            event_type: EventType {
                phase: draft.phase,
                centrality: w.centrality,
                visibility: Some(visibility),
            },
            contacts: draft.contacts,
            attributes,
            location: None,
        }))
    }
}
