//! Global search: the next solar eclipse or occultation anywhere on Earth.

use grahan_core::{
    Atmosphere, Body, CoordinateFrame, EclipseKind, GeoPosition, Observer, PositionProvider,
    ProviderContext, ProviderError, Target,
};
use grahan_frames::{angle_between_rad, normalize_deg_pm180};

use crate::eclipse_types::{
    Centrality, ContactTimes, EclipseAttributes, EclipseEvent, EclipseFilter, EclipseLocation,
    EclipsePhase, EventType, SearchDirection,
};
use crate::error::SearchError;
use crate::machine::{Epoch, RejectReason, Rejection, SearchMachine, Step};
use crate::occultation::find_conjunction;
use crate::refine::{Grid, bracket_contacts, polish_contact, refine_extremum};
use crate::shadow::{
    EARTH_RADIUS_KM, MOON_RADIUS_KM, angular_radius_deg, local_appearance, shadow_cone,
    shadow_where,
};

/// Half-width of the contact bracket around the maximum, days.
const CONTACT_WINDOW_DAYS: f64 = 2.0 / 24.0;

/// First secant step for polishing contacts, days.
const CONTACT_STEP_DAYS: f64 = 10.0 / 1440.0 / 3.0;

/// Stop refining local noon once the step drops below this, days.
const NOON_PRECISION_DAYS: f64 = 0.01;

/// Working state for one candidate epoch.
pub(crate) struct GlobalDraft {
    max_ut: f64,
    phase: EclipsePhase,
    centrality: Option<Centrality>,
    location: GeoPosition,
    /// Core diameter on the surface at the maximum, km.
    core_surface_km: f64,
    contacts: ContactTimes,
    /// False when the where-geometry saw no eclipse at the maximum although
    /// the discs overlap: classification falls back to a partial eclipse
    /// with no solved contacts.
    solve: bool,
}

impl GlobalDraft {
    fn new(max_ut: f64) -> Self {
        Self {
            max_ut,
            phase: EclipsePhase::None,
            centrality: None,
            location: GeoPosition::new(0.0, 0.0, 0.0),
            core_surface_km: 0.0,
            contacts: ContactTimes::at_maximum(max_ut),
            solve: true,
        }
    }

    /// Takes phase, centrality and location from the shadow geometry at the
    /// maximum. Called once the discs are known to overlap; when the
    /// geometry still sees no eclipse the event becomes a non-central
    /// partial one with zero-length totality and unsolved contacts.
    fn adopt(&mut self, w: &EclipseLocation) {
        self.location = w.location;
        self.core_surface_km = w.core.umbra_surface_km;
        if w.phase.is_eclipse() {
            self.phase = w.phase;
            self.centrality = w.centrality;
        } else {
            self.phase = EclipsePhase::Partial;
            self.centrality = Some(Centrality::NonCentral);
            self.solve = false;
            self.contacts.totality_begin = Some(self.max_ut);
            self.contacts.totality_end = Some(self.max_ut);
        }
    }
}

/// Contact level in the shadow cone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Level {
    /// Penumbra touches the Earth.
    Partial,
    /// Umbra or antumbra touches the Earth.
    Core,
    /// Shadow axis touches the Earth.
    Axis,
}

pub(crate) struct GlobalSearch<'a, P: ?Sized> {
    ctx: ProviderContext<'a, P>,
    target: &'a Target,
    kind: EclipseKind,
    start_jd_ut: f64,
    direction: SearchDirection,
    filter: EclipseFilter,
    atmosphere: Atmosphere,
}

impl<'a, P: PositionProvider + ?Sized> GlobalSearch<'a, P> {
    pub fn new(
        ctx: ProviderContext<'a, P>,
        target: &'a Target,
        kind: EclipseKind,
        start_jd_ut: f64,
        direction: SearchDirection,
        filter: EclipseFilter,
        atmosphere: Atmosphere,
    ) -> Self {
        Self {
            ctx,
            target,
            kind,
            start_jd_ut,
            direction,
            filter,
            atmosphere,
        }
    }

    /// Geocentric separation of the centres minus the sum of the angular
    /// radii, degrees. Minimal at greatest eclipse.
    fn limb_gap(&self, jd_et: f64) -> Result<f64, ProviderError> {
        let moon = self.ctx.position(
            &Target::Body(Body::Moon),
            jd_et,
            CoordinateFrame::Equatorial,
            Observer::Geocentric,
        )?;
        let body = self
            .ctx
            .position(self.target, jd_et, CoordinateFrame::Equatorial, Observer::Geocentric)?;
        let sep = angle_between_rad(&moon.to_cartesian(), &body.to_cartesian()).to_degrees();
        Ok(sep
            - angular_radius_deg(MOON_RADIUS_KM, moon.distance_km)
            - angular_radius_deg(self.target.radius_km(), body.distance_km))
    }

    /// Positive while the given shadow level touches the Earth.
    fn boundary(&self, level: Level, jd_ut: f64) -> Result<f64, ProviderError> {
        let core = self.cone(jd_ut)?.core;
        let de = EARTH_RADIUS_KM;
        Ok(match level {
            Level::Partial => {
                core.penumbra_diameter_km / 2.0 + de * core.cos_penumbra_half_angle
                    - core.axis_distance_km
            }
            Level::Core => {
                core.umbra_diameter_km.abs() / 2.0 + de * core.cos_umbra_half_angle
                    - core.axis_distance_km
            }
            Level::Axis => de * core.cos_umbra_half_angle - core.axis_distance_km,
        })
    }

    /// Shadow cone at `jd_ut`, core kept even when the shadow misses.
    fn cone(&self, jd_ut: f64) -> Result<EclipseLocation, ProviderError> {
        let jd_et = self.ctx.ut_to_et(jd_ut);
        let moon = self.ctx.geocentric_xyz(&Target::Body(Body::Moon), jd_et)?;
        let body = self.ctx.geocentric_xyz(self.target, jd_et)?;
        let sidereal = self.ctx.sidereal_time_deg(jd_ut);
        Ok(shadow_cone(&moon, &body, self.target.radius_km(), sidereal))
    }

    fn contacts_at(&self, level: Level, max_ut: f64) -> Result<Option<(f64, f64)>, ProviderError> {
        let f = |t| self.boundary(level, t);
        let Some((a, b)) = bracket_contacts(max_ut, CONTACT_WINDOW_DAYS, f)? else {
            tracing::trace!(?level, max_ut, "no contacts bracketed");
            return Ok(None);
        };
        let a = polish_contact(a, CONTACT_STEP_DAYS, 3.0, 3, f)?;
        let b = polish_contact(b, CONTACT_STEP_DAYS, 3.0, 3, f)?;
        Ok(Some((a, b)))
    }

    /// Right ascension of the target minus that of the Moon, degrees.
    fn ra_offset(&self, jd_ut: f64) -> Result<f64, ProviderError> {
        let jd_et = self.ctx.ut_to_et(jd_ut);
        let moon = self.ctx.position(
            &Target::Body(Body::Moon),
            jd_et,
            CoordinateFrame::Equatorial,
            Observer::Geocentric,
        )?;
        let body = self
            .ctx
            .position(self.target, jd_et, CoordinateFrame::Equatorial, Observer::Geocentric)?;
        Ok(normalize_deg_pm180(body.lon_deg - moon.lon_deg))
    }

    /// Instant of equal right ascension between the begin and end contacts.
    fn local_noon(&self, max_ut: f64, begin: f64, end: f64) -> Result<Option<f64>, ProviderError> {
        let at_begin = self.ra_offset(begin)?;
        let at_end = self.ra_offset(end)?;
        if at_begin * at_end >= 0.0 {
            return Ok(None);
        }
        let mut t = max_ut;
        let mut dt = 0.1;
        let half = (end - begin) / 2.0;
        if half < dt {
            dt = half / 2.0;
        }
        while dt > NOON_PRECISION_DAYS {
            let y0 = self.ra_offset(t - dt)?;
            let y1 = self.ra_offset(t)?;
            let slope = (y1 - y0) / dt;
            if slope == 0.0 {
                break;
            }
            t -= y1 / slope;
            dt /= 3.0;
        }
        Ok(Some(t))
    }

    fn reject(&self, epoch: Epoch, reason: RejectReason, max_ut: f64) -> Step<GlobalDraft> {
        Step::Rejected(epoch, Rejection::candidate(reason, max_ut, self.direction))
    }
}

impl<P: PositionProvider + ?Sized> SearchMachine for GlobalSearch<'_, P> {
    type Draft = GlobalDraft;

    fn direction(&self) -> SearchDirection {
        self.direction
    }

    fn seek(&mut self, epoch: Epoch) -> Result<Step<GlobalDraft>, SearchError> {
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

    fn refine(&mut self, epoch: Epoch, approx_jd_et: f64) -> Result<Step<GlobalDraft>, SearchError> {
        let grid = match epoch {
            Epoch::Lunation(_) => {
                let start = if approx_jd_et > 2_000_000.0 && approx_jd_et < 2_500_000.0 {
                    1.0
                } else {
                    5.0
                };
                Grid::uniform(start, 4.0, 1e-4)
            }
            Epoch::Cursor(_) => Grid::uniform(1.0, 3.0, 1e-4),
        };
        let max_et = refine_extremum(approx_jd_et, grid, |t| self.limb_gap(t))?;
        let max_ut = self.ctx.et_to_ut(max_et);
        tracing::trace!(?epoch, max_ut, "maximum refined");
        Ok(Step::Classifying(
            epoch,
            GlobalDraft::new(max_ut),
        ))
    }

    fn classify(&mut self, epoch: Epoch, mut draft: GlobalDraft) -> Result<Step<GlobalDraft>, SearchError> {
        let max_ut = draft.max_ut;
        if !self.direction.is_beyond(max_ut, self.start_jd_ut) {
            return Ok(Step::Rejected(epoch, Rejection::skip(RejectReason::BeforeStart)));
        }
        let w = shadow_where(&self.ctx, self.target, max_ut)?;
        let how = local_appearance(&self.ctx, self.target, max_ut, &w.location, &self.atmosphere)?;
        if !how.phase.is_eclipse() {
            return Ok(self.reject(epoch, RejectReason::NoEventAtMaximum, max_ut));
        }
        draft.adopt(&w);
        if !self.filter.accepts_solar(draft.phase, draft.centrality) {
            return Ok(self.reject(epoch, RejectReason::FilteredOut, max_ut));
        }
        Ok(Step::SolvingContacts(epoch, draft))
    }

    fn solve_contacts(
        &mut self,
        epoch: Epoch,
        mut draft: GlobalDraft,
    ) -> Result<Step<GlobalDraft>, SearchError> {
        if !draft.solve {
            return Ok(Step::Validating(epoch, draft));
        }
        let max_ut = draft.max_ut;
        if let Some((a, b)) = self.contacts_at(Level::Partial, max_ut)? {
            draft.contacts.partial_begin = Some(a);
            draft.contacts.partial_end = Some(b);
        }
        if draft.phase != EclipsePhase::Partial {
            if let Some((a, b)) = self.contacts_at(Level::Core, max_ut)? {
                draft.contacts.totality_begin = Some(a);
                draft.contacts.totality_end = Some(b);
            }
        }
        if draft.centrality == Some(Centrality::Central) {
            if let Some((a, b)) = self.contacts_at(Level::Axis, max_ut)? {
                draft.contacts.center_line_begin = Some(a);
                draft.contacts.center_line_end = Some(b);
            }
        }
        Ok(Step::Validating(epoch, draft))
    }

    fn validate(&mut self, epoch: Epoch, mut draft: GlobalDraft) -> Result<Step<GlobalDraft>, SearchError> {
        let max_ut = draft.max_ut;
        if draft.phase == EclipsePhase::Total && draft.solve {
            // Hybrid when the core changes sign along the path.
            let at_max = draft.core_surface_km;
            let mut hybrid = false;
            for t in [draft.contacts.totality_begin, draft.contacts.totality_end]
                .into_iter()
                .flatten()
            {
                let core = self.cone(t)?.core.umbra_surface_km;
                if core * at_max < 0.0 {
                    hybrid = true;
                }
            }
            if hybrid {
                draft.phase = EclipsePhase::AnnularTotal;
            }
        }
        if !self.filter.accepts_final(draft.phase) {
            return Ok(self.reject(epoch, RejectReason::FilteredOut, max_ut));
        }
        if let (Some(begin), Some(end)) = (draft.contacts.partial_begin, draft.contacts.partial_end) {
            draft.contacts.local_noon = self.local_noon(max_ut, begin, end)?;
        }

        let how = local_appearance(&self.ctx, self.target, max_ut, &draft.location, &self.atmosphere)?;
        let attributes = EclipseAttributes {
            magnitude: how.magnitude,
            diameter_ratio: how.diameter_ratio,
            obscuration: how.obscuration,
            core_diameter_km: draft.core_surface_km,
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
                centrality: draft.centrality,
                visibility: None,
            },
            contacts: draft.contacts,
            attributes,
            location: Some(draft.location),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eclipse_types::ShadowCore;

    fn shadow_at(phase: EclipsePhase, centrality: Option<Centrality>) -> EclipseLocation {
        EclipseLocation {
            phase,
            centrality,
            location: GeoPosition::new(-104.1, 25.3, 0.0),
            core: ShadowCore {
                umbra_surface_km: -190.0,
                ..ShadowCore::default()
            },
        }
    }

    #[test]
    fn overlap_without_shadow_becomes_partial() {
        let mut draft = GlobalDraft::new(2_460_409.26);
        draft.adopt(&shadow_at(EclipsePhase::None, None));
        assert_eq!(draft.phase, EclipsePhase::Partial);
        assert_eq!(draft.centrality, Some(Centrality::NonCentral));
        assert!(!draft.solve);
        assert_eq!(draft.contacts.totality_begin, Some(2_460_409.26));
        assert_eq!(draft.contacts.totality_end, Some(2_460_409.26));
        assert!(draft.contacts.partial_begin.is_none());
        assert!(draft.contacts.is_ordered());
        assert!((draft.location.latitude_deg - 25.3).abs() < 1e-12);
    }

    #[test]
    fn shadow_classification_is_adopted() {
        let mut draft = GlobalDraft::new(2_460_409.26);
        draft.adopt(&shadow_at(EclipsePhase::Total, Some(Centrality::Central)));
        assert_eq!(draft.phase, EclipsePhase::Total);
        assert_eq!(draft.centrality, Some(Centrality::Central));
        assert!(draft.solve);
        assert_eq!(draft.core_surface_km, -190.0);
        assert!(draft.contacts.totality_begin.is_none());
    }
}
