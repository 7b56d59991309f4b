//! Shadow geometry: where the Moon's shadow falls, how an eclipse looks
//! from a site, and the Earth's shadow at the Moon.
//!
//! The solar-type geometry works in the Moon's shadow cone. Positions are
//! geocentric equatorial Cartesian km. The Earth's oblateness is handled by
//! stretching the polar axis so the surface becomes a sphere of equatorial
//! radius, with one correction pass at the latitude of the first solution.

use grahan_core::{
    Atmosphere, Body, CoordinateFrame, EclipseKind, GeoPosition, HorizontalPosition, Observer,
    Position, PositionProvider, ProviderContext, ProviderError, Target, horizontal_position,
};
use grahan_frames::{angle_between_rad, dot, norm, normalize_deg_pm180, sub};

use crate::eclipse_types::{
    Centrality, ContactVisibility, EclipseAttributes, EclipseCircumstances, EclipseLocation,
    EclipsePhase, EventType, ShadowCore,
};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Earth equatorial radius in km.
pub const EARTH_RADIUS_KM: f64 = 6378.140;

/// Earth flattening (WGS84).
const EARTH_FLATTENING: f64 = 1.0 / 298.257_223_563;

/// Moon mean radius in km.
pub const MOON_RADIUS_KM: f64 = Body::Moon.diameter_km() / 2.0;

/// Enlargement of the Earth's shadow by the atmosphere.
const LUNAR_SHADOW_ENLARGEMENT: f64 = 1.0 / 50.0;

/// Empirical scale of the umbra diameter at the Moon.
const UMBRA_CALIBRATION: f64 = 0.99405;

/// Empirical scale of the penumbra diameter at the Moon.
const PENUMBRA_CALIBRATION: f64 = 0.98813;

// ---------------------------------------------------------------------------
// Moon's shadow on the Earth
// ---------------------------------------------------------------------------

/// Full where-geometry at `jd_ut`, including the nearest point when the
/// shadow misses the Earth.
pub(crate) fn shadow_where<P: PositionProvider + ?Sized>(
    ctx: &ProviderContext<'_, P>,
    target: &Target,
    jd_ut: f64,
) -> Result<EclipseLocation, ProviderError> {
    let jd_et = ctx.ut_to_et(jd_ut);
    let moon_true = ctx.geocentric_xyz(&Target::Body(Body::Moon), jd_et)?;
    let body_true = ctx.geocentric_xyz(target, jd_et)?;
    let sidereal = ctx.sidereal_time_deg(jd_ut);
    Ok(locate(&moon_true, &body_true, target.radius_km(), sidereal))
}

/// [`shadow_cone`] with the core zeroed when the shadow misses the Earth.
pub(crate) fn locate(
    moon_true: &[f64; 3],
    body_true: &[f64; 3],
    body_radius_km: f64,
    sidereal_deg: f64,
) -> EclipseLocation {
    let mut w = shadow_cone(moon_true, body_true, body_radius_km, sidereal_deg);
    if !w.phase.is_eclipse() {
        w.core = ShadowCore::default();
    }
    w
}

/// Shadow-cone geometry from geocentric positions (km) of the Moon and the
/// occulted body.
pub(crate) fn shadow_cone(
    moon_true: &[f64; 3],
    body_true: &[f64; 3],
    body_radius_km: f64,
    sidereal_deg: f64,
) -> EclipseLocation {
    let de = EARTH_RADIUS_KM;
    let drad = body_radius_km;
    let dsm_true = norm(&sub(moon_true, body_true));
    let axis = 1.0 - EARTH_FLATTENING;
    let (pass, polar_scale) = Pass::corrected(moon_true, body_true, drad);
    let Cone {
        r0,
        cosf1,
        cosf2,
        d0,
        big_d0,
    } = pass.cone(drad);
    let dmoon = 2.0 * MOON_RADIUS_KM;

    // Back to true (unstretched) coordinates.
    let xs = pass.surface;
    let surface = [xs[0], xs[1], xs[2] * polar_scale];
    let to_moon = sub(moon_true, &surface);
    let s = norm(&to_moon);
    let core_surface = (s / dsm_true * (2.0 * drad - dmoon) - dmoon) * cosf1;
    let penumbra_surface = (s / dsm_true * (2.0 * drad + dmoon) + dmoon) * cosf2;

    let rxy = surface[0].hypot(surface[1]);
    let geocentric_lat = surface[2].atan2(rxy);
    let geodetic_lat = (geocentric_lat.tan() / (axis * axis)).atan();
    let location = GeoPosition::new(
        normalize_deg_pm180(surface[1].atan2(surface[0]).to_degrees() - sidereal_deg),
        geodetic_lat.to_degrees(),
        0.0,
    );

    let (phase, centrality) = if de * cosf1 >= r0 {
        (core_phase(core_surface), Some(Centrality::Central))
    } else if r0 <= de * cosf1 + d0.abs() / 2.0 {
        (core_phase(core_surface), Some(Centrality::NonCentral))
    } else if r0 <= de * cosf2 + big_d0 / 2.0 {
        (EclipsePhase::Partial, Some(Centrality::NonCentral))
    } else {
        (EclipsePhase::None, None)
    };

    EclipseLocation {
        phase,
        centrality,
        location,
        core: ShadowCore {
            axis_distance_km: r0,
            umbra_diameter_km: d0,
            penumbra_diameter_km: big_d0,
            cos_umbra_half_angle: cosf1,
            cos_penumbra_half_angle: cosf2,
            umbra_surface_km: core_surface,
            penumbra_surface_km: penumbra_surface,
        },
    }
}

fn core_phase(core_surface_km: f64) -> EclipsePhase {
    if core_surface_km > 0.0 {
        EclipsePhase::Annular
    } else {
        EclipsePhase::Total
    }
}

struct Cone {
    r0: f64,
    cosf1: f64,
    cosf2: f64,
    d0: f64,
    big_d0: f64,
}

/// One evaluation of the shadow cone in polar-stretched coordinates.
struct Pass {
    dsm: f64,
    cosf1: f64,
    cosf2: f64,
    s0: f64,
    r0: f64,
    /// Surface point nearest the shadow axis (stretched coordinates).
    surface: [f64; 3],
}

impl Pass {
    fn compute(moon_true: &[f64; 3], body_true: &[f64; 3], polar_scale: f64, drad: f64) -> Self {
        let rm = [moon_true[0], moon_true[1], moon_true[2] / polar_scale];
        let rs = [body_true[0], body_true[1], body_true[2] / polar_scale];
        let mut e = sub(&rm, &rs);
        let dsm = norm(&e);
        for c in &mut e {
            *c /= dsm;
        }
        let sinf1 = (drad - MOON_RADIUS_KM) / dsm;
        let cosf1 = (1.0 - sinf1 * sinf1).sqrt();
        let sinf2 = (drad + MOON_RADIUS_KM) / dsm;
        let cosf2 = (1.0 - sinf2 * sinf2).sqrt();
        let dm2 = dot(&rm, &rm);
        let s0 = -dot(&rm, &e);
        let r0 = (dm2 - s0 * s0).max(0.0).sqrt();

        // Intersection of the axis with the sphere, or the point of closest
        // approach projected onto it.
        let de = EARTH_RADIUS_KM;
        let d = (s0 * s0 + de * de - dm2).max(0.0).sqrt();
        let s = s0 - d;
        let mut surface = [rm[0] + s * e[0], rm[1] + s * e[1], rm[2] + s * e[2]];
        if r0 > de {
            let len = norm(&surface);
            for c in &mut surface {
                *c *= de / len;
            }
        }
        Self {
            dsm,
            cosf1,
            cosf2,
            s0,
            r0,
            surface,
        }
    }

    /// Second pass with the polar stretch corrected at the latitude found
    /// by the first. Returns the pass and the stretch used.
    fn corrected(moon_true: &[f64; 3], body_true: &[f64; 3], drad: f64) -> (Self, f64) {
        let axis = 1.0 - EARTH_FLATTENING;
        let first = Self::compute(moon_true, body_true, axis, drad);
        let lat = first.surface_geocentric_lat_rad();
        let cc = 1.0 / (lat.cos().powi(2) + axis * axis * lat.sin().powi(2)).sqrt();
        let polar_scale = axis * axis * cc;
        (Self::compute(moon_true, body_true, polar_scale, drad), polar_scale)
    }

    /// Umbra/antumbra (`d0`) and penumbra (`big_d0`) diameters on the
    /// fundamental plane.
    fn cone(&self, drad: f64) -> Cone {
        let dmoon = 2.0 * MOON_RADIUS_KM;
        Cone {
            r0: self.r0,
            cosf1: self.cosf1,
            cosf2: self.cosf2,
            d0: (self.s0 / self.dsm * (2.0 * drad - dmoon) - dmoon) / self.cosf1,
            big_d0: (self.s0 / self.dsm * (2.0 * drad + dmoon) + dmoon) / self.cosf2,
        }
    }

    fn surface_geocentric_lat_rad(&self) -> f64 {
        let [x, y, z] = self.surface;
        z.atan2(x.hypot(y))
    }
}

// ---------------------------------------------------------------------------
// Appearance from a site
// ---------------------------------------------------------------------------

/// How a solar eclipse or occultation looks from one site at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct LocalAppearance {
    pub phase: EclipsePhase,
    pub magnitude: f64,
    pub diameter_ratio: f64,
    pub obscuration: f64,
    pub separation_deg: f64,
    /// Apparent angular radii in degrees.
    pub body_radius_deg: f64,
    pub moon_radius_deg: f64,
    pub horizontal: HorizontalPosition,
}

impl LocalAppearance {
    /// Eclipse in progress with the occulted body above the horizon.
    pub fn is_visible(&self) -> bool {
        self.phase.is_eclipse() && self.horizontal.apparent_altitude_deg > 0.0
    }
}

/// Topocentric separation and angular radii of the Moon and `target` at
/// `jd_et`, in degrees: `(separation, body_radius, moon_radius)`.
pub(crate) fn topocentric_discs<P: PositionProvider + ?Sized>(
    ctx: &ProviderContext<'_, P>,
    target: &Target,
    jd_et: f64,
    site: &GeoPosition,
) -> Result<(f64, f64, f64, Position), ProviderError> {
    let body = ctx.position(target, jd_et, CoordinateFrame::Equatorial, Observer::Topocentric(*site))?;
    let moon = ctx.position(
        &Target::Body(Body::Moon),
        jd_et,
        CoordinateFrame::Equatorial,
        Observer::Topocentric(*site),
    )?;
    let separation = angle_between_rad(&body.to_cartesian(), &moon.to_cartesian()).to_degrees();
    Ok((
        separation,
        angular_radius_deg(target.radius_km(), body.distance_km),
        angular_radius_deg(MOON_RADIUS_KM, moon.distance_km),
        body,
    ))
}

pub(crate) fn local_appearance<P: PositionProvider + ?Sized>(
    ctx: &ProviderContext<'_, P>,
    target: &Target,
    jd_ut: f64,
    site: &GeoPosition,
    atmosphere: &Atmosphere,
) -> Result<LocalAppearance, ProviderError> {
    let jd_et = ctx.ut_to_et(jd_ut);
    let (dctr, rs, rm, body) = topocentric_discs(ctx, target, jd_et, site)?;
    let phase = disc_phase(dctr, rs, rm);
    let (magnitude, diameter_ratio, obscuration) = if !phase.is_eclipse() {
        (0.0, 0.0, 0.0)
    } else if rs > 0.0 {
        ((rs + rm - dctr) / (2.0 * rs), rm / rs, disc_obscuration(dctr, rs, rm))
    } else {
        (1.0, 0.0, 1.0)
    };
    let horizontal = horizontal_position(
        ctx.provider(),
        jd_ut,
        site,
        atmosphere,
        &body,
        CoordinateFrame::Equatorial,
    );
    Ok(LocalAppearance {
        phase,
        magnitude,
        diameter_ratio,
        obscuration,
        separation_deg: dctr,
        body_radius_deg: rs,
        moon_radius_deg: rm,
        horizontal,
    })
}

/// Circumstances at a site combined with the global centrality and core
/// diameter at the same instant.
pub(crate) fn circumstances<P: PositionProvider + ?Sized>(
    ctx: &ProviderContext<'_, P>,
    target: &Target,
    kind: EclipseKind,
    jd_ut: f64,
    site: &GeoPosition,
    atmosphere: &Atmosphere,
) -> Result<EclipseCircumstances, ProviderError> {
    let how = local_appearance(ctx, target, jd_ut, site, atmosphere)?;
    let w = shadow_where(ctx, target, jd_ut)?;
    let saros = if how.phase.is_eclipse() {
        ctx.provider().saros(kind, jd_ut)
    } else {
        None
    };
    Ok(EclipseCircumstances {
        event_type: EventType {
            phase: how.phase,
            centrality: w.centrality,
            visibility: Some(ContactVisibility {
                maximum: how.is_visible(),
                ..ContactVisibility::default()
            }),
        },
        attributes: EclipseAttributes {
            magnitude: how.magnitude,
            diameter_ratio: how.diameter_ratio,
            obscuration: how.obscuration,
            core_diameter_km: w.core.umbra_surface_km,
            azimuth_deg: how.horizontal.azimuth_deg,
            true_altitude_deg: how.horizontal.true_altitude_deg,
            apparent_altitude_deg: how.horizontal.apparent_altitude_deg,
            separation_deg: how.separation_deg,
            penumbral_magnitude: 0.0,
            saros,
        },
    })
}

/// Phase from centre separation and angular radii (any consistent unit).
pub(crate) fn disc_phase(separation: f64, body_radius: f64, moon_radius: f64) -> EclipsePhase {
    if separation < body_radius - moon_radius {
        EclipsePhase::Annular
    } else if separation < (body_radius - moon_radius).abs() {
        EclipsePhase::Total
    } else if separation < body_radius + moon_radius {
        EclipsePhase::Partial
    } else {
        EclipsePhase::None
    }
}

pub(crate) fn angular_radius_deg(radius_km: f64, distance_km: f64) -> f64 {
    if radius_km <= 0.0 || distance_km <= radius_km {
        return 0.0;
    }
    (radius_km / distance_km).asin().to_degrees()
}

/// Fraction of the occulted disc (radius `rs`) covered by the occulting
/// disc (radius `rm`) at centre separation `d`, all in one angular unit.
///
/// Zero at external tangency, `min(rs, rm)² / rs²` once one disc lies
/// inside the other, so a total eclipse gives 1.
pub fn disc_obscuration(d: f64, rs: f64, rm: f64) -> f64 {
    if rs <= 0.0 {
        return if d < rm { 1.0 } else { 0.0 };
    }
    if d >= rs + rm {
        return 0.0;
    }
    if d <= (rs - rm).abs() {
        let r = rs.min(rm);
        return (r * r / (rs * rs)).min(1.0);
    }
    let rs2 = rs * rs;
    let rm2 = rm * rm;
    let a1 = ((d * d + rs2 - rm2) / (2.0 * d * rs)).clamp(-1.0, 1.0).acos();
    let a2 = ((d * d + rm2 - rs2) / (2.0 * d * rm)).clamp(-1.0, 1.0).acos();
    let lens = rs2 * (a1 - a1.sin() * a1.cos()) + rm2 * (a2 - a2.sin() * a2.cos());
    (lens / (std::f64::consts::PI * rs2)).clamp(0.0, 1.0)
}

// ---------------------------------------------------------------------------
// Earth's shadow at the Moon
// ---------------------------------------------------------------------------

/// The Earth's shadow at the Moon's distance, km.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct LunarShadow {
    pub phase: EclipsePhase,
    /// Distance of the Moon's centre from the shadow axis.
    pub axis_distance_km: f64,
    pub umbra_diameter_km: f64,
    pub penumbra_diameter_km: f64,
    pub cos_umbra_half_angle: f64,
    pub cos_penumbra_half_angle: f64,
    pub umbral_magnitude: f64,
    pub penumbral_magnitude: f64,
    /// Angular distance of the Moon from the anti-solar point, degrees.
    pub opposition_distance_deg: f64,
    pub moon: Position,
}

impl LunarShadow {
    /// Moon's leading limb enters/trailing limb leaves the penumbra.
    pub fn penumbral_contact(&self) -> f64 {
        self.penumbra_diameter_km / 2.0 + MOON_RADIUS_KM / self.cos_penumbra_half_angle
            - self.axis_distance_km
    }

    /// Umbral first/last contact (U1/U4).
    pub fn partial_contact(&self) -> f64 {
        self.umbra_diameter_km / 2.0 + MOON_RADIUS_KM / self.cos_umbra_half_angle
            - self.axis_distance_km
    }

    /// Totality begins/ends (U2/U3).
    pub fn total_contact(&self) -> f64 {
        self.umbra_diameter_km / 2.0 - MOON_RADIUS_KM / self.cos_umbra_half_angle
            - self.axis_distance_km
    }
}

pub(crate) fn lunar_shadow<P: PositionProvider + ?Sized>(
    ctx: &ProviderContext<'_, P>,
    jd_ut: f64,
) -> Result<LunarShadow, ProviderError> {
    let jd_et = ctx.ut_to_et(jd_ut);
    let moon = ctx.position(
        &Target::Body(Body::Moon),
        jd_et,
        CoordinateFrame::Equatorial,
        Observer::Geocentric,
    )?;
    let sun = ctx.geocentric_xyz(&Target::Body(Body::Sun), jd_et)?;
    Ok(earth_shadow(&moon, &sun))
}

/// Earth's shadow geometry from the geocentric Moon and Sun.
pub(crate) fn earth_shadow(moon: &Position, sun: &[f64; 3]) -> LunarShadow {
    let rm = moon.to_cartesian();
    let dsm = norm(sun);
    // Unit vector along the shadow axis, from the Sun through the Earth.
    let e = [-sun[0] / dsm, -sun[1] / dsm, -sun[2] / dsm];
    let sun_radius = Body::Sun.diameter_km() / 2.0;
    let dearth = 2.0 * EARTH_RADIUS_KM;
    let dsun = Body::Sun.diameter_km();

    let sinf1 = (sun_radius - EARTH_RADIUS_KM) / dsm;
    let cosf1 = (1.0 - sinf1 * sinf1).sqrt();
    let sinf2 = (sun_radius + EARTH_RADIUS_KM) / dsm;
    let cosf2 = (1.0 - sinf2 * sinf2).sqrt();

    let s0 = dot(&rm, &e);
    let r0 = (dot(&rm, &rm) - s0 * s0).max(0.0).sqrt();
    let enlarge = 1.0 + LUNAR_SHADOW_ENLARGEMENT;
    // Both diameters are divided by their cone cosine twice.
    let d0 = (s0 / dsm * (dsun - dearth) - dearth).abs() * enlarge / cosf1 / cosf1
        * UMBRA_CALIBRATION;
    let big_d0 =
        (s0 / dsm * (dsun + dearth) + dearth) * enlarge / cosf2 / cosf2 * PENUMBRA_CALIBRATION;

    let rmoon = MOON_RADIUS_KM;
    let phase = if d0 / 2.0 >= r0 + rmoon / cosf1 {
        EclipsePhase::Total
    } else if d0 / 2.0 >= r0 - rmoon / cosf1 {
        EclipsePhase::Partial
    } else if big_d0 / 2.0 >= r0 - rmoon / cosf2 {
        EclipsePhase::Penumbral
    } else {
        EclipsePhase::None
    };
    let dmoon = 2.0 * rmoon;
    let opposition_distance_deg = 180.0 - angle_between_rad(&rm, sun).to_degrees();
    LunarShadow {
        phase,
        axis_distance_km: r0,
        umbra_diameter_km: d0,
        penumbra_diameter_km: big_d0,
        cos_umbra_half_angle: cosf1,
        cos_penumbra_half_angle: cosf2,
        umbral_magnitude: (d0 / 2.0 - r0 + rmoon) / dmoon,
        penumbral_magnitude: (big_d0 / 2.0 - r0 + rmoon) / dmoon,
        opposition_distance_deg,
        moon: *moon,
    }
}
