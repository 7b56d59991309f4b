//! Rise/set/transit solver.
//!
//! Rise and set: the altitude of the requested limb minus the horizon
//! height is sampled every two hours from `t₀ − 2 h`. Local maxima and
//! minima of the samples are refined to the true culmination with
//! parabolic interpolation and inserted into the timeline, so that a body
//! grazing the horizon between two samples is not missed. Every sign
//! change in the right direction is then bisected; the first crossing
//! after `t₀` wins.
//!
//! Transit: the meridian distance is converted to time at the sidereal
//! rate and corrected four times.

use grahan_core::{
    CoordinateFrame, GeoPosition, Observer, PositionProvider, ProviderContext, Target,
    find_extremum,
};
use grahan_frames::{
    RefractionDirection, equatorial_to_horizontal, horizon_dip_deg, normalize_deg_360,
    normalize_deg_pm180, refraction_extended,
};

use crate::error::RiseSetError;
use crate::riseset_types::{HorizonEvent, HorizonHeight, Limb, RiseSetConfig, RiseSetResult};

/// Spacing of the altitude samples in days.
const SAMPLE_STEP_DAYS: f64 = 2.0 / 24.0;

/// Number of sampling intervals (samples − 1).
const SAMPLE_INTERVALS: usize = 14;

/// Culmination refinement stops below this step, in days.
const CULMINATION_PRECISION_DAYS: f64 = 0.0001;

/// Bisection steps per bracket: 2 h / 2²⁰ ≈ 7 ms.
const BISECTION_ITERATIONS: usize = 20;

/// A crossing must follow the start instant by more than this, in days,
/// so that re-querying from a returned event finds the next one.
const MIN_ADVANCE_DAYS: f64 = 0.0001;

/// Hour-angle corrections for meridian transits.
const TRANSIT_ITERATIONS: usize = 4;

/// Degrees of hour angle per day, rounded as a fixed divisor.
const TRANSIT_RATE_DEG_PER_DAY: f64 = 361.0;

/// Next occurrence of `event` for `target` seen from `site` after `jd_ut`.
pub fn next_event<P: PositionProvider + ?Sized>(
    provider: &P,
    target: &Target,
    jd_ut: f64,
    site: &GeoPosition,
    event: HorizonEvent,
    config: &RiseSetConfig,
) -> Result<RiseSetResult, RiseSetError> {
    let sky = LimbAltitude::new(provider, target, site, config)?;
    match event {
        HorizonEvent::Rise | HorizonEvent::Set => sky.next_crossing(jd_ut, event),
        HorizonEvent::UpperTransit | HorizonEvent::LowerTransit => {
            let t = sky.next_transit(jd_ut, event == HorizonEvent::LowerTransit)?;
            Ok(RiseSetResult::Event { jd_ut: t, event })
        }
    }
}

/// Next rise of `target` after `jd_ut`.
pub fn next_rise<P: PositionProvider + ?Sized>(
    provider: &P,
    target: &Target,
    jd_ut: f64,
    site: &GeoPosition,
    config: &RiseSetConfig,
) -> Result<RiseSetResult, RiseSetError> {
    LimbAltitude::new(provider, target, site, config)?.next_crossing(jd_ut, HorizonEvent::Rise)
}

/// Next set of `target` after `jd_ut`.
pub fn next_set<P: PositionProvider + ?Sized>(
    provider: &P,
    target: &Target,
    jd_ut: f64,
    site: &GeoPosition,
    config: &RiseSetConfig,
) -> Result<RiseSetResult, RiseSetError> {
    LimbAltitude::new(provider, target, site, config)?.next_crossing(jd_ut, HorizonEvent::Set)
}

/// Next upper meridian transit of `target` after `jd_ut`, as JD UT.
pub fn next_transit<P: PositionProvider + ?Sized>(
    provider: &P,
    target: &Target,
    jd_ut: f64,
    site: &GeoPosition,
    config: &RiseSetConfig,
) -> Result<f64, RiseSetError> {
    LimbAltitude::new(provider, target, site, config)?.next_transit(jd_ut, false)
}

#[derive(Debug, Clone, Copy)]
struct Sample {
    jd_ut: f64,
    height: f64,
}

struct LimbAltitude<'a, P: ?Sized> {
    ctx: ProviderContext<'a, P>,
    target: &'a Target,
    site: &'a GeoPosition,
    config: &'a RiseSetConfig,
}

impl<'a, P: PositionProvider + ?Sized> LimbAltitude<'a, P> {
    fn new(
        provider: &'a P,
        target: &'a Target,
        site: &'a GeoPosition,
        config: &'a RiseSetConfig,
    ) -> Result<Self, RiseSetError> {
        if !site.height_in_range() {
            return Err(RiseSetError::InvalidLocation {
                height_m: site.height_m,
            });
        }
        config.validate(target)?;
        Ok(Self {
            ctx: ProviderContext::new(provider, config.ephemeris),
            target,
            site,
            config,
        })
    }

    fn horizon_deg(&self) -> f64 {
        if let Some(tw) = self.config.twilight {
            return -tw.depression_deg();
        }
        match self.config.horizon {
            HorizonHeight::Degrees(h) => h,
            HorizonHeight::Dip => {
                let atm = &self.config.atmosphere;
                horizon_dip_deg(
                    self.site.height_m,
                    atm.pressure_at(self.site.height_m),
                    atm.temperature_c,
                    atm.lapse_rate,
                )
            }
        }
    }

    /// Right ascension, declination (deg) and distance (km) seen from the site.
    fn topocentric(&self, jd_ut: f64) -> Result<(f64, f64, f64), RiseSetError> {
        let p = self.ctx.position(
            self.target,
            self.ctx.ut_to_et(jd_ut),
            CoordinateFrame::Equatorial,
            Observer::Topocentric(*self.site),
        )?;
        Ok((p.lon_deg, p.lat_deg, p.distance_km))
    }

    fn local_sidereal_deg(&self, jd_ut: f64) -> f64 {
        self.site.local_sidereal_deg(self.ctx.sidereal_time_deg(jd_ut))
    }

    /// Apparent altitude of the limb above the horizon, degrees.
    fn height(&self, jd_ut: f64) -> Result<f64, RiseSetError> {
        let (ra, dec, distance) = self.topocentric(jd_ut)?;
        let (_, alt) =
            equatorial_to_horizontal(ra, dec, self.local_sidereal_deg(jd_ut), self.site.latitude_deg);

        let radius_km = self.target.radius_km();
        let disc_distance = if self.config.fixed_disc_size {
            self.target.mean_distance_km().unwrap_or(distance)
        } else {
            distance
        };
        let semidiameter = if radius_km > 0.0 && disc_distance > radius_km {
            (radius_km / disc_distance).asin().to_degrees()
        } else {
            0.0
        };
        let limb_alt = match self.config.effective_limb() {
            Limb::Upper => alt + semidiameter,
            Limb::Center => alt,
            Limb::Lower => alt - semidiameter,
        };

        let observed = if self.config.effective_refraction() {
            let atm = &self.config.atmosphere;
            refraction_extended(
                limb_alt,
                self.site.height_m,
                atm.pressure_at(self.site.height_m),
                atm.temperature_c,
                atm.lapse_rate,
                RefractionDirection::TrueToApparent,
            )
            .apparent_altitude_deg
        } else {
            limb_alt
        };
        Ok(observed - self.horizon_deg())
    }

    fn sample(&self, jd_ut: f64) -> Result<Sample, RiseSetError> {
        Ok(Sample {
            jd_ut,
            height: self.height(jd_ut)?,
        })
    }

    fn culmination(&self, around: f64) -> Result<Sample, RiseSetError> {
        let mut t = around;
        let mut dt = SAMPLE_STEP_DAYS;
        while dt > CULMINATION_PRECISION_DAYS {
            let v = find_extremum(self.height(t - dt)?, self.height(t)?, self.height(t + dt)?, dt);
            t += v.offset.clamp(-dt, dt);
            dt /= 3.0;
        }
        self.sample(t)
    }

    fn next_crossing(&self, jd_ut: f64, event: HorizonEvent) -> Result<RiseSetResult, RiseSetError> {
        let t0 = jd_ut - SAMPLE_STEP_DAYS;
        let mut samples = Vec::with_capacity(2 * SAMPLE_INTERVALS);
        for j in 0..=SAMPLE_INTERVALS {
            samples.push(self.sample(t0 + j as f64 * SAMPLE_STEP_DAYS)?);
        }

        let mut culminations = Vec::new();
        for w in samples.windows(3) {
            let is_max = w[1].height > w[0].height && w[1].height > w[2].height;
            let is_min = w[1].height < w[0].height && w[1].height < w[2].height;
            if is_max || is_min {
                culminations.push(self.culmination(w[1].jd_ut)?);
            }
        }
        samples.extend(culminations);
        samples.sort_by(|a, b| a.jd_ut.total_cmp(&b.jd_ut));

        let rising = event == HorizonEvent::Rise;
        for pair in samples.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let crosses = if rising {
                a.height < 0.0 && b.height >= 0.0
            } else {
                a.height >= 0.0 && b.height < 0.0
            };
            if !crosses || b.jd_ut <= jd_ut + MIN_ADVANCE_DAYS {
                continue;
            }
            let t = self.bisect(a, b)?;
            if t > jd_ut + MIN_ADVANCE_DAYS {
                tracing::trace!(jd_ut = t, ?event, target = %self.target, "horizon crossing");
                return Ok(RiseSetResult::Event { jd_ut: t, event });
            }
        }

        tracing::debug!(start = jd_ut, ?event, target = %self.target, "no horizon crossing in window");
        Ok(RiseSetResult::NotFound)
    }

    fn bisect(&self, mut lo: Sample, mut hi: Sample) -> Result<f64, RiseSetError> {
        for _ in 0..BISECTION_ITERATIONS {
            let mid = self.sample((lo.jd_ut + hi.jd_ut) / 2.0)?;
            if (mid.height < 0.0) == (lo.height < 0.0) {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        Ok((lo.jd_ut + hi.jd_ut) / 2.0)
    }

    /// Meridian distance (target RA minus local sidereal time) in degrees.
    fn meridian_distance(&self, jd_ut: f64, lower: bool) -> Result<f64, RiseSetError> {
        let (ra, _, _) = self.topocentric(jd_ut)?;
        let offset = if lower { 180.0 } else { 0.0 };
        Ok(ra - self.local_sidereal_deg(jd_ut) + offset)
    }

    fn next_transit(&self, jd_ut: f64, lower: bool) -> Result<f64, RiseSetError> {
        let mut t = jd_ut + normalize_deg_360(self.meridian_distance(jd_ut, lower)?) / TRANSIT_RATE_DEG_PER_DAY;
        for _ in 0..TRANSIT_ITERATIONS {
            t += normalize_deg_pm180(self.meridian_distance(t, lower)?) / TRANSIT_RATE_DEG_PER_DAY;
        }
        if t <= jd_ut {
            // Transit fell just before the start; take the next one.
            t += 360.0 / TRANSIT_RATE_DEG_PER_DAY;
            for _ in 0..TRANSIT_ITERATIONS {
                t += normalize_deg_pm180(self.meridian_distance(t, lower)?) / TRANSIT_RATE_DEG_PER_DAY;
            }
        }
        Ok(t)
    }
}
