//! The analytic [`PositionProvider`].

use grahan_core::{
    Body, CoordinateFrame, J2000_JD, Observer, Position, PositionProvider, PositionRequest,
    ProviderError, Target, gmst_deg, mean_obliquity_deg,
};
use grahan_frames::{
    cartesian_to_spherical, ecliptic_to_equatorial, equatorial_to_ecliptic, normalize_deg_360,
    rotation::rotate_x, sub,
};

use crate::delta_t::delta_t_seconds;
use crate::moon::moon_ecliptic;
use crate::nutation_deg;
use crate::sun::sun_ecliptic;

/// Distance assigned to stars, in km (about ten light years).
pub const STAR_DISTANCE_KM: f64 = 9.46e13;

/// General precession in longitude, degrees per Julian year.
const PRECESSION_DEG_PER_YEAR: f64 = 50.29 / 3600.0;

const EARTH_EQUATORIAL_RADIUS_KM: f64 = 6378.140;
const EARTH_FLATTENING: f64 = 1.0 / 298.257;

/// A fixed star in ecliptic coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct StarEntry {
    pub name: String,
    pub lon_deg: f64,
    pub lat_deg: f64,
    /// `true` for J2000 mean coordinates that precess; `false` for
    /// coordinates already of date.
    pub precess: bool,
}

impl StarEntry {
    /// Star with mean ecliptic coordinates of J2000.
    pub fn j2000(name: &str, lon_deg: f64, lat_deg: f64) -> Self {
        Self {
            name: name.to_owned(),
            lon_deg,
            lat_deg,
            precess: true,
        }
    }

    /// Star with fixed apparent ecliptic coordinates of date.
    pub fn of_date(name: &str, lon_deg: f64, lat_deg: f64) -> Self {
        Self {
            name: name.to_owned(),
            lon_deg,
            lat_deg,
            precess: false,
        }
    }
}

/// Closed-form Sun/Moon/star ephemeris.
#[derive(Debug, Clone, Default)]
pub struct AnalyticEphemeris {
    stars: Vec<StarEntry>,
    coverage: Option<(f64, f64)>,
}

impl AnalyticEphemeris {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_star(mut self, star: StarEntry) -> Self {
        self.stars.push(star);
        self
    }

    /// Restrict the valid ET range; requests outside fail with `OutOfRange`.
    pub fn with_coverage(mut self, first_jd_et: f64, last_jd_et: f64) -> Self {
        self.coverage = Some((first_jd_et, last_jd_et));
        self
    }

    /// True obliquity of date in degrees.
    pub fn true_obliquity_deg(&self, jd_et: f64) -> f64 {
        mean_obliquity_deg(jd_et) + nutation_deg(jd_et).1
    }

    fn geocentric_ecliptic(&self, target: &Target, jd_et: f64) -> Result<Position, ProviderError> {
        match target {
            Target::Body(Body::Sun) => Ok(sun_ecliptic(jd_et)),
            Target::Body(Body::Moon) => Ok(moon_ecliptic(jd_et)),
            Target::Star(name) => {
                let star = self
                    .stars
                    .iter()
                    .find(|s| s.name == *name)
                    .ok_or_else(|| ProviderError::UnsupportedTarget(target.to_string()))?;
                let lon = if star.precess {
                    let years = (jd_et - J2000_JD) / 365.25;
                    star.lon_deg + PRECESSION_DEG_PER_YEAR * years + nutation_deg(jd_et).0
                } else {
                    star.lon_deg
                };
                Ok(Position::new(normalize_deg_360(lon), star.lat_deg, STAR_DISTANCE_KM))
            }
            _ => Err(ProviderError::UnsupportedTarget(target.to_string())),
        }
    }

    /// Geocentric equatorial position of an observer in km.
    fn observer_xyz(&self, jd_et: f64, longitude_deg: f64, latitude_deg: f64, height_m: f64) -> [f64; 3] {
        let jd_ut = jd_et - delta_t_seconds(jd_et) / 86_400.0;
        let lst = (self.sidereal_time_deg(jd_ut) + longitude_deg).to_radians();
        let phi = latitude_deg.to_radians();
        let u = ((1.0 - EARTH_FLATTENING) * phi.tan()).atan();
        let h = height_m / 1000.0 / EARTH_EQUATORIAL_RADIUS_KM;
        let rho_sin = (1.0 - EARTH_FLATTENING) * u.sin() + h * phi.sin();
        let rho_cos = u.cos() + h * phi.cos();
        [
            EARTH_EQUATORIAL_RADIUS_KM * rho_cos * lst.cos(),
            EARTH_EQUATORIAL_RADIUS_KM * rho_cos * lst.sin(),
            EARTH_EQUATORIAL_RADIUS_KM * rho_sin,
        ]
    }
}

impl PositionProvider for AnalyticEphemeris {
    fn position(&self, request: &PositionRequest<'_>) -> Result<Position, ProviderError> {
        let jd_et = request.jd_et;
        if let Some((first, last)) = self.coverage {
            if !(first..=last).contains(&jd_et) {
                return Err(ProviderError::OutOfRange { jd_et });
            }
        }
        let eps = self.true_obliquity_deg(jd_et);
        let ecl = self.geocentric_ecliptic(request.target, jd_et)?;
        let (ra, dec) = ecliptic_to_equatorial(ecl.lon_deg, ecl.lat_deg, eps);
        let mut equatorial = Position::new(ra, dec, ecl.distance_km);

        if let Observer::Topocentric(site) = request.observer {
            let obs = self.observer_xyz(jd_et, site.longitude_deg, site.latitude_deg, site.height_m);
            equatorial = cartesian_to_spherical(&sub(&equatorial.to_cartesian(), &obs));
        }

        Ok(match request.frame {
            CoordinateFrame::Equatorial => equatorial,
            CoordinateFrame::Ecliptic => match request.observer {
                Observer::Geocentric => ecl,
                Observer::Topocentric(_) => {
                    cartesian_to_spherical(&rotate_x(&equatorial.to_cartesian(), eps))
                }
            },
        })
    }

    fn delta_t_seconds(&self, jd_ut: f64) -> f64 {
        delta_t_seconds(jd_ut)
    }

    /// Apparent sidereal time: mean sidereal time plus the equation of the equinoxes.
    fn sidereal_time_deg(&self, jd_ut: f64) -> f64 {
        let jd_et = jd_ut + delta_t_seconds(jd_ut) / 86_400.0;
        let (dpsi, _) = nutation_deg(jd_et);
        let eps = self.true_obliquity_deg(jd_et).to_radians();
        normalize_deg_360(gmst_deg(jd_ut) + dpsi * eps.cos())
    }

    fn obliquity_deg(&self, jd_et: f64) -> f64 {
        self.true_obliquity_deg(jd_et)
    }
}
