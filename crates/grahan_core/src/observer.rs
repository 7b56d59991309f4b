//! Observer location and the provider-bound horizon transform.

use grahan_frames::{
    Atmosphere, RefractionDirection, ecliptic_to_equatorial, equatorial_to_horizontal,
    normalize_deg_360, refraction_extended,
};

use crate::provider::{CoordinateFrame, Position, PositionProvider};
use crate::time;

/// Lowest supported observer height in meters.
pub const GEO_HEIGHT_MIN_M: f64 = -500.0;
/// Highest supported observer height in meters.
pub const GEO_HEIGHT_MAX_M: f64 = 25_000.0;

/// Geographic position on Earth.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoPosition {
    /// Geodetic longitude in degrees, east positive. Range: [-180, 180].
    pub longitude_deg: f64,
    /// Geodetic latitude in degrees, north positive. Range: [-90, 90].
    pub latitude_deg: f64,
    /// Height above sea level in meters.
    pub height_m: f64,
}

impl GeoPosition {
    pub fn new(longitude_deg: f64, latitude_deg: f64, height_m: f64) -> Self {
        Self {
            longitude_deg,
            latitude_deg,
            height_m,
        }
    }

    /// Whether the height lies within `[GEO_HEIGHT_MIN_M, GEO_HEIGHT_MAX_M]`.
    pub fn height_in_range(&self) -> bool {
        (GEO_HEIGHT_MIN_M..=GEO_HEIGHT_MAX_M).contains(&self.height_m)
    }

    /// Local sidereal time in degrees for a Greenwich sidereal time.
    pub fn local_sidereal_deg(&self, greenwich_sidereal_deg: f64) -> f64 {
        normalize_deg_360(greenwich_sidereal_deg + self.longitude_deg)
    }
}

/// Horizontal coordinates of a body.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HorizontalPosition {
    /// Azimuth from south, clockwise through west, degrees.
    pub azimuth_deg: f64,
    pub true_altitude_deg: f64,
    /// Altitude including refraction (extended model).
    pub apparent_altitude_deg: f64,
}

/// Azimuth and altitude of a position seen from `site` at `jd_ut`.
///
/// `position` may be equatorial or ecliptic of date; ecliptic input is
/// first rotated by the provider's obliquity.
pub fn horizontal_position<P: PositionProvider + ?Sized>(
    provider: &P,
    jd_ut: f64,
    site: &GeoPosition,
    atmosphere: &Atmosphere,
    position: &Position,
    frame: CoordinateFrame,
) -> HorizontalPosition {
    let (ra, dec) = match frame {
        CoordinateFrame::Equatorial => (position.lon_deg, position.lat_deg),
        CoordinateFrame::Ecliptic => {
            let jd_et = time::ut_to_et(jd_ut, |t| provider.delta_t_seconds(t));
            ecliptic_to_equatorial(position.lon_deg, position.lat_deg, provider.obliquity_deg(jd_et))
        }
    };
    let lst = site.local_sidereal_deg(provider.sidereal_time_deg(jd_ut));
    let (az, alt) = equatorial_to_horizontal(ra, dec, lst, site.latitude_deg);
    let refracted = refraction_extended(
        alt,
        site.height_m,
        atmosphere.pressure_at(site.height_m),
        atmosphere.temperature_c,
        atmosphere.lapse_rate,
        RefractionDirection::TrueToApparent,
    );
    HorizontalPosition {
        azimuth_deg: az,
        true_altitude_deg: alt,
        apparent_altitude_deg: refracted.apparent_altitude_deg,
    }
}
