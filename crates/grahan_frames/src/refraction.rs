//! Atmospheric refraction and horizon dip.
//!
//! Two models are provided. The simple model is a two-branch tangent fit
//! (Bennett/Saemundsson) scaled for pressure and temperature. The extended
//! model follows Sinclair's formula with an iterative true→apparent
//! inversion and accounts for the dip of the horizon seen from a height.

/// Standard tropospheric lapse rate in K/m.
pub const DEFAULT_LAPSE_RATE: f64 = 0.0065;

/// Earth radius used for the geometric dip of the horizon, in meters.
const DIP_EARTH_RADIUS_M: f64 = 6_378_136.6;

/// Below this true altitude the extended model returns its input unchanged.
const EXTENDED_MIN_TRUE_ALT_DEG: f64 = -10.0;

/// Above this altitude the cotangent form of Sinclair's formula is used.
const SINCLAIR_SWITCH_ALT_DEG: f64 = 17.904104638432;

/// Secant iterations for the true→apparent inversion.
const INVERSION_ITERATIONS: usize = 5;

/// Conversion direction for refraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RefractionDirection {
    /// Geometric altitude in, refracted (observed) altitude out.
    TrueToApparent,
    /// Observed altitude in, geometric altitude out.
    ApparentToTrue,
}

/// Atmospheric conditions at the observer.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Atmosphere {
    /// Pressure in hPa. `0.0` means "estimate from the observer height".
    pub pressure_hpa: f64,
    /// Temperature in °C.
    pub temperature_c: f64,
    /// Lapse rate in K/m, used for the horizon dip.
    pub lapse_rate: f64,
}

impl Default for Atmosphere {
    fn default() -> Self {
        Self {
            pressure_hpa: 0.0,
            temperature_c: 10.0,
            lapse_rate: DEFAULT_LAPSE_RATE,
        }
    }
}

impl Atmosphere {
    pub fn new(pressure_hpa: f64, temperature_c: f64) -> Self {
        Self {
            pressure_hpa,
            temperature_c,
            lapse_rate: DEFAULT_LAPSE_RATE,
        }
    }

    /// Pressure to use at `height_m`, resolving the `0.0` sentinel.
    pub fn pressure_at(&self, height_m: f64) -> f64 {
        if self.pressure_hpa == 0.0 {
            estimate_pressure_hpa(height_m)
        } else {
            self.pressure_hpa
        }
    }
}

/// Barometric pressure estimate for a height above sea level.
pub fn estimate_pressure_hpa(height_m: f64) -> f64 {
    1013.25 * (1.0 - 0.0065 * height_m / 288.0).powf(5.255)
}

/// Simple refraction model. Returns the converted altitude in degrees.
///
/// True→apparent refraction is only added when the refracted altitude is
/// above the horizon; apparent→true refraction is only removed when the
/// geometric altitude stays above it. Otherwise the input is returned.
pub fn refraction_simple(
    alt_deg: f64,
    pressure_hpa: f64,
    temperature_c: f64,
    direction: RefractionDirection,
) -> f64 {
    let pt = pressure_hpa / 1010.0 * 283.0 / (273.0 + temperature_c);
    match direction {
        RefractionDirection::TrueToApparent => {
            let refr = if alt_deg > 15.0 {
                let a = (90.0 - alt_deg).to_radians().tan();
                (58.276 * a - 0.0824 * a * a * a) * pt / 3600.0
            } else if alt_deg > -5.0 {
                let a = alt_deg + 10.3 / (alt_deg + 5.11);
                if a + 1e-10 >= 90.0 {
                    0.0
                } else {
                    1.02 / a.to_radians().tan() * pt / 60.0
                }
            } else {
                0.0
            };
            if alt_deg + refr > 0.0 {
                alt_deg + refr
            } else {
                alt_deg
            }
        }
        RefractionDirection::ApparentToTrue => {
            if alt_deg <= 0.0 {
                return alt_deg;
            }
            let a = alt_deg + 7.31 / (alt_deg + 4.4);
            let mut refr = if a + 1e-10 >= 90.0 {
                0.0
            } else {
                1.0 / a.to_radians().tan()
            };
            refr -= 0.06 * (14.7 * refr + 13.0).to_radians().sin();
            refr *= pt / 60.0;
            if alt_deg - refr > 0.0 {
                alt_deg - refr
            } else {
                alt_deg
            }
        }
    }
}

/// Result of the extended refraction model.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RefractionDetail {
    pub true_altitude_deg: f64,
    pub apparent_altitude_deg: f64,
    pub refraction_deg: f64,
    /// Dip of the horizon (negative for an elevated observer).
    pub dip_deg: f64,
}

/// Extended refraction model with horizon dip.
///
/// Altitudes above 90° are reflected as `180° − alt`. A body whose
/// apparent altitude would fall below the dip of the horizon is not
/// refracted.
pub fn refraction_extended(
    alt_deg: f64,
    height_m: f64,
    pressure_hpa: f64,
    temperature_c: f64,
    lapse_rate: f64,
    direction: RefractionDirection,
) -> RefractionDetail {
    let dip = horizon_dip_deg(height_m, pressure_hpa, temperature_c, lapse_rate);
    let alt = if alt_deg > 90.0 { 180.0 - alt_deg } else { alt_deg };
    let unrefracted = RefractionDetail {
        true_altitude_deg: alt,
        apparent_altitude_deg: alt,
        refraction_deg: 0.0,
        dip_deg: dip,
    };

    match direction {
        RefractionDirection::TrueToApparent => {
            if alt < EXTENDED_MIN_TRUE_ALT_DEG {
                return unrefracted;
            }
            let apparent = invert_sinclair(alt, pressure_hpa, temperature_c);
            if apparent < dip {
                return unrefracted;
            }
            RefractionDetail {
                true_altitude_deg: alt,
                apparent_altitude_deg: apparent,
                refraction_deg: apparent - alt,
                dip_deg: dip,
            }
        }
        RefractionDirection::ApparentToTrue => {
            if alt < dip {
                return unrefracted;
            }
            let refr = sinclair_refraction_deg(alt, pressure_hpa, temperature_c);
            RefractionDetail {
                true_altitude_deg: alt - refr,
                apparent_altitude_deg: alt,
                refraction_deg: refr,
                dip_deg: dip,
            }
        }
    }
}

/// Dip of the horizon in degrees (≤ 0) for an observer at `height_m`.
pub fn horizon_dip_deg(height_m: f64, pressure_hpa: f64, temperature_c: f64, lapse_rate: f64) -> f64 {
    if height_m <= 0.0 {
        return 0.0;
    }
    let krefr = (0.0342 + lapse_rate) / (0.154 * 0.0238);
    let t_k = 273.15 + temperature_c;
    let d = 1.0 - 1.8480 * krefr * pressure_hpa / (t_k * t_k);
    if d <= 0.0 {
        return 0.0;
    }
    let geometric = (1.0 / (1.0 + height_m / DIP_EARTH_RADIUS_M)).acos();
    -geometric.to_degrees() * d.sqrt()
}

/// Refraction (degrees) for an apparent altitude, Sinclair's formula.
fn sinclair_refraction_deg(apparent_alt_deg: f64, pressure_hpa: f64, temperature_c: f64) -> f64 {
    let h = apparent_alt_deg;
    let r = if h > SINCLAIR_SWITCH_ALT_DEG {
        0.97 / h.to_radians().tan()
    } else {
        (34.46 + 4.23 * h + 0.004 * h * h) / (1.0 + 0.505 * h + 0.0845 * h * h)
    };
    ((pressure_hpa - 80.0) / 930.0 / (1.0 + 0.00008 * (r + 39.0) * (temperature_c - 10.0)) * r)
        / 60.0
}

/// Solve `a − R(a) = true_alt` for the apparent altitude `a` by secant steps.
fn invert_sinclair(true_alt_deg: f64, pressure_hpa: f64, temperature_c: f64) -> f64 {
    let residual = |a: f64| a - sinclair_refraction_deg(a, pressure_hpa, temperature_c) - true_alt_deg;
    let mut a0 = true_alt_deg;
    let mut a1 = true_alt_deg + sinclair_refraction_deg(true_alt_deg, pressure_hpa, temperature_c);
    let mut f0 = residual(a0);
    for _ in 0..INVERSION_ITERATIONS {
        let f1 = residual(a1);
        if f1 == f0 {
            break;
        }
        let a2 = a1 - f1 * (a1 - a0) / (f1 - f0);
        a0 = a1;
        f0 = f1;
        a1 = a2;
    }
    a1
}
