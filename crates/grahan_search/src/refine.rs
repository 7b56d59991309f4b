//! Numeric refinement shared by the searches: parabolic maximum/minimum
//! refinement on a shrinking grid, contact bracketing, and secant-Newton
//! polishing of contact instants.

use grahan_core::{ProviderError, find_extremum, find_roots};

/// Shrinking sample grid for extremum refinement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Grid {
    /// Initial half-spacing of the three samples, days.
    pub start: f64,
    /// Stop once the spacing is at or below this, days.
    pub precision: f64,
    pub divisor: f64,
    /// Divisor used once the spacing drops below `fine_below`.
    pub fine_divisor: f64,
    pub fine_below: f64,
}

impl Grid {
    pub const fn uniform(start: f64, divisor: f64, precision: f64) -> Self {
        Self {
            start,
            precision,
            divisor,
            fine_divisor: divisor,
            fine_below: 0.0,
        }
    }
}

/// Extremum of `f` near `t`, by repeated three-point parabola fits.
pub(crate) fn refine_extremum<F>(mut t: f64, grid: Grid, mut f: F) -> Result<f64, ProviderError>
where
    F: FnMut(f64) -> Result<f64, ProviderError>,
{
    let mut dt = grid.start;
    let mut divisor = grid.divisor;
    while dt > grid.precision {
        if dt < grid.fine_below {
            divisor = grid.fine_divisor;
        }
        let y_minus = f(t - dt)?;
        let y0 = f(t)?;
        let y_plus = f(t + dt)?;
        t += find_extremum(y_minus, y0, y_plus, dt).offset;
        dt /= divisor;
    }
    Ok(t)
}

/// The two zero crossings of `f` around `t0`, from samples at `t0 ± window`.
///
/// `None` when `f` is not positive at `t0` or the samples do not bracket
/// two crossings; the corresponding phase is then absent.
pub(crate) fn bracket_contacts<F>(
    t0: f64,
    window: f64,
    mut f: F,
) -> Result<Option<(f64, f64)>, ProviderError>
where
    F: FnMut(f64) -> Result<f64, ProviderError>,
{
    let y0 = f(t0)?;
    if y0 <= 0.0 {
        return Ok(None);
    }
    let y_minus = f(t0 - window)?;
    let y_plus = f(t0 + window)?;
    Ok(find_roots(y_minus, y0, y_plus, window)
        .ok()
        .map(|(r1, r2)| (t0 + r1, t0 + r2)))
}

/// Secant-Newton polishing of a zero of `f` near `t`.
///
/// Each pass samples `f(t − dt)` and `f(t)`; `dt` shrinks by `divisor`
/// after each pass.
pub(crate) fn polish_contact<F>(
    mut t: f64,
    mut dt: f64,
    divisor: f64,
    passes: usize,
    mut f: F,
) -> Result<f64, ProviderError>
where
    F: FnMut(f64) -> Result<f64, ProviderError>,
{
    for _ in 0..passes {
        let y1 = f(t)?;
        let y0 = f(t - dt)?;
        let slope = (y1 - y0) / dt;
        if slope == 0.0 || !slope.is_finite() {
            break;
        }
        t -= y1 / slope;
        dt /= divisor;
    }
    Ok(t)
}
