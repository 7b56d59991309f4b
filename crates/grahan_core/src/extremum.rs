//! Parabolic interpolation through three equally spaced samples.
//!
//! Samples `y₋₁, y₀, y₁` are taken at `x₀ − Δx`, `x₀`, `x₀ + Δx`. With the
//! parabola `y = a·u² + b·u + c` in units of `Δx` from the centre sample,
//! `c = y₀`, `b = (y₁ − y₋₁)/2` and `a = (y₁ + y₋₁)/2 − c`. All offsets
//! returned here are measured from the centre sample, in units of `x`.

use crate::error::DegenerateBracket;

/// Vertex of the fitted parabola.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    /// Offset of the vertex from the centre sample.
    pub offset: f64,
    /// Interpolated value at the vertex.
    pub value: f64,
}

fn coefficients(y_minus: f64, y0: f64, y_plus: f64) -> (f64, f64, f64) {
    let c = y0;
    let b = (y_plus - y_minus) / 2.0;
    let a = (y_plus + y_minus) / 2.0 - c;
    (a, b, c)
}

/// Vertex of the parabola through three samples spaced `dx` apart.
///
/// Collinear samples have no vertex; the centre sample is returned.
pub fn find_extremum(y_minus: f64, y0: f64, y_plus: f64, dx: f64) -> Vertex {
    let (a, b, c) = coefficients(y_minus, y0, y_plus);
    if a == 0.0 {
        return Vertex {
            offset: 0.0,
            value: y0,
        };
    }
    let u = -b / (2.0 * a);
    Vertex {
        offset: u * dx,
        value: (4.0 * a * c - b * b) / (4.0 * a),
    }
}

/// Both zero crossings of the parabola through three samples, ascending.
pub fn find_roots(
    y_minus: f64,
    y0: f64,
    y_plus: f64,
    dx: f64,
) -> Result<(f64, f64), DegenerateBracket> {
    let (a, b, c) = coefficients(y_minus, y0, y_plus);
    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 || a == 0.0 {
        return Err(DegenerateBracket { discriminant });
    }
    let sq = discriminant.sqrt();
    let r1 = (-b + sq) / (2.0 * a) * dx;
    let r2 = (-b - sq) / (2.0 * a) * dx;
    Ok((r1.min(r2), r1.max(r2)))
}
