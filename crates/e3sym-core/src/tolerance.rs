//! Comparison tolerances. No ad-hoc magic numbers in comparisons elsewhere.

/// Absolute tolerance for coefficient comparisons in double precision.
///
/// Coupling sums O(L²) products of O(1) coefficients; 1e-9 leaves several
/// digits for accumulated rounding at `MAX_DEGREE`.
pub const DOUBLE: f64 = 1e-9;

/// Absolute tolerance for coefficient comparisons in single precision.
pub const SINGLE: f64 = 1e-4;

/// Tolerance for quantities that come out of quadrature (Wigner D matrices,
/// projections). Gauss–Legendre is exact for the degrees involved, so this
/// only absorbs rounding.
pub const QUADRATURE: f64 = 1e-10;

/// Angular tolerance (radians) for refined peak directions.
pub const PEAK_ANGLE: f64 = 1e-5;

/// Relative tolerance used when phase-fixing complex coupling tensors.
pub const PHASE: f64 = 1e-12;

/// `|a - b| <= tol` with both sides finite.
pub fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
    a.is_finite() && b.is_finite() && (a - b).abs() <= tol
}

/// Element-wise [`approx_eq`] over equal-length slices.
pub fn slices_approx_eq(a: &[f64], b: &[f64], tol: f64) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| approx_eq(*x, *y, tol))
}
