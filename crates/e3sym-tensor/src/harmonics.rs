//! # Real Spherical Harmonics
//!
//! Orthonormal real spherical harmonics on the unit sphere,
//! `∫ Y_lm Y_l'm' dΩ = δ_ll' δ_mm'`, ordered `m = -l..=l` within a degree
//! and degrees ascending, so degree `l` starts at index `l²`.
//!
//! ## Convention
//!
//! ```text
//! Y_l0  = N_l0 P_l^0(z)
//! Y_lm  = √2 N_lm P_l^m(z) cos(mφ)     (m > 0)
//! Y_l-m = √2 N_lm P_l^m(z) sin(mφ)     (m > 0)
//! N_lm  = √((2l+1)/(4π) · (l-m)!/(l+m)!)
//! ```
//!
//! with `P_l^m` the associated Legendre function *without* the
//! Condon–Shortley phase. Degree 1 is therefore `√(3/4π) (y, z, x)` and the
//! `x² − y²` component of degree 2 is the last entry of its block.
//!
//! The azimuthal factor is evaluated as `Re/Im (x + iy)^m` and the polar
//! factor as `P_l^m / sin^m θ`, a polynomial in `z`, so no angle is ever
//! computed and the poles need no special case.

use std::f64::consts::PI;

use nalgebra::Vector3;

use e3sym_core::E3Error;

/// Number of coefficients for all degrees `0..=lmax`.
pub fn sh_dim(lmax: u32) -> usize {
    let n = lmax as usize + 1;
    n * n
}

/// Index of `(l, m)` in a full `0..=lmax` harmonic vector.
pub fn sh_index(l: u32, m: i32) -> usize {
    let l = l as i64;
    (l * l + l + i64::from(m)) as usize
}

/// Evaluate all real harmonics up to `lmax` at a **unit** vector.
///
/// The caller is responsible for normalization; see [`spherical_harmonics`]
/// for the checked entry point.
pub fn spherical_harmonics_unit(lmax: u32, dir: &Vector3<f64>) -> Vec<f64> {
    let (x, y, z) = (dir.x, dir.y, dir.z);
    let lmax = lmax as usize;
    let mut out = vec![0.0; (lmax + 1) * (lmax + 1)];

    // Re/Im of (x + iy)^m.
    let mut cos_m = vec![1.0; lmax + 1];
    let mut sin_m = vec![0.0; lmax + 1];
    for m in 1..=lmax {
        cos_m[m] = cos_m[m - 1] * x - sin_m[m - 1] * y;
        sin_m[m] = sin_m[m - 1] * x + cos_m[m - 1] * y;
    }

    let mut p_mm = 1.0; // (2m-1)!!
    for m in 0..=lmax {
        if m > 0 {
            p_mm *= (2 * m - 1) as f64;
        }
        let mut p_prev = 0.0;
        let mut p_curr = p_mm;
        for l in m..=lmax {
            if l == m + 1 {
                p_prev = p_curr;
                p_curr = z * (2 * m + 1) as f64 * p_mm;
            } else if l > m + 1 {
                let next = ((2 * l - 1) as f64 * z * p_curr - (l + m - 1) as f64 * p_prev)
                    / (l - m) as f64;
                p_prev = p_curr;
                p_curr = next;
            }
            let norm = normalization(l, m);
            let base = l * l + l;
            if m == 0 {
                out[base] = norm * p_curr;
            } else {
                let scaled = std::f64::consts::SQRT_2 * norm * p_curr;
                out[base + m] = scaled * cos_m[m];
                out[base - m] = scaled * sin_m[m];
            }
        }
    }
    out
}

/// Evaluate all real harmonics up to `lmax` at the direction of `v`.
///
/// # Errors
///
/// [`E3Error::InvalidParameter`] for a zero or non-finite vector.
pub fn spherical_harmonics(lmax: u32, v: &Vector3<f64>) -> Result<Vec<f64>, E3Error> {
    let dir = unit_direction(v)?;
    Ok(spherical_harmonics_unit(lmax, &dir))
}

/// Normalize a vector, rejecting zero and non-finite input.
pub fn unit_direction(v: &Vector3<f64>) -> Result<Vector3<f64>, E3Error> {
    if !v.iter().all(|c| c.is_finite()) {
        return Err(E3Error::InvalidParameter(format!(
            "direction has non-finite components: {:?}",
            [v.x, v.y, v.z]
        )));
    }
    let r = v.norm();
    if r == 0.0 {
        return Err(E3Error::InvalidParameter(
            "zero vector has no direction".to_string(),
        ));
    }
    Ok(v / r)
}

/// `N_lm = √((2l+1)/(4π) · (l-m)!/(l+m)!)`.
fn normalization(l: usize, m: usize) -> f64 {
    let mut ratio = 1.0;
    for k in (l - m + 1)..=(l + m) {
        ratio /= k as f64;
    }
    ((2 * l + 1) as f64 / (4.0 * PI) * ratio).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quadrature::SphereQuadrature;

    const TOL: f64 = 1e-12;

    #[test]
    fn test_degree_zero_is_constant() {
        let y = spherical_harmonics_unit(0, &Vector3::new(0.0, 0.6, 0.8));
        assert_eq!(y.len(), 1);
        assert!((y[0] - 1.0 / (4.0 * PI).sqrt()).abs() < TOL);
    }

    #[test]
    fn test_degree_one_is_y_z_x() {
        let c = (3.0 / (4.0 * PI)).sqrt();
        let dir = Vector3::new(0.48, 0.6, 0.64);
        let y = spherical_harmonics_unit(1, &dir);
        assert!((y[1] - c * dir.y).abs() < TOL);
        assert!((y[2] - c * dir.z).abs() < TOL);
        assert!((y[3] - c * dir.x).abs() < TOL);
    }

    #[test]
    fn test_x2_minus_y2_is_last_in_degree_two() {
        // Y_22 = √(15/16π) (x² − y²)
        let c = (15.0 / (16.0 * PI)).sqrt();
        let dir = Vector3::new(0.48, 0.6, 0.64);
        let y = spherical_harmonics_unit(2, &dir);
        assert!((y[sh_index(2, 2)] - c * (dir.x * dir.x - dir.y * dir.y)).abs() < TOL);
        // Y_2-2 = √(15/4π) xy
        let c_xy = (15.0 / (4.0 * PI)).sqrt();
        assert!((y[sh_index(2, -2)] - c_xy * dir.x * dir.y).abs() < TOL);
    }

    #[test]
    fn test_poles_are_finite() {
        for z in [1.0, -1.0] {
            let y = spherical_harmonics_unit(6, &Vector3::new(0.0, 0.0, z));
            assert!(y.iter().all(|v| v.is_finite()));
            // Only m = 0 survives on the axis.
            for l in 1..=6u32 {
                for m in 1..=l as i32 {
                    assert!(y[sh_index(l, m)].abs() < TOL);
                    assert!(y[sh_index(l, -m)].abs() < TOL);
                }
            }
        }
    }

    #[test]
    fn test_orthonormal_under_quadrature() {
        let lmax = 5;
        let quad = SphereQuadrature::new(lmax);
        let n = sh_dim(lmax);
        let mut gram = vec![0.0; n * n];
        for (p, w) in quad.points().iter().zip(quad.weights()) {
            let y = spherical_harmonics_unit(lmax, p);
            for i in 0..n {
                for j in 0..n {
                    gram[i * n + j] += w * y[i] * y[j];
                }
            }
        }
        for i in 0..n {
            for j in 0..n {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!(
                    (gram[i * n + j] - expected).abs() < 1e-10,
                    "gram[{i},{j}] = {}",
                    gram[i * n + j]
                );
            }
        }
    }

    #[test]
    fn test_addition_theorem() {
        // Σ_m Y_lm(u)² = (2l+1)/(4π) for any unit u.
        let dir = Vector3::new(-0.36, 0.48, 0.8);
        let lmax = 8;
        let y = spherical_harmonics_unit(lmax, &dir);
        for l in 0..=lmax {
            let start = (l * l) as usize;
            let sum: f64 = y[start..start + 2 * l as usize + 1].iter().map(|v| v * v).sum();
            assert!((sum - (2 * l + 1) as f64 / (4.0 * PI)).abs() < 1e-10);
        }
    }

    #[test]
    fn test_checked_entry_rejects_zero() {
        assert!(matches!(
            spherical_harmonics(2, &Vector3::zeros()),
            Err(E3Error::InvalidParameter(_))
        ));
        assert!(spherical_harmonics(2, &Vector3::new(f64::NAN, 0.0, 1.0)).is_err());
    }

    #[test]
    fn test_checked_entry_normalizes() {
        let a = spherical_harmonics(3, &Vector3::new(0.0, 3.0, 4.0)).unwrap();
        let b = spherical_harmonics_unit(3, &Vector3::new(0.0, 0.6, 0.8));
        for (x, y) in a.iter().zip(&b) {
            assert!((x - y).abs() < TOL);
        }
    }
}
