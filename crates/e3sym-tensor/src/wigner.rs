//! # Real Wigner D Matrices
//!
//! `D_l(R)` is defined by `Y_l(R x) = D_l(R) Y_l(x)` for every unit `x`, so a
//! coefficient block `c` of a function `f` becomes `D_l(R) c` for the rotated
//! function `f ∘ R⁻¹`. Entries are obtained by projection,
//! `D[m][m'] = ∫ Y_lm(R x) Y_lm'(x) dΩ`, on a [`SphereQuadrature`] that is
//! exact for the degrees involved.

use nalgebra::Rotation3;

use crate::harmonics::{sh_dim, spherical_harmonics_unit};
use crate::quadrature::SphereQuadrature;

/// Orthogonal `(2l+1) × (2l+1)` matrix, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct WignerD {
    l: u32,
    data: Vec<f64>,
}

impl WignerD {
    /// Degree of the matrix.
    pub fn l(&self) -> u32 {
        self.l
    }

    /// Side length `2l+1`.
    pub fn dim(&self) -> usize {
        2 * self.l as usize + 1
    }

    /// Entry at row `i`, column `j` (offset indices).
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.dim() + j]
    }

    /// Row-major data.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// `out = D · block`.
    pub fn apply(&self, block: &[f64], out: &mut [f64]) {
        let d = self.dim();
        for (i, o) in out.iter_mut().enumerate().take(d) {
            *o = self.data[i * d..(i + 1) * d]
                .iter()
                .zip(block)
                .map(|(a, b)| a * b)
                .sum();
        }
    }
}

/// D matrices for every degree `0..=lmax`, sharing one quadrature.
pub fn wigner_d_matrices(lmax: u32, rotation: &Rotation3<f64>) -> Vec<WignerD> {
    let quad = SphereQuadrature::new(lmax);
    let mut acc = vec![0.0; (0..=lmax).map(|l| (2 * l as usize + 1).pow(2)).sum()];
    let mut rotated = vec![0.0; sh_dim(lmax)];
    for (x, w) in quad.points().iter().zip(quad.weights()) {
        let y = spherical_harmonics_unit(lmax, x);
        rotated.copy_from_slice(&spherical_harmonics_unit(lmax, &(rotation * x)));
        let mut offset = 0;
        for l in 0..=lmax {
            let d = 2 * l as usize + 1;
            let start = (l * l) as usize;
            for i in 0..d {
                let yi = w * rotated[start + i];
                for j in 0..d {
                    acc[offset + i * d + j] += yi * y[start + j];
                }
            }
            offset += d * d;
        }
    }

    let mut out = Vec::with_capacity(lmax as usize + 1);
    let mut offset = 0;
    for l in 0..=lmax {
        let d = 2 * l as usize + 1;
        out.push(WignerD {
            l,
            data: acc[offset..offset + d * d].to_vec(),
        });
        offset += d * d;
    }
    out
}

/// D matrix for a single degree.
pub fn wigner_d(l: u32, rotation: &Rotation3<f64>) -> WignerD {
    let mut all = wigner_d_matrices(l, rotation);
    // `all` always holds lmax + 1 entries.
    all.swap_remove(l as usize)
}
