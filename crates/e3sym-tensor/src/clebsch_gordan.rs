//! # Real Clebsch–Gordan Coefficients
//!
//! Coupling tensors `C[m1][m2][m3]` for the real harmonic basis of
//! [`crate::harmonics`].
//!
//! ## Construction
//!
//! 1. Standard complex coefficients `⟨l1 k1 l2 k2 | l3 k3⟩` (Condon–Shortley)
//!    from the Racah formula.
//! 2. Change of basis with the unitary `Q_l` that expresses each real
//!    harmonic in the complex ones, `S_l = Q_l Y_l`:
//!    `C[m1,m2,m3] = Σ Q1[m1,k1] Q2[m2,k2] conj(Q3[m3,k3]) ⟨l1 k1 l2 k2 | l3 k3⟩`.
//! 3. The result is real up to one global phase. It is divided by the phase
//!    of its first largest-magnitude entry, making it real with that entry
//!    positive.
//!
//! The coupling is unitary: `Σ_{m1,m2} C[m1,m2,m3] C[m1,m2,m3'] = δ`. With a
//! degree-0 operand `C` is the identity, so coupling with a scalar 1 leaves
//! the other block unchanged.

use std::collections::HashMap;
use std::sync::OnceLock;

use num_complex::Complex64;

use e3sym_core::tolerance;

/// Real coupling tensor for one `(l1, l2) → l3` path.
#[derive(Debug, Clone, PartialEq)]
pub struct CouplingTensor {
    l1: u32,
    l2: u32,
    l3: u32,
    data: Vec<f64>,
}

impl CouplingTensor {
    /// Input and output degrees `(l1, l2, l3)`.
    pub fn degrees(&self) -> (u32, u32, u32) {
        (self.l1, self.l2, self.l3)
    }

    /// Entry `C[m1][m2][m3]`, indices offset so that `m = -l` is 0.
    pub fn get(&self, i1: usize, i2: usize, i3: usize) -> f64 {
        let (d2, d3) = (dim(self.l2), dim(self.l3));
        self.data[(i1 * d2 + i2) * d3 + i3]
    }

    /// Flat data in `[m1][m2][m3]` order.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// `out[m3] += Σ C[m1][m2][m3] a[m1] b[m2]`.
    pub fn contract_into(&self, a: &[f64], b: &[f64], out: &mut [f64]) {
        let (d1, d2, d3) = (dim(self.l1), dim(self.l2), dim(self.l3));
        debug_assert_eq!(a.len(), d1);
        debug_assert_eq!(b.len(), d2);
        debug_assert_eq!(out.len(), d3);
        for i1 in 0..d1 {
            if a[i1] == 0.0 {
                continue;
            }
            for i2 in 0..d2 {
                let ab = a[i1] * b[i2];
                if ab == 0.0 {
                    continue;
                }
                let row = &self.data[(i1 * d2 + i2) * d3..(i1 * d2 + i2 + 1) * d3];
                for (o, c) in out.iter_mut().zip(row) {
                    *o += c * ab;
                }
            }
        }
    }
}

/// True when `|l1 - l2| <= l3 <= l1 + l2`.
pub fn triangle(l1: u32, l2: u32, l3: u32) -> bool {
    l1.abs_diff(l2) <= l3 && l3 <= l1 + l2
}

/// Real coupling tensor, or `None` when the degrees violate the triangle
/// inequality.
pub fn real_clebsch_gordan(l1: u32, l2: u32, l3: u32) -> Option<CouplingTensor> {
    if !triangle(l1, l2, l3) {
        return None;
    }
    let (d1, d2, d3) = (dim(l1), dim(l2), dim(l3));
    let q1 = real_from_complex(l1);
    let q2 = real_from_complex(l2);
    let q3 = real_from_complex(l3);

    // Complex coefficients, non-zero only for k1 + k2 = k3.
    let mut cg = vec![0.0; d1 * d2];
    for (i1, k1) in (-(l1 as i64)..=l1 as i64).enumerate() {
        for (i2, k2) in (-(l2 as i64)..=l2 as i64).enumerate() {
            cg[i1 * d2 + i2] = su2_clebsch_gordan(l1 as i64, k1, l2 as i64, k2, l3 as i64, k1 + k2);
        }
    }

    let mut complex = vec![Complex64::new(0.0, 0.0); d1 * d2 * d3];
    for i1 in 0..d1 {
        for i2 in 0..d2 {
            let out = &mut complex[(i1 * d2 + i2) * d3..(i1 * d2 + i2 + 1) * d3];
            for j1 in 0..d1 {
                let a = q1[i1 * d1 + j1];
                if a == Complex64::new(0.0, 0.0) {
                    continue;
                }
                for j2 in 0..d2 {
                    let c = cg[j1 * d2 + j2];
                    if c == 0.0 {
                        continue;
                    }
                    let b = q2[i2 * d2 + j2];
                    // k3 = k1 + k2, as an index into 0..d3.
                    let j3 = j1 as i64 - l1 as i64 + j2 as i64 - l2 as i64 + l3 as i64;
                    let j3 = j3 as usize;
                    let ab = a * b * c;
                    for (i3, o) in out.iter_mut().enumerate() {
                        *o += ab * q3[i3 * d3 + j3].conj();
                    }
                }
            }
        }
    }

    Some(CouplingTensor {
        l1,
        l2,
        l3,
        data: remove_global_phase(&complex, (l1, l2, l3)),
    })
}

/// Divide by the phase of the first largest-magnitude entry and keep the
/// real part.
fn remove_global_phase(values: &[Complex64], degrees: (u32, u32, u32)) -> Vec<f64> {
    let max = values.iter().map(|c| c.norm()).fold(0.0_f64, f64::max);
    let pivot = values
        .iter()
        .find(|c| c.norm() >= max * (1.0 - 1e-9))
        .copied()
        .unwrap_or(Complex64::new(1.0, 0.0));
    let phase = if pivot.norm() > 0.0 {
        pivot / pivot.norm()
    } else {
        Complex64::new(1.0, 0.0)
    };
    let mut residual = 0.0_f64;
    let real: Vec<f64> = values
        .iter()
        .map(|c| {
            let r = c / phase;
            residual = residual.max(r.im.abs());
            r.re
        })
        .collect();
    if residual > tolerance::PHASE.max(max * 1e-10) {
        tracing::warn!(
            l1 = degrees.0,
            l2 = degrees.1,
            l3 = degrees.2,
            residual,
            "coupling tensor is not real after phase removal"
        );
    }
    real
}

/// Unitary `Q_l` with rows indexed by real `m` and columns by complex `k`,
/// both offset by `l`.
fn real_from_complex(l: u32) -> Vec<Complex64> {
    let d = dim(l);
    let l = l as usize;
    let h = std::f64::consts::FRAC_1_SQRT_2;
    let mut q = vec![Complex64::new(0.0, 0.0); d * d];
    q[l * d + l] = Complex64::new(1.0, 0.0);
    for m in 1..=l {
        let sign = if m % 2 == 0 { 1.0 } else { -1.0 };
        // S_m = ((-1)^m Y_m + Y_-m) / √2
        q[(l + m) * d + (l + m)] = Complex64::new(sign * h, 0.0);
        q[(l + m) * d + (l - m)] = Complex64::new(h, 0.0);
        // S_-m = i (Y_-m − (-1)^m Y_m) / √2
        q[(l - m) * d + (l - m)] = Complex64::new(0.0, h);
        q[(l - m) * d + (l + m)] = Complex64::new(0.0, -sign * h);
    }
    q
}

/// Complex Clebsch–Gordan coefficient `⟨j1 m1 j2 m2 | j3 m3⟩` for integer
/// angular momenta (Racah formula).
pub fn su2_clebsch_gordan(j1: i64, m1: i64, j2: i64, m2: i64, j3: i64, m3: i64) -> f64 {
    if m1 + m2 != m3
        || m1.abs() > j1
        || m2.abs() > j2
        || m3.abs() > j3
        || j3 < (j1 - j2).abs()
        || j3 > j1 + j2
    {
        return 0.0;
    }
    let f = |n: i64| factorial(n);
    let prefactor = ((2 * j3 + 1) as f64 * f(j3 + j1 - j2) * f(j3 - j1 + j2) * f(j1 + j2 - j3)
        / f(j1 + j2 + j3 + 1))
    .sqrt();
    let prefactor = prefactor
        * (f(j3 + m3) * f(j3 - m3) * f(j1 - m1) * f(j1 + m1) * f(j2 - m2) * f(j2 + m2)).sqrt();

    let k_min = 0_i64.max(j2 - j3 - m1).max(j1 - j3 + m2);
    let k_max = (j1 + j2 - j3).min(j1 - m1).min(j2 + m2);
    let mut sum = 0.0;
    for k in k_min..=k_max {
        let sign = if k % 2 == 0 { 1.0 } else { -1.0 };
        sum += sign
            / (f(k)
                * f(j1 + j2 - j3 - k)
                * f(j1 - m1 - k)
                * f(j2 + m2 - k)
                * f(j3 - j2 + m1 + k)
                * f(j3 - j1 - m2 + k));
    }
    prefactor * sum
}

/// `n!` from a table; `n` is at most `4·MAX_DEGREE + 1`.
fn factorial(n: i64) -> f64 {
    static TABLE: OnceLock<Vec<f64>> = OnceLock::new();
    let table = TABLE.get_or_init(|| {
        let mut t = Vec::with_capacity(171);
        let mut acc = 1.0_f64;
        t.push(acc);
        for k in 1..=170 {
            acc *= k as f64;
            t.push(acc);
        }
        t
    });
    usize::try_from(n)
        .ok()
        .and_then(|i| table.get(i).copied())
        .unwrap_or(f64::INFINITY)
}

fn dim(l: u32) -> usize {
    2 * l as usize + 1
}

/// Memo of coupling tensors for one computation.
///
/// Owned by the caller (no global cache), so every coupling product builds
/// each `(l1, l2, l3)` path once no matter how many copies use it.
#[derive(Debug, Default)]
pub struct CouplingCache {
    tensors: HashMap<(u32, u32, u32), CouplingTensor>,
}

impl CouplingCache {
    /// Empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Tensor for a path, building it on first use.
    pub fn get(&mut self, l1: u32, l2: u32, l3: u32) -> Option<&CouplingTensor> {
        if !triangle(l1, l2, l3) {
            return None;
        }
        if !self.tensors.contains_key(&(l1, l2, l3)) {
            let tensor = real_clebsch_gordan(l1, l2, l3)?;
            tracing::debug!(l1, l2, l3, "built coupling tensor");
            self.tensors.insert((l1, l2, l3), tensor);
        }
        self.tensors.get(&(l1, l2, l3))
    }

    /// Number of distinct paths built so far.
    pub fn len(&self) -> usize {
        self.tensors.len()
    }

    /// True when nothing has been built.
    pub fn is_empty(&self) -> bool {
        self.tensors.is_empty()
    }
}
