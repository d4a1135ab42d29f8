//! # Spherical Tensor
//!
//! A band-limited function on the sphere stored as real harmonic
//! coefficients plus the representation list that partitions them.
//!
//! ## Invariants
//!
//! - `signal.len() == rs.dim()`, checked by every constructor, including
//!   deserialization.
//! - Every coefficient is finite and already rounded to the tensor's
//!   [`Precision`].
//! - Values are immutable: every operation returns a new tensor.
//!
//! The coupling (tensor) product lives in [`crate::coupling`]; sampling,
//! plotting and peak search live in [`crate::sampling`].

use std::ops::{Add, Mul, Neg, Sub};

use nalgebra::{Rotation3, Vector3};
use serde::{Deserialize, Serialize};

use e3sym_core::{tolerance, E3Error, Precision, Rs};

use crate::harmonics::{sh_dim, sh_index, spherical_harmonics_unit, unit_direction};
use crate::wigner::wigner_d_matrices;

/// Options for [`SphericalTensor::from_geometry_with`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometryOptions {
    /// Scale each point mass by its vector's length. When false every
    /// vector contributes with unit weight.
    pub radius: bool,
    /// Stored precision of the result.
    pub precision: Precision,
}

impl Default for GeometryOptions {
    fn default() -> Self {
        Self {
            radius: true,
            precision: Precision::Double,
        }
    }
}

/// Real spherical-harmonic expansion with its representation list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSphericalTensor")]
pub struct SphericalTensor {
    rs: Rs,
    signal: Vec<f64>,
    precision: Precision,
}

/// Unchecked wire form; converted through [`SphericalTensor::with_precision`].
#[derive(Deserialize)]
struct RawSphericalTensor {
    rs: Rs,
    signal: Vec<f64>,
    #[serde(default)]
    precision: Precision,
}

impl TryFrom<RawSphericalTensor> for SphericalTensor {
    type Error = E3Error;

    fn try_from(raw: RawSphericalTensor) -> Result<Self, Self::Error> {
        Self::with_precision(raw.signal, raw.rs, raw.precision)
    }
}

impl SphericalTensor {
    /// Build from a literal signal in double precision.
    ///
    /// # Errors
    ///
    /// [`E3Error::ShapeMismatch`] when `signal.len() != rs.dim()`;
    /// [`E3Error::InvalidParameter`] for a non-finite coefficient.
    pub fn new(signal: Vec<f64>, rs: Rs) -> Result<Self, E3Error> {
        Self::with_precision(signal, rs, Precision::Double)
    }

    /// Build from a literal signal at an explicit precision.
    ///
    /// Coefficients are rounded first, so a value that overflows the
    /// target precision is rejected like any other non-finite input.
    pub fn with_precision(
        mut signal: Vec<f64>,
        rs: Rs,
        precision: Precision,
    ) -> Result<Self, E3Error> {
        if signal.len() != rs.dim() {
            return Err(E3Error::ShapeMismatch {
                expected: rs.dim(),
                actual: signal.len(),
            });
        }
        precision.round_all(&mut signal);
        if let Some(i) = signal.iter().position(|v| !v.is_finite()) {
            return Err(E3Error::InvalidParameter(format!(
                "signal coefficient {i} is not finite at {precision} precision"
            )));
        }
        Ok(Self {
            rs,
            signal,
            precision,
        })
    }

    /// The zero function for a representation list.
    pub fn zeros(rs: Rs, precision: Precision) -> Self {
        Self {
            signal: vec![0.0; rs.dim()],
            rs,
            precision,
        }
    }

    /// Project point masses at the given vectors onto harmonics `0..=lmax`.
    ///
    /// Each vector contributes `|v| · Y(v̂)`. Zero-length vectors have no
    /// direction and contribute nothing.
    pub fn from_geometry(vectors: &[Vector3<f64>], lmax: u32) -> Result<Self, E3Error> {
        Self::from_geometry_with(vectors, lmax, GeometryOptions::default())
    }

    /// [`Self::from_geometry`] with explicit options.
    pub fn from_geometry_with(
        vectors: &[Vector3<f64>],
        lmax: u32,
        options: GeometryOptions,
    ) -> Result<Self, E3Error> {
        let weights: Vec<f64> = if options.radius {
            vectors.iter().map(|v| v.norm()).collect()
        } else {
            vec![1.0; vectors.len()]
        };
        Self::from_decorated_geometry(vectors, &weights, lmax, options.precision)
    }

    /// Project point masses with explicit per-point weights.
    ///
    /// # Errors
    ///
    /// [`E3Error::ShapeMismatch`] when `weights` and `vectors` differ in
    /// length; [`E3Error::InvalidParameter`] for non-finite input.
    pub fn from_decorated_geometry(
        vectors: &[Vector3<f64>],
        weights: &[f64],
        lmax: u32,
        precision: Precision,
    ) -> Result<Self, E3Error> {
        if weights.len() != vectors.len() {
            return Err(E3Error::ShapeMismatch {
                expected: vectors.len(),
                actual: weights.len(),
            });
        }
        let rs = Rs::spherical(lmax)?;
        let mut signal = vec![0.0; rs.dim()];
        for (i, (v, w)) in vectors.iter().zip(weights).enumerate() {
            if !w.is_finite() {
                return Err(E3Error::InvalidParameter(format!(
                    "weight of point {i} is not finite"
                )));
            }
            if v.iter().all(|c| *c == 0.0) {
                tracing::debug!(point = i, "skipping zero-length vector");
                continue;
            }
            let dir = unit_direction(v)?;
            let y = spherical_harmonics_unit(lmax, &dir);
            for (s, y) in signal.iter_mut().zip(&y) {
                *s += w * y;
            }
        }
        Self::with_precision(signal, rs, precision)
    }

    /// Representation list.
    pub fn rs(&self) -> &Rs {
        &self.rs
    }

    /// Coefficients.
    pub fn signal(&self) -> &[f64] {
        &self.signal
    }

    /// Stored precision.
    pub fn precision(&self) -> Precision {
        self.precision
    }

    /// Coefficient count.
    pub fn dim(&self) -> usize {
        self.signal.len()
    }

    /// Take the signal and representation list apart.
    pub fn into_parts(self) -> (Vec<f64>, Rs) {
        (self.signal, self.rs)
    }

    /// Same coefficients at another precision.
    ///
    /// # Errors
    ///
    /// [`E3Error::InvalidParameter`] when a coefficient overflows `precision`.
    pub fn to_precision(&self, precision: Precision) -> Result<Self, E3Error> {
        Self::with_precision(self.signal.clone(), self.rs.clone(), precision)
    }

    fn ensure_same_rs(&self, other: &Self) -> Result<(), E3Error> {
        if self.rs != other.rs {
            return Err(E3Error::IncompatibleRepresentation {
                left: self.rs.to_string(),
                right: other.rs.to_string(),
            });
        }
        Ok(())
    }

    fn zip_with(&self, other: &Self, f: impl Fn(f64, f64) -> f64) -> Result<Self, E3Error> {
        self.ensure_same_rs(other)?;
        let signal: Vec<f64> = self
            .signal
            .iter()
            .zip(&other.signal)
            .map(|(a, b)| f(*a, *b))
            .collect();
        Self::with_precision(
            signal,
            self.rs.clone(),
            self.precision.coarser(other.precision),
        )
    }

    /// Function sum.
    ///
    /// # Errors
    ///
    /// [`E3Error::IncompatibleRepresentation`] unless both lists are equal;
    /// [`E3Error::InvalidParameter`] when a sum overflows.
    pub fn try_add(&self, other: &Self) -> Result<Self, E3Error> {
        self.zip_with(other, |a, b| a + b)
    }

    /// Function difference.
    pub fn try_sub(&self, other: &Self) -> Result<Self, E3Error> {
        self.zip_with(other, |a, b| a - b)
    }

    /// Inner product of the two signals, equal to the `L²` inner product of
    /// the functions on the sphere.
    pub fn dot(&self, other: &Self) -> Result<f64, E3Error> {
        self.ensure_same_rs(other)?;
        let dot = self
            .signal
            .iter()
            .zip(&other.signal)
            .map(|(a, b)| a * b)
            .sum();
        Ok(self.precision.coarser(other.precision).round(dot))
    }

    /// Multiply every coefficient by `factor`.
    ///
    /// # Errors
    ///
    /// [`E3Error::InvalidParameter`] for a non-finite factor or a product
    /// that overflows.
    pub fn scale(&self, factor: f64) -> Result<Self, E3Error> {
        if !factor.is_finite() {
            return Err(E3Error::InvalidParameter(format!(
                "scale factor {factor} is not finite"
            )));
        }
        let signal = self.signal.iter().map(|v| v * factor).collect();
        Self::with_precision(signal, self.rs.clone(), self.precision)
    }

    /// `self · self`.
    pub fn norm_squared(&self) -> f64 {
        self.signal.iter().map(|v| v * v).sum()
    }

    /// Euclidean norm of the signal.
    pub fn norm(&self) -> f64 {
        self.norm_squared().sqrt()
    }

    /// Norm of each `2L+1` block, in signal order.
    pub fn sph_norm(&self) -> Vec<f64> {
        self.rs
            .blocks()
            .map(|b| {
                self.signal[b.range()]
                    .iter()
                    .map(|v| v * v)
                    .sum::<f64>()
                    .sqrt()
            })
            .collect()
    }

    /// Coefficients of one entry of the representation list.
    pub fn irrep_signal(&self, irrep_index: usize) -> Option<&[f64]> {
        let mut offset = 0;
        for (i, ir) in self.rs.irreps().iter().enumerate() {
            if i == irrep_index {
                return Some(&self.signal[offset..offset + ir.dim()]);
            }
            offset += ir.dim();
        }
        None
    }

    /// Truncate or zero-pad a `[(1,0), ..., (1,L)]` tensor to a new `lmax`.
    ///
    /// # Errors
    ///
    /// [`E3Error::InvalidParameter`] when the list is not of that form.
    pub fn change_lmax(&self, lmax: u32) -> Result<Self, E3Error> {
        if !self.rs.is_spherical() {
            return Err(E3Error::InvalidParameter(format!(
                "change_lmax needs a [(1,0),...,(1,L)] representation, got {}",
                self.rs
            )));
        }
        let rs = Rs::spherical(lmax)?;
        let mut signal = vec![0.0; rs.dim()];
        let n = signal.len().min(self.signal.len());
        signal[..n].copy_from_slice(&self.signal[..n]);
        Ok(Self {
            rs,
            signal,
            precision: self.precision,
        })
    }

    /// Per-`(l, m)` coefficients with all copies of a degree summed, i.e.
    /// the harmonic expansion of the function itself.
    pub(crate) fn collapsed(&self) -> (u32, Vec<f64>) {
        let lmax = self.rs.lmax().unwrap_or(0);
        let mut coeffs = vec![0.0; sh_dim(lmax)];
        for block in self.rs.blocks() {
            let start = sh_index(block.l, -(block.l as i32));
            for (c, s) in coeffs[start..start + block.len()]
                .iter_mut()
                .zip(&self.signal[block.range()])
            {
                *c += s;
            }
        }
        (lmax, coeffs)
    }

    /// Value of the function at the direction of `v`.
    ///
    /// # Errors
    ///
    /// [`E3Error::InvalidParameter`] for a zero or non-finite vector.
    pub fn evaluate(&self, v: &Vector3<f64>) -> Result<f64, E3Error> {
        let dir = unit_direction(v)?;
        let (lmax, coeffs) = self.collapsed();
        Ok(evaluate_collapsed(lmax, &coeffs, &dir))
    }

    /// The rotated function `f ∘ R⁻¹`: every block `c` becomes `D_L(R) c`.
    ///
    /// # Errors
    ///
    /// [`E3Error::InvalidParameter`] when a rotated coefficient overflows
    /// the tensor's precision.
    pub fn rotate(&self, rotation: &Rotation3<f64>) -> Result<Self, E3Error> {
        let Some(lmax) = self.rs.irreps().iter().map(|ir| ir.l()).max() else {
            return Ok(self.clone());
        };
        let ds = wigner_d_matrices(lmax, rotation);
        let mut signal = vec![0.0; self.signal.len()];
        for block in self.rs.blocks() {
            let range = block.range();
            ds[block.l as usize].apply(&self.signal[range.clone()], &mut signal[range]);
        }
        Self::with_precision(signal, self.rs.clone(), self.precision)
    }

    /// Same representation list and coefficients within `tol`.
    pub fn approx_eq(&self, other: &Self, tol: f64) -> bool {
        self.rs == other.rs && tolerance::slices_approx_eq(&self.signal, &other.signal, tol)
    }

    /// True when every coefficient is within `tol` of zero.
    pub fn is_zero(&self, tol: f64) -> bool {
        self.signal.iter().all(|v| v.abs() <= tol)
    }
}

/// `Σ c_lm Y_lm(dir)` for a collapsed coefficient vector and unit `dir`.
pub(crate) fn evaluate_collapsed(lmax: u32, coeffs: &[f64], dir: &Vector3<f64>) -> f64 {
    spherical_harmonics_unit(lmax, dir)
        .iter()
        .zip(coeffs)
        .map(|(y, c)| y * c)
        .sum()
}

impl Add for &SphericalTensor {
    type Output = Result<SphericalTensor, E3Error>;

    fn add(self, rhs: Self) -> Self::Output {
        self.try_add(rhs)
    }
}

impl Sub for &SphericalTensor {
    type Output = Result<SphericalTensor, E3Error>;

    fn sub(self, rhs: Self) -> Self::Output {
        self.try_sub(rhs)
    }
}

/// `a * b` is the inner product.
impl Mul for &SphericalTensor {
    type Output = Result<f64, E3Error>;

    fn mul(self, rhs: Self) -> Self::Output {
        self.dot(rhs)
    }
}

impl Mul<f64> for &SphericalTensor {
    type Output = Result<SphericalTensor, E3Error>;

    fn mul(self, rhs: f64) -> Self::Output {
        self.scale(rhs)
    }
}

impl Neg for &SphericalTensor {
    type Output = SphericalTensor;

    fn neg(self) -> Self::Output {
        SphericalTensor {
            rs: self.rs.clone(),
            signal: self.signal.iter().map(|v| -v).collect(),
            precision: self.precision,
        }
    }
}
