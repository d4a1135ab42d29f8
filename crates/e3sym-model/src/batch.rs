//! # Batches
//!
//! Dense containers for model input and output.
//!
//! - [`SignalBatch`]: shape `(batch, points, dim)`, one spherical-tensor
//!   signal per point.
//! - [`GeometryBatch`]: shape `(batch, points, 3)`, one position per point.
//!
//! Both are row-major and validated on construction, including when
//! deserialized.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use e3sym_core::{E3Error, Rs};
use e3sym_tensor::SphericalTensor;

use crate::error::ModelError;

/// Per-point signals, `(batch, points, dim)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSignalBatch")]
pub struct SignalBatch {
    batch: usize,
    points: usize,
    dim: usize,
    data: Vec<f64>,
}

#[derive(Deserialize)]
struct RawSignalBatch {
    batch: usize,
    points: usize,
    dim: usize,
    data: Vec<f64>,
}

impl TryFrom<RawSignalBatch> for SignalBatch {
    type Error = ModelError;

    fn try_from(raw: RawSignalBatch) -> Result<Self, Self::Error> {
        Self::new(raw.batch, raw.points, raw.dim, raw.data)
    }
}

impl SignalBatch {
    /// Wrap row-major data.
    ///
    /// # Errors
    ///
    /// [`ModelError::BatchShape`] when `data.len() != batch * points * dim`.
    pub fn new(batch: usize, points: usize, dim: usize, data: Vec<f64>) -> Result<Self, ModelError> {
        let expected = batch * points * dim;
        if data.len() != expected {
            return Err(ModelError::BatchShape(format!(
                "signal batch ({batch}, {points}, {dim}) needs {expected} values, got {}",
                data.len()
            )));
        }
        Ok(Self {
            batch,
            points,
            dim,
            data,
        })
    }

    /// All-zero batch.
    pub fn zeros(batch: usize, points: usize, dim: usize) -> Self {
        Self {
            batch,
            points,
            dim,
            data: vec![0.0; batch * points * dim],
        }
    }

    /// Batch of one, from per-point tensors sharing a representation list.
    pub fn from_tensors(tensors: &[SphericalTensor]) -> Result<Self, ModelError> {
        let Some(first) = tensors.first() else {
            return Ok(Self::zeros(1, 0, 0));
        };
        let dim = first.dim();
        let mut data = Vec::with_capacity(tensors.len() * dim);
        for (i, t) in tensors.iter().enumerate() {
            if t.rs() != first.rs() {
                return Err(ModelError::BatchShape(format!(
                    "point {i} has representation {}, expected {}",
                    t.rs(),
                    first.rs()
                )));
            }
            data.extend_from_slice(t.signal());
        }
        Self::new(1, tensors.len(), dim, data)
    }

    /// `(batch, points, dim)`.
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.batch, self.points, self.dim)
    }

    /// Row-major data.
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Signal of one point.
    pub fn signal(&self, b: usize, p: usize) -> &[f64] {
        let start = (b * self.points + p) * self.dim;
        &self.data[start..start + self.dim]
    }

    /// Mutable signal of one point.
    pub fn signal_mut(&mut self, b: usize, p: usize) -> &mut [f64] {
        let start = (b * self.points + p) * self.dim;
        &mut self.data[start..start + self.dim]
    }

    /// Signal of one point as a tensor with representation `rs`.
    pub fn tensor(&self, b: usize, p: usize, rs: &Rs) -> Result<SphericalTensor, ModelError> {
        Ok(SphericalTensor::new(self.signal(b, p).to_vec(), rs.clone())?)
    }

    /// Apply `f` to every point's tensor, producing a batch of the same shape.
    pub fn map_tensors(
        &self,
        rs: &Rs,
        f: impl Fn(&SphericalTensor) -> Result<SphericalTensor, E3Error>,
    ) -> Result<Self, ModelError> {
        if rs.dim() != self.dim {
            return Err(ModelError::BatchShape(format!(
                "representation {rs} has {} coefficients, batch has {}",
                rs.dim(),
                self.dim
            )));
        }
        let mut out = Self::zeros(self.batch, self.points, self.dim);
        for b in 0..self.batch {
            for p in 0..self.points {
                let mapped = f(&self.tensor(b, p, rs)?)?;
                if mapped.dim() != self.dim {
                    return Err(ModelError::BatchShape(format!(
                        "mapped tensor has {} coefficients, expected {}",
                        mapped.dim(),
                        self.dim
                    )));
                }
                out.signal_mut(b, p).copy_from_slice(mapped.signal());
            }
        }
        Ok(out)
    }

    /// Largest absolute element-wise difference.
    pub fn max_abs_diff(&self, other: &Self) -> Result<f64, ModelError> {
        if self.shape() != other.shape() {
            return Err(ModelError::BatchShape(format!(
                "cannot compare batches of shape {:?} and {:?}",
                self.shape(),
                other.shape()
            )));
        }
        Ok(self
            .data
            .iter()
            .zip(&other.data)
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f64::max))
    }
}

/// Per-point positions, `(batch, points, 3)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGeometryBatch")]
pub struct GeometryBatch {
    batch: usize,
    points: usize,
    data: Vec<[f64; 3]>,
}

#[derive(Deserialize)]
struct RawGeometryBatch {
    batch: usize,
    points: usize,
    data: Vec<[f64; 3]>,
}

impl TryFrom<RawGeometryBatch> for GeometryBatch {
    type Error = ModelError;

    fn try_from(raw: RawGeometryBatch) -> Result<Self, Self::Error> {
        Self::new(raw.batch, raw.points, raw.data)
    }
}

impl GeometryBatch {
    /// Wrap row-major positions.
    ///
    /// # Errors
    ///
    /// [`ModelError::BatchShape`] on a length mismatch or a non-finite
    /// coordinate.
    pub fn new(batch: usize, points: usize, data: Vec<[f64; 3]>) -> Result<Self, ModelError> {
        if data.len() != batch * points {
            return Err(ModelError::BatchShape(format!(
                "geometry batch ({batch}, {points}, 3) needs {} positions, got {}",
                batch * points,
                data.len()
            )));
        }
        if let Some(i) = data.iter().position(|p| p.iter().any(|c| !c.is_finite())) {
            return Err(ModelError::BatchShape(format!(
                "position {i} has a non-finite coordinate"
            )));
        }
        Ok(Self {
            batch,
            points,
            data,
        })
    }

    /// Batch of one from a point set.
    pub fn single(points: &[Vector3<f64>]) -> Result<Self, ModelError> {
        Self::new(1, points.len(), points.iter().map(|p| [p.x, p.y, p.z]).collect())
    }

    /// `(batch, points)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.batch, self.points)
    }

    /// Position of one point.
    pub fn position(&self, b: usize, p: usize) -> Vector3<f64> {
        Vector3::from(self.data[b * self.points + p])
    }

    /// All positions of one batch entry.
    pub fn positions(&self, b: usize) -> Vec<Vector3<f64>> {
        (0..self.points).map(|p| self.position(b, p)).collect()
    }

    /// Apply `f` to every position.
    pub fn map_positions(&self, f: impl Fn(&Vector3<f64>) -> Vector3<f64>) -> Self {
        let data = self
            .data
            .iter()
            .map(|p| {
                let q = f(&Vector3::from(*p));
                [q.x, q.y, q.z]
            })
            .collect();
        Self {
            batch: self.batch,
            points: self.points,
            data,
        }
    }
}

/// Check that signals and geometry describe the same points.
pub fn ensure_matching(input: &SignalBatch, geometry: &GeometryBatch) -> Result<(), ModelError> {
    let (b, p, _) = input.shape();
    if (b, p) != geometry.shape() {
        return Err(ModelError::BatchShape(format!(
            "signals are ({b}, {p}) but geometry is {:?}",
            geometry.shape()
        )));
    }
    Ok(())
}
