//! Reference model: every point receives the projection of its neighbours'
//! relative positions.
//!
//! `out_i = in_i + Σ_{j≠i} from_geometry(r_j − r_i, lmax)`
//!
//! Relative positions rotate with the frame, so the output is equivariant by
//! construction.

use e3sym_core::{E3Error, Rs};
use e3sym_tensor::SphericalTensor;

use crate::batch::{ensure_matching, GeometryBatch, SignalBatch};
use crate::error::ModelError;
use crate::model::EquivariantModel;

/// Neighbour-sum model with input and output `[(1,0), ..., (1,lmax)]`.
#[derive(Debug, Clone, PartialEq)]
pub struct NeighborSum {
    lmax: u32,
    rs: Rs,
}

impl NeighborSum {
    /// Model for harmonics up to `lmax`.
    pub fn new(lmax: u32) -> Result<Self, E3Error> {
        Ok(Self {
            lmax,
            rs: Rs::spherical(lmax)?,
        })
    }

    /// Highest degree.
    pub fn lmax(&self) -> u32 {
        self.lmax
    }
}

impl EquivariantModel for NeighborSum {
    fn rs_in(&self) -> &Rs {
        &self.rs
    }

    fn rs_out(&self) -> &Rs {
        &self.rs
    }

    fn forward(
        &self,
        input: &SignalBatch,
        geometry: &GeometryBatch,
    ) -> Result<SignalBatch, ModelError> {
        ensure_matching(input, geometry)?;
        let (batch, points, dim) = input.shape();
        if dim != self.rs.dim() {
            return Err(ModelError::Forward(format!(
                "neighbour sum needs {} coefficients per point, got {dim}",
                self.rs.dim()
            )));
        }
        let mut output = SignalBatch::zeros(batch, points, dim);
        for b in 0..batch {
            let positions = geometry.positions(b);
            for (i, ri) in positions.iter().enumerate() {
                let relative: Vec<_> = positions
                    .iter()
                    .enumerate()
                    .filter(|(j, _)| *j != i)
                    .map(|(_, rj)| rj - ri)
                    .collect();
                let neighbours = SphericalTensor::from_geometry(&relative, self.lmax)?;
                let own = input.tensor(b, i, &self.rs)?;
                output
                    .signal_mut(b, i)
                    .copy_from_slice(own.try_add(&neighbours)?.signal());
            }
        }
        tracing::debug!(batch, points, lmax = self.lmax, "neighbour sum forward");
        Ok(output)
    }
}
