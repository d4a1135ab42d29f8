//! # Equivariant Model Interface
//!
//! A model maps per-point signals and positions to per-point signals:
//!
//! ```text
//! forward: (batch, points, rs_in.dim()) × (batch, points, 3)
//!          → (batch, points, rs_out.dim())
//! ```
//!
//! The network itself is out of scope here; implementations are injected,
//! and [`crate::stub::NeighborSum`] stands in for tests and the CLI.

use e3sym_core::Rs;

use crate::batch::{ensure_matching, GeometryBatch, SignalBatch};
use crate::error::ModelError;

/// A model over per-point spherical-tensor signals.
pub trait EquivariantModel {
    /// Representation of each input point signal.
    fn rs_in(&self) -> &Rs;

    /// Representation of each output point signal.
    fn rs_out(&self) -> &Rs;

    /// Evaluate the model.
    fn forward(&self, input: &SignalBatch, geometry: &GeometryBatch)
        -> Result<SignalBatch, ModelError>;
}

/// Run `model.forward` with both ends of the shape contract checked.
pub fn forward_checked<M: EquivariantModel + ?Sized>(
    model: &M,
    input: &SignalBatch,
    geometry: &GeometryBatch,
) -> Result<SignalBatch, ModelError> {
    ensure_matching(input, geometry)?;
    let (batch, points, dim) = input.shape();
    if dim != model.rs_in().dim() {
        return Err(ModelError::Forward(format!(
            "input has {dim} coefficients per point, model expects {} ({})",
            model.rs_in().dim(),
            model.rs_in()
        )));
    }
    let output = model.forward(input, geometry)?;
    let expected = (batch, points, model.rs_out().dim());
    if output.shape() != expected {
        return Err(ModelError::Forward(format!(
            "model returned shape {:?}, expected {expected:?}",
            output.shape()
        )));
    }
    Ok(output)
}
