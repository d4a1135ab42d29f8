//! # e3sym-model: Model-Side Utilities
//!
//! Everything a tutorial needs around an equivariant model without
//! implementing one:
//!
//! - **Batches** (`batch.rs`): `(batch, points, dim)` signals and
//!   `(batch, points, 3)` positions.
//!
//! - **Model** (`model.rs`): the [`EquivariantModel`] interface and a
//!   shape-checked forward call.
//!
//! - **Rotation** (`rotation.rs`): the [`Rotator`] interface, ZYZ Euler
//!   angles, uniform random rotations.
//!
//! - **Geometry** (`geometry.rs`): square and rectangle point sets.
//!
//! - **Symmetry** (`symmetry.rs`): symmetry detection, equivariance and
//!   output-symmetry checks.
//!
//! - **Stub** (`stub.rs`): [`NeighborSum`], an equivariant reference model.

pub mod batch;
pub mod error;
pub mod geometry;
pub mod model;
pub mod rotation;
pub mod stub;
pub mod symmetry;

pub use batch::{GeometryBatch, SignalBatch};
pub use error::ModelError;
pub use geometry::{rectangle, square};
pub use model::{forward_checked, EquivariantModel};
pub use rotation::{random_angles, random_rotation, EulerRotator, Rotator};
pub use stub::NeighborSum;
pub use symmetry::{
    check_equivariance, check_output_symmetry, find_symmetries, planar_rotations,
    EquivarianceReport, Symmetry,
};
