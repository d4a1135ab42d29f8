//! # e3sym-tensor: Spherical Tensors
//!
//! A [`SphericalTensor`] is a truncated real spherical-harmonic expansion: a
//! band-limited function on the unit sphere, stored as coefficients plus the
//! representation list ([`e3sym_core::Rs`]) that cuts them into blocks.
//!
//! - **Harmonics** (`harmonics.rs`): orthonormal real spherical harmonics,
//!   evaluated without trigonometry.
//!
//! - **Quadrature** (`quadrature.rs`): Gauss–Legendre × uniform azimuth rule,
//!   exact for products of harmonics up to a given degree.
//!
//! - **Clebsch–Gordan** (`clebsch_gordan.rs`): real coupling tensors and a
//!   per-call memo of them.
//!
//! - **Wigner D** (`wigner.rs`): real rotation matrices per degree.
//!
//! - **Spherical tensor** (`spherical.rs`): construction from literal signals
//!   and from point geometry, algebra, evaluation, rotation.
//!
//! - **Coupling** (`coupling.rs`): the Clebsch–Gordan tensor product.
//!
//! - **Sampling** (`sampling.rs`): grids, surface plots, peak search.
//!
//! ## Equivariance
//!
//! For every proper rotation `R`:
//!
//! ```text
//! from_geometry(R v)          == from_geometry(v).rotate(R)
//! a.rotate(R).couple(b.rotate(R)) == a.couple(b).rotate(R)
//! peaks(t.rotate(R))          == R · peaks(t)
//! ```
//!
//! up to the tolerances in [`e3sym_core::tolerance`].
//!
//! ## Crate Policy
//!
//! - Pure, single-threaded computation; every value is `Send + Sync`.
//! - No global state: coupling tensors are memoised per call.
//! - No `.unwrap()` outside tests.

pub mod clebsch_gordan;
pub mod coupling;
pub mod harmonics;
pub mod quadrature;
pub mod sampling;
pub mod spherical;
pub mod wigner;

pub use clebsch_gordan::{real_clebsch_gordan, CouplingCache, CouplingTensor};
pub use coupling::coupled_rs;
pub use harmonics::{sh_dim, sh_index, spherical_harmonics};
pub use sampling::{Peak, PeakOptions, PlotOptions, SphereGrid, Surface};
pub use spherical::{GeometryOptions, SphericalTensor};
pub use wigner::{wigner_d, wigner_d_matrices, WignerD};
