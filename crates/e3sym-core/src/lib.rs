//! # e3sym-core: Foundational Types
//!
//! Leaf crate of the e3sym workspace. It defines the vocabulary every other
//! crate speaks: representation lists, numeric precision, comparison
//! tolerances, and the error hierarchy.
//!
//! ## Key Design Principles
//!
//! 1. **Validated representation lists.** An [`Rs`] can only be built through
//!    constructors that reject negative or oversized degrees. Deserialization
//!    goes through the same path, so a JSON file cannot smuggle in `-1`.
//!
//! 2. **Explicit precision.** There is no process-wide float width. Every
//!    tensor carries its [`Precision`], chosen at construction, defaulting to
//!    double.
//!
//! 3. **Epsilon comparisons only.** Floating-point equality checks go through
//!    the tolerances in [`tolerance`].
//!
//! ## Crate Policy
//!
//! - No dependencies on other `e3sym-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod irreps;
pub mod precision;
pub mod tolerance;

pub use error::E3Error;
pub use irreps::{checked_degree, Block, Irrep, Rs, MAX_DEGREE};
pub use precision::Precision;
