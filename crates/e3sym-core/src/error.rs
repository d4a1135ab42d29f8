//! # Error Types
//!
//! All errors are contract violations detected eagerly at the call that
//! caused them. Nothing here is transient, so there is no retry metadata.

use thiserror::Error;

/// Top-level error type for spherical-tensor operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum E3Error {
    /// A signal's length does not match its representation list.
    #[error("shape mismatch: representation needs {expected} coefficients, got {actual}")]
    ShapeMismatch {
        /// Coefficient count implied by the representation list.
        expected: usize,
        /// Length of the supplied signal.
        actual: usize,
    },

    /// A binary operation needs identical representation lists.
    #[error("incompatible representations: {left} vs {right}")]
    IncompatibleRepresentation {
        /// Representation list of the left operand.
        left: String,
        /// Representation list of the right operand.
        right: String,
    },

    /// Negative or unsupported degree or multiplicity.
    #[error("invalid degree: {0}")]
    InvalidDegree(String),

    /// A numeric argument outside its domain (zero direction, zero
    /// resolution, non-finite coordinate).
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}
