//! Errors raised by batch construction and model evaluation.

use e3sym_core::E3Error;
use thiserror::Error;

/// Error type for the model-side utilities.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    /// Underlying spherical-tensor error.
    #[error(transparent)]
    Tensor(#[from] E3Error),

    /// A batch's data does not fit its declared shape, or two batches
    /// disagree on batch/point counts.
    #[error("batch shape error: {0}")]
    BatchShape(String),

    /// The model rejected its input or produced an output of the wrong shape.
    #[error("model forward failed: {0}")]
    Forward(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tensor_error_is_transparent() {
        let err: ModelError = E3Error::InvalidDegree("degree -1 is negative".into()).into();
        assert_eq!(err.to_string(), "invalid degree: degree -1 is negative");
    }

    #[test]
    fn test_batch_shape_display() {
        let err = ModelError::BatchShape("expected 12 values, got 10".into());
        assert!(err.to_string().starts_with("batch shape error"));
    }
}
