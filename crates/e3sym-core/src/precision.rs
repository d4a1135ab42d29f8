//! # Numeric Precision
//!
//! Replaces a process-wide default float width with a value carried by each
//! tensor. Coefficients are stored as `f64`; a `Single` tensor rounds every
//! stored coefficient through `f32`, so results match what a 32-bit pipeline
//! would hold.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::E3Error;
use crate::tolerance;

/// Floating-point width of a tensor's stored coefficients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Precision {
    /// IEEE 754 binary32.
    Single,
    /// IEEE 754 binary64.
    #[default]
    Double,
}

impl Precision {
    /// Round a value to this precision.
    pub fn round(self, x: f64) -> f64 {
        match self {
            Self::Single => f64::from(x as f32),
            Self::Double => x,
        }
    }

    /// Round every value of a slice in place.
    pub fn round_all(self, values: &mut [f64]) {
        if self == Self::Single {
            for v in values.iter_mut() {
                *v = f64::from(*v as f32);
            }
        }
    }

    /// Machine epsilon of the width.
    pub fn epsilon(self) -> f64 {
        match self {
            Self::Single => f64::from(f32::EPSILON),
            Self::Double => f64::EPSILON,
        }
    }

    /// Default absolute tolerance for comparisons at this width.
    pub fn tolerance(self) -> f64 {
        match self {
            Self::Single => tolerance::SINGLE,
            Self::Double => tolerance::DOUBLE,
        }
    }

    /// The less precise of two widths; binary operations produce it.
    pub fn coarser(self, other: Self) -> Self {
        if self == Self::Single || other == Self::Single {
            Self::Single
        } else {
            Self::Double
        }
    }

    /// Identifier string, as accepted by [`FromStr`].
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Double => "double",
        }
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Precision {
    type Err = E3Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "single" | "f32" | "float32" => Ok(Self::Single),
            "double" | "f64" | "float64" => Ok(Self::Double),
            other => Err(E3Error::InvalidParameter(format!(
                "unknown precision {other:?}; expected single or double"
            ))),
        }
    }
}
