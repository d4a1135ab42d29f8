//! CLI configuration.
//!
//! Layered, later layers winning: built-in defaults, then an optional YAML
//! file (`--config`), then environment variables, then command flags (applied
//! by each subcommand).
//!
//! Variables:
//! - `E3SYM_PRECISION` (`single` | `double`, default `double`)
//! - `E3SYM_LMAX` (default 4)
//! - `E3SYM_RESOLUTION` (default 40)
//! - `E3SYM_TOLERANCE` (default 1e-6)

use std::path::Path;

use serde::{Deserialize, Serialize};

use e3sym_core::{checked_degree, Precision};

/// Effective settings shared by all subcommands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    /// Precision of tensors the CLI creates.
    pub precision: Precision,
    /// Highest harmonic degree for geometry projection.
    pub lmax: u32,
    /// Grid resolution for sampling and peak search.
    pub resolution: usize,
    /// Tolerance for symmetry and equivariance checks.
    pub tolerance: f64,
    /// Clip negative values when sampling a surface.
    pub relu: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            precision: Precision::Double,
            lmax: 4,
            resolution: 40,
            tolerance: 1e-6,
            relu: true,
        }
    }
}

impl CliConfig {
    /// Defaults, overlaid with `path` (if any) and the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let base = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        base.with_env(|var| std::env::var(var).ok())
    }

    /// Defaults overlaid with a YAML file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Read(path.display().to_string(), e.to_string()))?;
        let config: Self = serde_yaml::from_str(&content)
            .map_err(|e| ConfigError::Parse(path.display().to_string(), e.to_string()))?;
        config.validate()?;
        tracing::debug!(path = %path.display(), "loaded config file");
        Ok(config)
    }

    /// Overlay variables read through `lookup`.
    pub fn with_env(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(raw) = lookup("E3SYM_PRECISION") {
            self.precision = raw
                .parse()
                .map_err(|_| ConfigError::InvalidEnv("E3SYM_PRECISION".into(), raw.clone()))?;
        }
        if let Some(raw) = lookup("E3SYM_LMAX") {
            self.lmax = raw
                .trim()
                .parse::<i64>()
                .ok()
                .and_then(|l| checked_degree(l).ok())
                .ok_or_else(|| ConfigError::InvalidEnv("E3SYM_LMAX".into(), raw.clone()))?;
        }
        if let Some(raw) = lookup("E3SYM_RESOLUTION") {
            self.resolution = raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidEnv("E3SYM_RESOLUTION".into(), raw.clone()))?;
        }
        if let Some(raw) = lookup("E3SYM_TOLERANCE") {
            self.tolerance = raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidEnv("E3SYM_TOLERANCE".into(), raw.clone()))?;
        }
        self.validate()?;
        Ok(self)
    }

    /// Check ranges: `lmax <= MAX_DEGREE`, `resolution >= 2`, positive
    /// finite tolerance.
    pub fn validate(&self) -> Result<(), ConfigError> {
        checked_degree(i64::from(self.lmax)).map_err(|e| ConfigError::Invalid(e.to_string()))?;
        if self.resolution < 2 {
            return Err(ConfigError::Invalid(format!(
                "resolution must be at least 2, got {}",
                self.resolution
            )));
        }
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "tolerance must be positive, got {}",
                self.tolerance
            )));
        }
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {0}: {1}")]
    Read(String, String),
    #[error("failed to parse config file {0}: {1}")]
    Parse(String, String),
    #[error("invalid value for {0}: {1:?}")]
    InvalidEnv(String, String),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
