//! # Geometry Subcommand
//!
//! Projects point vectors onto real spherical harmonics and writes the
//! resulting tensor as JSON.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use nalgebra::Vector3;

use e3sym_tensor::{GeometryOptions, SphericalTensor};

use crate::config::CliConfig;
use crate::{parse_vector, write_json};

/// Arguments for the `e3sym geometry` subcommand.
#[derive(Args, Debug, Clone)]
pub struct GeometryArgs {
    /// Point vector as `x,y,z`. Repeat for several points.
    #[arg(long = "vector", short = 'p', value_parser = parse_vector, required = true)]
    pub vectors: Vec<Vector3<f64>>,

    /// Highest harmonic degree (overrides the configured value).
    #[arg(long)]
    pub lmax: Option<u32>,

    /// Weight every point equally instead of by its length.
    #[arg(long)]
    pub no_radius: bool,

    /// Output path. Defaults to stdout.
    #[arg(long, short)]
    pub out: Option<PathBuf>,
}

/// Build the tensor described by `args`.
pub fn build_tensor(args: &GeometryArgs, config: &CliConfig) -> Result<SphericalTensor> {
    if args.vectors.is_empty() {
        bail!("at least one --vector is required");
    }
    let lmax = args.lmax.unwrap_or(config.lmax);
    let options = GeometryOptions {
        radius: !args.no_radius,
        precision: config.precision,
    };
    SphericalTensor::from_geometry_with(&args.vectors, lmax, options)
        .with_context(|| format!("failed to project {} vectors at lmax {lmax}", args.vectors.len()))
}

/// Execute the geometry subcommand.
pub fn run_geometry(args: &GeometryArgs, config: &CliConfig) -> Result<u8> {
    let tensor = build_tensor(args, config)?;
    tracing::info!(rs = %tensor.rs(), points = args.vectors.len(), "projected geometry");
    write_json(&tensor, args.out.as_deref())?;
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use e3sym_core::{Precision, Rs};

    fn args(vectors: Vec<Vector3<f64>>) -> GeometryArgs {
        GeometryArgs {
            vectors,
            lmax: Some(2),
            no_radius: false,
            out: None,
        }
    }

    #[test]
    fn builds_spherical_layout() {
        let t = build_tensor(&args(vec![Vector3::z()]), &CliConfig::default()).unwrap();
        assert_eq!(t.rs(), &Rs::spherical(2).unwrap());
    }

    #[test]
    fn config_supplies_lmax_and_precision() {
        let config = CliConfig {
            lmax: 3,
            precision: Precision::Single,
            ..CliConfig::default()
        };
        let a = GeometryArgs {
            lmax: None,
            ..args(vec![Vector3::x()])
        };
        let t = build_tensor(&a, &config).unwrap();
        assert_eq!(t.rs().spherical_lmax(), Some(3));
        assert_eq!(t.precision(), Precision::Single);
    }

    #[test]
    fn lmax_above_maximum_fails() {
        let a = GeometryArgs {
            lmax: Some(99),
            ..args(vec![Vector3::x()])
        };
        assert!(build_tensor(&a, &CliConfig::default()).is_err());
    }

    #[test]
    fn no_radius_ignores_lengths() {
        let long = build_tensor(
            &GeometryArgs {
                no_radius: true,
                ..args(vec![Vector3::new(0.0, 0.0, 5.0)])
            },
            &CliConfig::default(),
        )
        .unwrap();
        let unit = build_tensor(&args(vec![Vector3::z()]), &CliConfig::default()).unwrap();
        assert!(long.approx_eq(&unit, 1e-12));
    }
}
