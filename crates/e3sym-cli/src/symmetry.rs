//! # Symmetry Subcommand
//!
//! Runs the neighbour-sum reference model on a toy shape with one invariant
//! scalar per point, then checks that
//!
//! 1. outputs at symmetry-related points are related by the symmetry's
//!    Wigner D matrices, and
//! 2. rotating the whole input commutes with the model for a set of seeded
//!    random rotations.
//!
//! Prints a JSON report. Exit code 1 when either check fails.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use nalgebra::Vector3;
use rand::rngs::StdRng;
use rand::SeedableRng;

use e3sym_model::{
    check_equivariance, check_output_symmetry, find_symmetries, planar_rotations, random_angles,
    rectangle, square, EquivariantModel, EulerRotator, GeometryBatch, NeighborSum, SignalBatch,
};

use crate::config::CliConfig;
use crate::write_json;

/// Toy shapes in the xy-plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Shape {
    Square,
    Rectangle,
}

/// Arguments for the `e3sym symmetry` subcommand.
#[derive(Args, Debug, Clone)]
pub struct SymmetryArgs {
    /// Shape to analyse.
    #[arg(long, value_enum)]
    pub shape: Shape,

    /// Side length of the square, or width of the rectangle.
    #[arg(long, default_value_t = 1.0)]
    pub width: f64,

    /// Height of the rectangle.
    #[arg(long, default_value_t = 0.5)]
    pub height: f64,

    /// Highest harmonic degree (overrides the configured value).
    #[arg(long)]
    pub lmax: Option<u32>,

    /// Check tolerance (overrides the configured value).
    #[arg(long)]
    pub tolerance: Option<f64>,

    /// Number of random rotations for the equivariance check.
    #[arg(long, default_value_t = 10)]
    pub rotations: usize,

    /// Seed for the random rotations.
    #[arg(long, default_value_t = 0)]
    pub seed: u64,

    /// Output path. Defaults to stdout.
    #[arg(long, short)]
    pub out: Option<PathBuf>,
}

fn shape_points(args: &SymmetryArgs) -> Vec<Vector3<f64>> {
    match args.shape {
        Shape::Square => square(args.width),
        Shape::Rectangle => rectangle(args.width, args.height),
    }
}

/// Execute the symmetry subcommand.
pub fn run_symmetry(args: &SymmetryArgs, config: &CliConfig) -> Result<u8> {
    let lmax = args.lmax.unwrap_or(config.lmax);
    let tol = args.tolerance.unwrap_or(config.tolerance);
    let model = NeighborSum::new(lmax).context("failed to build reference model")?;

    let points = shape_points(args);
    let geometry = GeometryBatch::single(&points)?;
    let dim = model.rs_in().dim();
    let mut input = SignalBatch::zeros(1, points.len(), dim);
    for p in 0..points.len() {
        input.signal_mut(0, p)[0] = 1.0;
    }

    let symmetries = find_symmetries(&points, &planar_rotations(4), tol);
    tracing::info!(shape = ?args.shape, count = symmetries.len(), "detected symmetries");
    let output_check = check_output_symmetry(&model, &input, &geometry, &symmetries, tol)
        .context("output symmetry check failed to run")?;

    let mut rng = StdRng::seed_from_u64(args.seed);
    let angles: Vec<[f64; 3]> = (0..args.rotations).map(|_| random_angles(&mut rng)).collect();
    let equivariance = check_equivariance(&model, &EulerRotator, &input, &geometry, &angles, tol)
        .context("equivariance check failed to run")?;

    let passed = output_check.passed() && equivariance.passed();
    let report = serde_json::json!({
        "shape": format!("{:?}", args.shape).to_lowercase(),
        "lmax": lmax,
        "symmetries": symmetries.iter().map(|s| serde_json::json!({
            "angle": s.angle(),
            "axis": s.axis(),
            "permutation": s.permutation,
        })).collect::<Vec<_>>(),
        "output_symmetry": output_check,
        "equivariance": equivariance,
        "passed": passed,
    });
    write_json(&report, args.out.as_deref())?;

    if passed {
        eprintln!("OK: outputs respect all {} symmetries", symmetries.len());
        Ok(0)
    } else {
        eprintln!(
            "FAIL: max symmetry error {:.3e}, max equivariance error {:.3e} (tolerance {tol:e})",
            output_check.max_error, equivariance.max_error
        );
        Ok(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(shape: Shape) -> SymmetryArgs {
        SymmetryArgs {
            shape,
            width: 1.0,
            height: 0.5,
            lmax: Some(3),
            tolerance: None,
            rotations: 3,
            seed: 1,
            out: None,
        }
    }

    #[test]
    fn shapes_have_four_points() {
        assert_eq!(shape_points(&args(Shape::Square)).len(), 4);
        assert_eq!(shape_points(&args(Shape::Rectangle)).len(), 4);
    }

    #[test]
    fn reference_model_passes_on_square() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("report.json");
        let a = SymmetryArgs {
            out: Some(out.clone()),
            ..args(Shape::Square)
        };
        assert_eq!(run_symmetry(&a, &CliConfig::default()).unwrap(), 0);
        let report: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(out).unwrap()).unwrap();
        assert_eq!(report["passed"], true);
        assert_eq!(report["symmetries"].as_array().unwrap().len(), 8);
    }
}
