//! # e3sym CLI entry point
//!
//! Parses command-line arguments, resolves the layered configuration, and
//! dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use e3sym_cli::algebra::{run_couple, run_dot, CoupleArgs, DotArgs};
use e3sym_cli::config::CliConfig;
use e3sym_cli::geometry::{run_geometry, GeometryArgs};
use e3sym_cli::peaks::{run_peaks, PeaksArgs};
use e3sym_cli::sample::{run_sample, SampleArgs};
use e3sym_cli::symmetry::{run_symmetry, SymmetryArgs};
use e3sym_core::Precision;

/// e3sym: spherical tensors for E(3)-equivariance experiments.
///
/// Builds spherical-harmonic signals from point geometry, samples and
/// couples them, finds their peaks, and checks model symmetry on toy shapes.
#[derive(Parser, Debug)]
#[command(name = "e3sym", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a YAML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Precision of created tensors: single or double.
    #[arg(long, global = true)]
    precision: Option<Precision>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Project point vectors onto spherical harmonics.
    Geometry(GeometryArgs),

    /// Sample a tensor as a surface for plotting.
    Sample(SampleArgs),

    /// Clebsch–Gordan tensor product of two tensors.
    Couple(CoupleArgs),

    /// Inner product of two tensors.
    Dot(DotArgs),

    /// Local maxima of a tensor on the sphere.
    Peaks(PeaksArgs),

    /// Symmetry and equivariance checks of the reference model on a toy shape.
    Symmetry(SymmetryArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity level; RUST_LOG wins when set.
    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("e3sym CLI v{} starting", env!("CARGO_PKG_VERSION"));

    let mut config = match CliConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{e}");
            return ExitCode::from(1);
        }
    };
    if let Some(precision) = cli.precision {
        config.precision = precision;
    }
    tracing::debug!(?config, "resolved configuration");

    let result = match cli.command {
        Commands::Geometry(args) => run_geometry(&args, &config),
        Commands::Sample(args) => run_sample(&args, &config),
        Commands::Couple(args) => run_couple(&args),
        Commands::Dot(args) => run_dot(&args),
        Commands::Peaks(args) => run_peaks(&args, &config),
        Commands::Symmetry(args) => run_symmetry(&args, &config),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
