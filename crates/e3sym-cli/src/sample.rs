//! # Sample Subcommand
//!
//! Samples a tensor as a radial surface for plotting. JSON output is the
//! serialized [`Surface`]; CSV output has one `x,y,z,value` row per point,
//! row-major in the polar angle.

use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use nalgebra::Vector3;

use e3sym_tensor::{PlotOptions, Surface};

use crate::config::CliConfig;
use crate::{parse_vector, read_tensor, write_json, write_text};

/// Output encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SampleFormat {
    #[default]
    Json,
    Csv,
}

/// Arguments for the `e3sym sample` subcommand.
#[derive(Args, Debug, Clone)]
pub struct SampleArgs {
    /// Tensor file (JSON or YAML).
    #[arg(long)]
    pub tensor: PathBuf,

    /// Points per grid axis (overrides the configured value).
    #[arg(long)]
    pub resolution: Option<usize>,

    /// Keep negative values instead of clipping them to zero.
    #[arg(long)]
    pub no_relu: bool,

    /// Surface center as `x,y,z`.
    #[arg(long, value_parser = parse_vector)]
    pub center: Option<Vector3<f64>>,

    /// Put every point on the unit sphere; only `values` carries the signal.
    #[arg(long)]
    pub unit_sphere: bool,

    /// Output format.
    #[arg(long, value_enum, default_value_t = SampleFormat::Json)]
    pub format: SampleFormat,

    /// Output path. Defaults to stdout.
    #[arg(long, short)]
    pub out: Option<PathBuf>,
}

/// Render a surface as CSV.
pub fn surface_csv(surface: &Surface) -> String {
    let mut out = String::from("x,y,z,value");
    for (p, v) in surface.points.iter().zip(&surface.values) {
        // Writing to a String cannot fail.
        let _ = write!(out, "\n{},{},{},{}", p[0], p[1], p[2], v);
    }
    out
}

/// Execute the sample subcommand.
pub fn run_sample(args: &SampleArgs, config: &CliConfig) -> Result<u8> {
    let tensor = read_tensor(&args.tensor)?;
    let options = PlotOptions {
        resolution: args.resolution.unwrap_or(config.resolution),
        relu: config.relu && !args.no_relu,
        center: args.center.map(|c| [c.x, c.y, c.z]),
        radius: !args.unit_sphere,
    };
    let surface = tensor
        .plot(&options)
        .with_context(|| format!("failed to sample {}", args.tensor.display()))?;
    tracing::info!(
        n_beta = surface.n_beta,
        n_alpha = surface.n_alpha,
        "sampled surface"
    );
    match args.format {
        SampleFormat::Json => write_json(&surface, args.out.as_deref())?,
        SampleFormat::Csv => write_text(&surface_csv(&surface), args.out.as_deref())?,
    }
    Ok(0)
}
