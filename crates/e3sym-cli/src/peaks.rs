//! # Peaks Subcommand
//!
//! Writes the local maxima of a tensor as a JSON array of
//! `{"direction": [x, y, z], "value": v}`, largest first.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use e3sym_tensor::PeakOptions;

use crate::config::CliConfig;
use crate::{read_tensor, write_json};

/// Arguments for the `e3sym peaks` subcommand.
#[derive(Args, Debug, Clone)]
pub struct PeaksArgs {
    /// Tensor file (JSON or YAML).
    #[arg(long)]
    pub tensor: PathBuf,

    /// Polar resolution of the search grid (overrides the configured value).
    #[arg(long)]
    pub resolution: Option<usize>,

    /// Peaks closer than this angle in radians are merged.
    #[arg(long, default_value_t = 0.1)]
    pub min_separation: f64,

    /// Output path. Defaults to stdout.
    #[arg(long, short)]
    pub out: Option<PathBuf>,
}

/// Execute the peaks subcommand.
pub fn run_peaks(args: &PeaksArgs, config: &CliConfig) -> Result<u8> {
    let tensor = read_tensor(&args.tensor)?;
    let options = PeakOptions {
        resolution: args.resolution.unwrap_or(config.resolution),
        min_separation: args.min_separation,
    };
    let peaks = tensor
        .find_peaks(&options)
        .with_context(|| format!("peak search failed for {}", args.tensor.display()))?;
    tracing::info!(count = peaks.len(), "found peaks");
    write_json(&peaks, args.out.as_deref())?;
    Ok(0)
}
