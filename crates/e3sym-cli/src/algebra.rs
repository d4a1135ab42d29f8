//! # Couple and Dot Subcommands
//!
//! Binary operations on two tensor files. Results keep the coarser
//! precision of the operands; the configured precision only applies to
//! tensors the CLI creates.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use crate::{read_tensor, write_json};

/// Arguments for the `e3sym couple` subcommand.
#[derive(Args, Debug, Clone)]
pub struct CoupleArgs {
    /// Left operand (JSON or YAML).
    #[arg(long)]
    pub left: PathBuf,

    /// Right operand (JSON or YAML).
    #[arg(long)]
    pub right: PathBuf,

    /// Output path. Defaults to stdout.
    #[arg(long, short)]
    pub out: Option<PathBuf>,
}

/// Arguments for the `e3sym dot` subcommand.
#[derive(Args, Debug, Clone)]
pub struct DotArgs {
    /// Left operand (JSON or YAML).
    #[arg(long)]
    pub left: PathBuf,

    /// Right operand (JSON or YAML).
    #[arg(long)]
    pub right: PathBuf,
}

/// Execute the couple subcommand.
pub fn run_couple(args: &CoupleArgs) -> Result<u8> {
    let left = read_tensor(&args.left)?;
    let right = read_tensor(&args.right)?;
    let product = left
        .couple(&right)
        .with_context(|| format!("failed to couple {} with {}", left.rs(), right.rs()))?;
    tracing::info!(rs = %product.rs(), "coupled tensors");
    write_json(&product, args.out.as_deref())?;
    Ok(0)
}

/// Execute the dot subcommand. Prints the inner product.
pub fn run_dot(args: &DotArgs) -> Result<u8> {
    let left = read_tensor(&args.left)?;
    let right = read_tensor(&args.right)?;
    let dot = left.dot(&right).context("failed to take inner product")?;
    println!("{dot}");
    Ok(0)
}
