//! # e3sym-cli: Command-Line Front End
//!
//! Provides the `e3sym` binary. Tensors travel between subcommands as JSON
//! files (`{"rs": [[1,0],[1,1]], "signal": [...], "precision": "double"}`);
//! YAML is accepted on input.
//!
//! ## Subcommands
//!
//! - `e3sym geometry`: project point vectors onto spherical harmonics.
//! - `e3sym sample`: sample a tensor as a surface (JSON or CSV).
//! - `e3sym couple`: Clebsch–Gordan product of two tensors.
//! - `e3sym dot`: inner product of two tensors.
//! - `e3sym peaks`: local maxima of a tensor on the sphere.
//! - `e3sym symmetry`: run the reference model on a toy shape and check
//!   that its outputs respect the shape's symmetries.
//!
//! ```bash
//! e3sym geometry --vector 0,0,1 --vector 1,0,0 --lmax 3 --out t.json
//! e3sym peaks --tensor t.json
//! e3sym symmetry --shape square -v
//! ```
//!
//! Every handler returns `anyhow::Result<u8>`: `Ok(0)` on success, `Ok(1)`
//! for a failed check, `Err` for anything that prevented the run.

pub mod algebra;
pub mod config;
pub mod geometry;
pub mod peaks;
pub mod sample;
pub mod symmetry;

use std::path::Path;

use anyhow::{bail, Context, Result};
use nalgebra::Vector3;
use serde::Serialize;

use e3sym_tensor::SphericalTensor;

/// Parse `x,y,z` into a vector. Used as a clap value parser.
pub fn parse_vector(s: &str) -> Result<Vector3<f64>, String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    if parts.len() != 3 {
        return Err(format!("expected x,y,z but got {s:?}"));
    }
    let mut xyz = [0.0; 3];
    for (slot, part) in xyz.iter_mut().zip(&parts) {
        *slot = part
            .parse::<f64>()
            .map_err(|e| format!("invalid coordinate {part:?}: {e}"))?;
        if !slot.is_finite() {
            return Err(format!("coordinate {part:?} is not finite"));
        }
    }
    Ok(Vector3::from(xyz))
}

/// Read a tensor from a JSON or YAML file (chosen by extension).
pub fn read_tensor(path: &Path) -> Result<SphericalTensor> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read tensor file: {}", path.display()))?;
    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );
    let tensor = if is_yaml {
        serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse tensor YAML: {}", path.display()))?
    } else {
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse tensor JSON: {}", path.display()))?
    };
    tracing::debug!(path = %path.display(), "loaded tensor");
    Ok(tensor)
}

/// Write `value` as pretty JSON to `out`, or to stdout when `out` is `None`.
pub fn write_json<T: Serialize>(value: &T, out: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    write_text(&json, out)
}

/// Write text to `out`, or to stdout when `out` is `None`. A trailing newline
/// is added.
pub fn write_text(text: &str, out: Option<&Path>) -> Result<()> {
    match out {
        Some(path) => {
            if path.as_os_str().is_empty() {
                bail!("output path is empty");
            }
            std::fs::write(path, format!("{text}\n"))
                .with_context(|| format!("failed to write output: {}", path.display()))?;
            tracing::info!(path = %path.display(), "wrote output");
        }
        None => println!("{text}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_vector() {
        let v = parse_vector("1, -2.5,3e-1").unwrap();
        assert_eq!(v, Vector3::new(1.0, -2.5, 0.3));
    }

    #[test]
    fn test_parse_vector_rejects_bad_input() {
        assert!(parse_vector("1,2").is_err());
        assert!(parse_vector("1,2,x").is_err());
        assert!(parse_vector("1,2,inf").is_err());
    }
}
