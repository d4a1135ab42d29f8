//! # CLI Workflow Integration Tests
//!
//! Drives the subcommand handlers end to end through files in a temporary
//! directory, plus a smoke test of the built binary.

use std::path::{Path, PathBuf};
use std::process::Command;

use e3sym_cli::algebra::{run_couple, CoupleArgs};
use e3sym_cli::config::CliConfig;
use e3sym_cli::geometry::{run_geometry, GeometryArgs};
use e3sym_cli::peaks::{run_peaks, PeaksArgs};
use e3sym_cli::read_tensor;
use e3sym_cli::sample::{run_sample, SampleArgs, SampleFormat};
use e3sym_core::{Precision, Rs};
use e3sym_tensor::{Peak, Surface};
use nalgebra::Vector3;

fn make_dir() -> tempfile::TempDir {
    tempfile::tempdir().unwrap()
}

fn write_geometry(dir: &Path, name: &str, vectors: Vec<Vector3<f64>>, lmax: u32) -> PathBuf {
    let out = dir.join(name);
    let args = GeometryArgs {
        vectors,
        lmax: Some(lmax),
        no_radius: false,
        out: Some(out.clone()),
    };
    assert_eq!(run_geometry(&args, &CliConfig::default()).unwrap(), 0);
    out
}

// ---------------------------------------------------------------------------
// 1. Geometry → peaks
// ---------------------------------------------------------------------------

#[test]
fn geometry_then_peaks_finds_input_direction() {
    let dir = make_dir();
    let tensor = write_geometry(dir.path(), "t.json", vec![Vector3::new(0.0, 1.0, 0.0)], 4);
    let out = dir.path().join("peaks.json");
    let args = PeaksArgs {
        tensor: tensor.clone(),
        resolution: Some(20),
        min_separation: 0.1,
        out: Some(out.clone()),
    };
    assert_eq!(run_peaks(&args, &CliConfig::default()).unwrap(), 0);
    let peaks: Vec<Peak> = serde_json::from_str(&std::fs::read_to_string(out).unwrap()).unwrap();
    let top = Vector3::from(peaks[0].direction);
    assert!((top - Vector3::y()).norm() < 1e-4);
}

// ---------------------------------------------------------------------------
// 2. Geometry → couple
// ---------------------------------------------------------------------------

#[test]
fn couple_writes_merged_representation() {
    let dir = make_dir();
    let a = write_geometry(dir.path(), "a.json", vec![Vector3::x()], 1);
    let b = write_geometry(dir.path(), "b.json", vec![Vector3::z()], 1);
    let out = dir.path().join("ab.json");
    let args = CoupleArgs {
        left: a,
        right: b,
        out: Some(out.clone()),
    };
    assert_eq!(run_couple(&args).unwrap(), 0);
    let product = read_tensor(&out).unwrap();
    // (0 + 1) ⊗ (0 + 1) = 0 ⊗ 0, 0 ⊗ 1, 1 ⊗ 0, 1 ⊗ 1.
    assert_eq!(
        product.rs(),
        &Rs::new([(2, 0), (3, 1), (1, 2)]).unwrap()
    );
}

#[test]
fn couple_keeps_coarser_operand_precision() {
    let dir = make_dir();
    let left = write_geometry(dir.path(), "a.json", vec![Vector3::z()], 0);
    let right = dir.path().join("b.yaml");
    std::fs::write(&right, "rs: [[1, 0]]\nsignal: [0.1]\nprecision: single\n").unwrap();
    let out = dir.path().join("ab.json");
    let args = CoupleArgs {
        left,
        right,
        out: Some(out.clone()),
    };
    assert_eq!(run_couple(&args).unwrap(), 0);
    let product = read_tensor(&out).unwrap();
    assert_eq!(product.precision(), Precision::Single);
    assert_eq!(product.rs(), &Rs::spherical(0).unwrap());
}

// ---------------------------------------------------------------------------
// 3. Sampling
// ---------------------------------------------------------------------------

#[test]
fn sample_json_and_csv() {
    let dir = make_dir();
    let tensor = write_geometry(dir.path(), "t.json", vec![Vector3::z()], 2);
    let json_out = dir.path().join("surface.json");
    let mut args = SampleArgs {
        tensor,
        resolution: Some(6),
        no_relu: false,
        center: Some(Vector3::new(1.0, 0.0, 0.0)),
        unit_sphere: false,
        format: SampleFormat::Json,
        out: Some(json_out.clone()),
    };
    assert_eq!(run_sample(&args, &CliConfig::default()).unwrap(), 0);
    let surface: Surface =
        serde_json::from_str(&std::fs::read_to_string(&json_out).unwrap()).unwrap();
    assert_eq!(surface.points.len(), 36);
    assert!(surface.values.iter().all(|v| *v >= 0.0));

    let csv_out = dir.path().join("surface.csv");
    args.format = SampleFormat::Csv;
    args.out = Some(csv_out.clone());
    assert_eq!(run_sample(&args, &CliConfig::default()).unwrap(), 0);
    let csv = std::fs::read_to_string(csv_out).unwrap();
    assert_eq!(csv.lines().count(), 37);
    assert!(csv.starts_with("x,y,z,value"));
}

// ---------------------------------------------------------------------------
// 4. Input validation
// ---------------------------------------------------------------------------

#[test]
fn tensor_file_with_wrong_length_is_rejected() {
    let dir = make_dir();
    let path = dir.path().join("bad.json");
    std::fs::write(&path, r#"{"rs": [[1, 1]], "signal": [1.0], "precision": "double"}"#).unwrap();
    assert!(read_tensor(&path).is_err());
}

#[test]
fn yaml_tensor_is_accepted() {
    let dir = make_dir();
    let path = dir.path().join("t.yaml");
    std::fs::write(&path, "rs: [[1, 0]]\nsignal: [2.0]\nprecision: single\n").unwrap();
    let t = read_tensor(&path).unwrap();
    assert_eq!(t.signal(), &[2.0]);
}

#[test]
fn missing_file_is_an_error() {
    assert!(read_tensor(Path::new("/nonexistent/e3sym/tensor.json")).is_err());
}

// ---------------------------------------------------------------------------
// 5. Binary
// ---------------------------------------------------------------------------

#[test]
fn binary_geometry_then_dot() {
    let dir = make_dir();
    let bin = env!("CARGO_BIN_EXE_e3sym");
    let path = dir.path().join("t.json");
    let status = Command::new(bin)
        .args(["geometry", "--vector", "0,0,2", "--lmax", "2", "--out"])
        .arg(&path)
        .status()
        .unwrap();
    assert!(status.success());

    let output = Command::new(bin)
        .args(["dot", "--left"])
        .arg(&path)
        .arg("--right")
        .arg(&path)
        .output()
        .unwrap();
    assert!(output.status.success());
    let dot: f64 = String::from_utf8(output.stdout).unwrap().trim().parse().unwrap();
    // |2 Y(z)|² summed over l ≤ 2 is 4 · Σ (2l+1)/(4π).
    let expected = 4.0 * 9.0 / (4.0 * std::f64::consts::PI);
    assert!((dot - expected).abs() < 1e-9);
}

#[test]
fn binary_rejects_negative_lmax_from_env() {
    let output = Command::new(env!("CARGO_BIN_EXE_e3sym"))
        .args(["geometry", "--vector", "1,0,0"])
        .env("E3SYM_LMAX", "-1")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
}
