//! # Symmetry and Equivariance Checks
//!
//! - [`find_symmetries`]: which candidate rotations map a point set onto
//!   itself, with the induced point permutation.
//! - [`check_equivariance`]: rotating inputs and geometry before the model
//!   must match rotating its output afterwards.
//! - [`check_output_symmetry`]: on a symmetric geometry with invariant input,
//!   the output at `σ(i)` must equal `D(g)` applied to the output at `i`.
//!
//! Both checks report the largest coefficient deviation per rotation; a
//! check passes when every deviation is within the tolerance.

use std::f64::consts::{PI, TAU};

use nalgebra::{Rotation3, Unit, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use crate::batch::{GeometryBatch, SignalBatch};
use crate::error::ModelError;
use crate::model::{forward_checked, EquivariantModel};
use crate::rotation::Rotator;

/// A rotation that maps a point set onto itself.
#[derive(Debug, Clone, PartialEq)]
pub struct Symmetry {
    /// The rotation `g`.
    pub rotation: Rotation3<f64>,
    /// `permutation[i] = σ(i)` with `g · p_i = p_σ(i)`.
    pub permutation: Vec<usize>,
}

impl Symmetry {
    /// Rotation angle in radians, in `[0, π]`.
    pub fn angle(&self) -> f64 {
        self.rotation.angle()
    }

    /// Unit rotation axis, `None` for the identity.
    pub fn axis(&self) -> Option<[f64; 3]> {
        // Read off the quaternion; the matrix form loses the axis of half-turns.
        UnitQuaternion::from_rotation_matrix(&self.rotation)
            .axis()
            .map(|a| [a.x, a.y, a.z])
    }
}

/// Outcome of an equivariance or symmetry check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquivarianceReport {
    /// Largest deviation over all rotations.
    pub max_error: f64,
    /// Largest deviation for each rotation, in input order.
    pub per_rotation: Vec<f64>,
    /// Tolerance the check was run with.
    pub tolerance: f64,
}

impl EquivarianceReport {
    fn from_errors(per_rotation: Vec<f64>, tolerance: f64) -> Self {
        Self {
            max_error: per_rotation.iter().copied().fold(0.0, f64::max),
            per_rotation,
            tolerance,
        }
    }

    /// True when every deviation is within the tolerance.
    pub fn passed(&self) -> bool {
        self.max_error <= self.tolerance
    }
}

/// Candidate rotations for a planar shape in the xy-plane: the `n` rotations
/// about `z` by multiples of `2π/n`, then the `n` half-turns about in-plane
/// axes at multiples of `π/n` from `x`.
pub fn planar_rotations(n: usize) -> Vec<Rotation3<f64>> {
    let about_z = (0..n).map(|k| Rotation3::from_axis_angle(&Vector3::z_axis(), TAU * k as f64 / n as f64));
    let flips = (0..n).map(|k| {
        let t = PI * k as f64 / n as f64;
        let axis = Unit::new_normalize(Vector3::new(t.cos(), t.sin(), 0.0));
        Rotation3::from_axis_angle(&axis, PI)
    });
    about_z.chain(flips).collect()
}

/// Candidates that permute `points` within `tol`.
pub fn find_symmetries(
    points: &[Vector3<f64>],
    candidates: &[Rotation3<f64>],
    tol: f64,
) -> Vec<Symmetry> {
    let mut out = Vec::new();
    for rotation in candidates {
        let mut used = vec![false; points.len()];
        let mut permutation = Vec::with_capacity(points.len());
        for p in points {
            let image = rotation * p;
            let hit = points
                .iter()
                .enumerate()
                .find(|(j, q)| !used[*j] && (image - *q).norm() <= tol)
                .map(|(j, _)| j);
            match hit {
                Some(j) => {
                    used[j] = true;
                    permutation.push(j);
                }
                None => break,
            }
        }
        if permutation.len() == points.len() {
            out.push(Symmetry {
                rotation: *rotation,
                permutation,
            });
        }
    }
    tracing::debug!(
        candidates = candidates.len(),
        found = out.len(),
        "symmetry search"
    );
    out
}

/// Compare `model(R·input, R·geometry)` with `R·model(input, geometry)` for
/// each angle triple.
pub fn check_equivariance<M, R>(
    model: &M,
    rotator: &R,
    input: &SignalBatch,
    geometry: &GeometryBatch,
    rotations: &[[f64; 3]],
    tol: f64,
) -> Result<EquivarianceReport, ModelError>
where
    M: EquivariantModel + ?Sized,
    R: Rotator + ?Sized,
{
    let baseline = forward_checked(model, input, geometry)?;
    let (batch, points) = geometry.shape();
    let mut errors = Vec::with_capacity(rotations.len());
    for &angles in rotations {
        let r = rotator.rotation_matrix(angles);
        let mut positions = Vec::with_capacity(batch * points);
        for b in 0..batch {
            positions.extend(
                rotator
                    .rotate(&geometry.positions(b), angles)
                    .iter()
                    .map(|p| [p.x, p.y, p.z]),
            );
        }
        let rotated_geometry = GeometryBatch::new(batch, points, positions)?;
        let rotated_input = input.map_tensors(model.rs_in(), |t| t.rotate(&r))?;
        let output = forward_checked(model, &rotated_input, &rotated_geometry)?;
        let expected = baseline.map_tensors(model.rs_out(), |t| t.rotate(&r))?;
        let err = output.max_abs_diff(&expected)?;
        tracing::trace!(?angles, err, "equivariance sample");
        errors.push(err);
    }
    Ok(EquivarianceReport::from_errors(errors, tol))
}

/// For each symmetry, the largest deviation between the output at `σ(i)` and
/// `D(g)` applied to the output at `i`.
pub fn check_output_symmetry<M: EquivariantModel + ?Sized>(
    model: &M,
    input: &SignalBatch,
    geometry: &GeometryBatch,
    symmetries: &[Symmetry],
    tol: f64,
) -> Result<EquivarianceReport, ModelError> {
    let output = forward_checked(model, input, geometry)?;
    let (batch, points, _) = output.shape();
    let rs = model.rs_out();
    let mut errors = Vec::with_capacity(symmetries.len());
    for sym in symmetries {
        if sym.permutation.len() != points {
            return Err(ModelError::BatchShape(format!(
                "symmetry permutes {} points, batch has {points}",
                sym.permutation.len()
            )));
        }
        let mut err = 0.0_f64;
        for b in 0..batch {
            for (i, &j) in sym.permutation.iter().enumerate() {
                let moved = output.tensor(b, i, rs)?.rotate(&sym.rotation)?;
                let target = output.signal(b, j);
                for (x, y) in moved.signal().iter().zip(target) {
                    err = err.max((x - y).abs());
                }
            }
        }
        errors.push(err);
    }
    Ok(EquivarianceReport::from_errors(errors, tol))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{rectangle, square};

    const TOL: f64 = 1e-9;

    #[test]
    fn test_planar_rotation_count() {
        assert_eq!(planar_rotations(4).len(), 8);
        assert!(planar_rotations(0).is_empty());
    }

    #[test]
    fn test_square_has_eight_symmetries() {
        let syms = find_symmetries(&square(1.0), &planar_rotations(4), TOL);
        assert_eq!(syms.len(), 8);
        // Quarter turn about z maps corner 0 to corner 1.
        assert_eq!(syms[1].permutation, vec![1, 2, 3, 0]);
    }

    #[test]
    fn test_rectangle_has_four_symmetries() {
        let syms = find_symmetries(&rectangle(2.0, 1.0), &planar_rotations(4), TOL);
        assert_eq!(syms.len(), 4);
        assert!(syms.iter().all(|s| s.permutation.len() == 4));
        // Identity, half turn about z, flips about x and y.
        let angles: Vec<f64> = syms.iter().map(Symmetry::angle).collect();
        assert!(angles[0].abs() < TOL);
        assert!(angles[1..].iter().all(|a| (a - PI).abs() < 1e-9));
    }

    #[test]
    fn test_identity_axis_is_none() {
        let syms = find_symmetries(&square(1.0), &planar_rotations(4), TOL);
        assert!(syms[0].axis().is_none());
        assert!(syms[1].axis().is_some());
        // Half-turn about x keeps its axis.
        let flip = syms.iter().find(|s| s.permutation == vec![3, 2, 1, 0]).unwrap();
        let axis = flip.axis().unwrap();
        assert!((axis[0].abs() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_report_passes_within_tolerance() {
        let report = EquivarianceReport::from_errors(vec![1e-12, 3e-10], TOL);
        assert!(report.passed());
        assert_eq!(report.max_error, 3e-10);
        let failing = EquivarianceReport::from_errors(vec![0.5], TOL);
        assert!(!failing.passed());
    }
}
