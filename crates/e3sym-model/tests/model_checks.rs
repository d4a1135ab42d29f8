//! # Model Symmetry Integration Tests
//!
//! The neighbour-sum model must pass both the equivariance check and the
//! output-symmetry check on the toy shapes; a model that adds a fixed
//! direction to every point must fail them.

use e3sym_core::Rs;
use e3sym_model::{
    check_equivariance, check_output_symmetry, find_symmetries, planar_rotations, random_angles,
    rectangle, square, EquivariantModel, EulerRotator, GeometryBatch, ModelError, NeighborSum,
    SignalBatch,
};
use e3sym_tensor::SphericalTensor;
use nalgebra::Vector3;
use rand::rngs::StdRng;
use rand::SeedableRng;

const TOL: f64 = 1e-9;

/// Adds the projection of `+x` to every point: not equivariant.
struct FixedDirection {
    rs: Rs,
    lmax: u32,
}

impl FixedDirection {
    fn new(lmax: u32) -> Self {
        Self {
            rs: Rs::spherical(lmax).unwrap(),
            lmax,
        }
    }
}

impl EquivariantModel for FixedDirection {
    fn rs_in(&self) -> &Rs {
        &self.rs
    }

    fn rs_out(&self) -> &Rs {
        &self.rs
    }

    fn forward(
        &self,
        input: &SignalBatch,
        _geometry: &GeometryBatch,
    ) -> Result<SignalBatch, ModelError> {
        let bias = SphericalTensor::from_geometry(&[Vector3::x()], self.lmax)?;
        input.map_tensors(&self.rs, |t| t.try_add(&bias))
    }
}

/// One invariant scalar per point.
fn scalar_input(points: usize, lmax: u32) -> SignalBatch {
    let dim = Rs::spherical(lmax).unwrap().dim();
    let mut batch = SignalBatch::zeros(1, points, dim);
    for p in 0..points {
        batch.signal_mut(0, p)[0] = 1.0;
    }
    batch
}

fn seeded_angles(n: usize) -> Vec<[f64; 3]> {
    let mut rng = StdRng::seed_from_u64(42);
    (0..n).map(|_| random_angles(&mut rng)).collect()
}

// ---------------------------------------------------------------------------
// 1. Equivariance under random rotations
// ---------------------------------------------------------------------------

#[test]
fn neighbor_sum_is_equivariant() {
    let model = NeighborSum::new(3).unwrap();
    let points = vec![
        Vector3::new(0.1, 0.2, 0.3),
        Vector3::new(-1.0, 0.5, 0.0),
        Vector3::new(0.4, -0.6, 1.2),
    ];
    let geometry = GeometryBatch::single(&points).unwrap();
    let mut input = scalar_input(3, 3);
    input.signal_mut(0, 1)[2] = 0.5;
    let report =
        check_equivariance(&model, &EulerRotator, &input, &geometry, &seeded_angles(10), TOL)
            .unwrap();
    assert_eq!(report.per_rotation.len(), 10);
    assert!(report.passed(), "max error {}", report.max_error);
}

#[test]
fn fixed_direction_is_not_equivariant() {
    let model = FixedDirection::new(2);
    let geometry = GeometryBatch::single(&square(1.0)).unwrap();
    let report = check_equivariance(
        &model,
        &EulerRotator,
        &scalar_input(4, 2),
        &geometry,
        &seeded_angles(5),
        TOL,
    )
    .unwrap();
    assert!(!report.passed());
}

// ---------------------------------------------------------------------------
// 2. Output symmetry on toy shapes
// ---------------------------------------------------------------------------

#[test]
fn square_outputs_respect_all_symmetries() {
    let model = NeighborSum::new(4).unwrap();
    let shape = square(1.0);
    let symmetries = find_symmetries(&shape, &planar_rotations(4), TOL);
    assert_eq!(symmetries.len(), 8);
    let geometry = GeometryBatch::single(&shape).unwrap();
    let report =
        check_output_symmetry(&model, &scalar_input(4, 4), &geometry, &symmetries, TOL).unwrap();
    assert!(report.passed(), "max error {}", report.max_error);
}

#[test]
fn rectangle_outputs_respect_its_symmetries() {
    let model = NeighborSum::new(3).unwrap();
    let shape = rectangle(2.0, 1.0);
    let symmetries = find_symmetries(&shape, &planar_rotations(4), TOL);
    assert_eq!(symmetries.len(), 4);
    let geometry = GeometryBatch::single(&shape).unwrap();
    let report =
        check_output_symmetry(&model, &scalar_input(4, 3), &geometry, &symmetries, TOL).unwrap();
    assert!(report.passed());
}

#[test]
fn fixed_direction_breaks_square_symmetry() {
    let model = FixedDirection::new(2);
    let shape = square(1.0);
    let symmetries = find_symmetries(&shape, &planar_rotations(4), TOL);
    let geometry = GeometryBatch::single(&shape).unwrap();
    let report =
        check_output_symmetry(&model, &scalar_input(4, 2), &geometry, &symmetries, TOL).unwrap();
    assert!(!report.passed());
    // The identity always holds.
    assert!(report.per_rotation[0] < TOL);
}

#[test]
fn mismatched_batches_are_rejected() {
    let model = NeighborSum::new(1).unwrap();
    let geometry = GeometryBatch::single(&square(1.0)).unwrap();
    let err = check_output_symmetry(&model, &scalar_input(3, 1), &geometry, &[], TOL).unwrap_err();
    assert!(matches!(err, ModelError::BatchShape(_)));
}
