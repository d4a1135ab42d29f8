//! # Rotations
//!
//! The [`Rotator`] interface turns angle triples into rotations and applies
//! them to point sets. [`EulerRotator`] uses the ZYZ convention
//! `R(α, β, γ) = Rz(α) · Ry(β) · Rz(γ)`.

use std::f64::consts::{PI, TAU};

use nalgebra::{Quaternion, Rotation3, UnitQuaternion, Vector3};
use rand::Rng;

/// Angle-parameterised rotations.
pub trait Rotator {
    /// Rotation for an angle triple.
    fn rotation_matrix(&self, angles: [f64; 3]) -> Rotation3<f64>;

    /// Rotate every vector.
    fn rotate(&self, vectors: &[Vector3<f64>], angles: [f64; 3]) -> Vec<Vector3<f64>> {
        let r = self.rotation_matrix(angles);
        vectors.iter().map(|v| r * v).collect()
    }
}

/// ZYZ Euler angles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EulerRotator;

impl Rotator for EulerRotator {
    fn rotation_matrix(&self, [alpha, beta, gamma]: [f64; 3]) -> Rotation3<f64> {
        Rotation3::from_axis_angle(&Vector3::z_axis(), alpha)
            * Rotation3::from_axis_angle(&Vector3::y_axis(), beta)
            * Rotation3::from_axis_angle(&Vector3::z_axis(), gamma)
    }
}

/// Uniformly distributed rotation (Shoemake's quaternion method).
pub fn random_rotation<R: Rng + ?Sized>(rng: &mut R) -> Rotation3<f64> {
    let (u1, u2, u3): (f64, f64, f64) = (rng.gen(), rng.gen(), rng.gen());
    let (a, b) = ((1.0 - u1).sqrt(), u1.sqrt());
    let q = Quaternion::new(
        b * (TAU * u3).cos(),
        a * (TAU * u2).sin(),
        a * (TAU * u2).cos(),
        b * (TAU * u3).sin(),
    );
    UnitQuaternion::from_quaternion(q).to_rotation_matrix()
}

/// ZYZ angles distributed so that [`EulerRotator`] yields uniform rotations:
/// `α, γ` uniform on `[0, 2π)`, `cos β` uniform on `[-1, 1]`.
pub fn random_angles<R: Rng + ?Sized>(rng: &mut R) -> [f64; 3] {
    let alpha = rng.gen_range(0.0..TAU);
    let beta = rng.gen_range(-1.0_f64..1.0).acos();
    let gamma = rng.gen_range(0.0..TAU);
    [alpha, beta.clamp(0.0, PI), gamma]
}
