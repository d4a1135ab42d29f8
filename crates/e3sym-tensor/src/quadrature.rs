//! # Sphere Quadrature
//!
//! Product rule: Gauss–Legendre in `z = cos θ` times a uniform rule in `φ`.
//! With `lmax + 1` polar nodes and `2·lmax + 1` azimuthal nodes it integrates
//! the product of any two harmonics of degree `<= lmax` exactly, which is
//! what Wigner D matrices and projections need.

use std::f64::consts::PI;

use nalgebra::Vector3;

/// Gauss–Legendre nodes and weights on `[-1, 1]`.
///
/// Newton iteration on `P_n` from the Tricomi initial guess.
pub fn gauss_legendre(n: usize) -> (Vec<f64>, Vec<f64>) {
    let mut nodes = vec![0.0; n];
    let mut weights = vec![0.0; n];
    for i in 0..n {
        let mut x = (PI * (i as f64 + 0.75) / (n as f64 + 0.5)).cos();
        let mut dp = 1.0;
        for _ in 0..100 {
            let (p, d) = legendre_with_derivative(n, x);
            dp = d;
            let dx = p / d;
            x -= dx;
            if dx.abs() < 1e-15 {
                break;
            }
        }
        let (_, d) = legendre_with_derivative(n, x);
        if d.is_finite() && d != 0.0 {
            dp = d;
        }
        nodes[i] = x;
        weights[i] = 2.0 / ((1.0 - x * x) * dp * dp);
    }
    (nodes, weights)
}

/// `(P_n(x), P_n'(x))` by the three-term recurrence.
fn legendre_with_derivative(n: usize, x: f64) -> (f64, f64) {
    if n == 0 {
        return (1.0, 0.0);
    }
    let mut p_prev = 1.0;
    let mut p = x;
    for k in 2..=n {
        let next = ((2 * k - 1) as f64 * x * p - (k - 1) as f64 * p_prev) / k as f64;
        p_prev = p;
        p = next;
    }
    let d = n as f64 * (x * p - p_prev) / (x * x - 1.0);
    (p, d)
}

/// Quadrature points on the unit sphere with their weights.
#[derive(Debug, Clone)]
pub struct SphereQuadrature {
    points: Vec<Vector3<f64>>,
    weights: Vec<f64>,
}

impl SphereQuadrature {
    /// Rule exact for products of harmonics up to degree `lmax`.
    pub fn new(lmax: u32) -> Self {
        let n_polar = lmax as usize + 1;
        let n_azimuth = 2 * lmax as usize + 1;
        let (nodes, gl_weights) = gauss_legendre(n_polar);
        let dphi = 2.0 * PI / n_azimuth as f64;

        let mut points = Vec::with_capacity(n_polar * n_azimuth);
        let mut weights = Vec::with_capacity(n_polar * n_azimuth);
        for (z, wz) in nodes.iter().zip(&gl_weights) {
            let rho = (1.0 - z * z).max(0.0).sqrt();
            for j in 0..n_azimuth {
                let phi = dphi * j as f64;
                points.push(Vector3::new(rho * phi.cos(), rho * phi.sin(), *z));
                weights.push(wz * dphi);
            }
        }
        Self { points, weights }
    }

    /// Unit-sphere nodes.
    pub fn points(&self) -> &[Vector3<f64>] {
        &self.points
    }

    /// Weights; they sum to `4π`.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }
}
