//! # Sampling, Plotting and Peaks
//!
//! Dense evaluation of a [`SphericalTensor`] on latitude/longitude grids.
//!
//! - [`SphereGrid::cell_centered`]: `n` polar × `2n` azimuthal cell centers,
//!   no point on a pole. Used for [`SphericalTensor::signal_on_grid`] and
//!   peak search.
//! - [`SphereGrid::closed`]: endpoints included on both axes so the samples
//!   close into a surface mesh. Used for [`SphericalTensor::plot`].
//!
//! Polar angle `β` is measured from `+z`, azimuth `α` from `+x` towards `+y`.

use std::f64::consts::PI;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use e3sym_core::{tolerance, E3Error};

use crate::spherical::{evaluate_collapsed, SphericalTensor};

/// Latitude/longitude sampling grid, row-major in `β`.
#[derive(Debug, Clone, PartialEq)]
pub struct SphereGrid {
    betas: Vec<f64>,
    alphas: Vec<f64>,
}

impl SphereGrid {
    /// `n` polar cell centers `β_i = π (i + ½) / n` and `2n` azimuths
    /// `α_j = π j / n`.
    ///
    /// # Errors
    ///
    /// [`E3Error::InvalidParameter`] when `n == 0`.
    pub fn cell_centered(n: usize) -> Result<Self, E3Error> {
        if n == 0 {
            return Err(E3Error::InvalidParameter(
                "grid resolution must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            betas: (0..n).map(|i| PI * (i as f64 + 0.5) / n as f64).collect(),
            alphas: (0..2 * n).map(|j| PI * j as f64 / n as f64).collect(),
        })
    }

    /// `n` polar angles over `[0, π]` and `n` azimuths over `[0, 2π]`, both
    /// inclusive.
    ///
    /// # Errors
    ///
    /// [`E3Error::InvalidParameter`] when `n < 2`.
    pub fn closed(n: usize) -> Result<Self, E3Error> {
        if n < 2 {
            return Err(E3Error::InvalidParameter(
                "closed grid resolution must be at least 2".to_string(),
            ));
        }
        let step = 1.0 / (n - 1) as f64;
        Ok(Self {
            betas: (0..n).map(|i| PI * i as f64 * step).collect(),
            alphas: (0..n).map(|j| 2.0 * PI * j as f64 * step).collect(),
        })
    }

    /// Polar angles.
    pub fn betas(&self) -> &[f64] {
        &self.betas
    }

    /// Azimuths.
    pub fn alphas(&self) -> &[f64] {
        &self.alphas
    }

    /// `(n_beta, n_alpha)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.betas.len(), self.alphas.len())
    }

    /// Number of grid points.
    pub fn len(&self) -> usize {
        self.betas.len() * self.alphas.len()
    }

    /// Always false for a constructed grid.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Unit direction of grid point `(i, j)`.
    pub fn direction(&self, i: usize, j: usize) -> Vector3<f64> {
        let (b, a) = (self.betas[i], self.alphas[j]);
        Vector3::new(b.sin() * a.cos(), b.sin() * a.sin(), b.cos())
    }

    /// All unit directions, row-major in `β`.
    pub fn directions(&self) -> Vec<Vector3<f64>> {
        let (nb, na) = self.shape();
        (0..nb)
            .flat_map(|i| (0..na).map(move |j| (i, j)))
            .map(|(i, j)| self.direction(i, j))
            .collect()
    }
}

/// Options for [`SphericalTensor::plot`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlotOptions {
    /// Points per axis of the closed grid.
    pub resolution: usize,
    /// Clip negative values to zero before using them as radius.
    pub relu: bool,
    /// Offset added to every point.
    pub center: Option<[f64; 3]>,
    /// Use the value as radius. When false, points lie on the unit sphere.
    pub radius: bool,
}

impl Default for PlotOptions {
    fn default() -> Self {
        Self {
            resolution: 30,
            relu: true,
            center: None,
            radius: true,
        }
    }
}

/// Sampled surface ready for a mesh plot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Surface {
    /// Rows (polar angles).
    pub n_beta: usize,
    /// Columns (azimuths).
    pub n_alpha: usize,
    /// Cartesian points, row-major.
    pub points: Vec<[f64; 3]>,
    /// Function value at each point (after clipping when requested).
    pub values: Vec<f64>,
}

/// Options for [`SphericalTensor::find_peaks`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeakOptions {
    /// Polar resolution of the search grid.
    pub resolution: usize,
    /// Refined peaks closer than this angle (radians) are merged.
    pub min_separation: f64,
}

impl Default for PeakOptions {
    fn default() -> Self {
        Self {
            resolution: 40,
            min_separation: 0.1,
        }
    }
}

/// Local maximum of a spherical function.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Peak {
    /// Unit direction.
    pub direction: [f64; 3],
    /// Function value there.
    pub value: f64,
}

impl SphericalTensor {
    fn sample(&self, grid: &SphereGrid) -> Vec<f64> {
        let (lmax, coeffs) = self.collapsed();
        grid.directions()
            .iter()
            .map(|d| evaluate_collapsed(lmax, &coeffs, d))
            .collect()
    }

    /// Values on [`SphereGrid::cell_centered`]`(n)`, row-major in `β`.
    pub fn signal_on_grid(&self, n: usize) -> Result<Vec<f64>, E3Error> {
        let grid = SphereGrid::cell_centered(n)?;
        Ok(self.sample(&grid))
    }

    /// Sample the function as a radial surface.
    ///
    /// With `radius`, point = `center + value · dir`, so negative values (when
    /// not clipped) land on the opposite side of the center.
    ///
    /// # Errors
    ///
    /// [`E3Error::InvalidParameter`] for a resolution below 2 or a non-finite
    /// center.
    pub fn plot(&self, options: &PlotOptions) -> Result<Surface, E3Error> {
        let center = match options.center {
            Some(c) if c.iter().any(|v| !v.is_finite()) => {
                return Err(E3Error::InvalidParameter(format!(
                    "plot center is not finite: {c:?}"
                )))
            }
            Some(c) => Vector3::from(c),
            None => Vector3::zeros(),
        };
        let grid = SphereGrid::closed(options.resolution)?;
        let (n_beta, n_alpha) = grid.shape();
        let mut values = self.sample(&grid);
        if options.relu {
            for v in values.iter_mut() {
                *v = v.max(0.0);
            }
        }
        let points = grid
            .directions()
            .iter()
            .zip(&values)
            .map(|(d, v)| {
                let r = if options.radius { *v } else { 1.0 };
                let p = center + d * r;
                [p.x, p.y, p.z]
            })
            .collect();
        Ok(Surface {
            n_beta,
            n_alpha,
            points,
            values,
        })
    }

    /// Local maxima, refined off-grid and sorted by value, largest first.
    ///
    /// A constant function has no peaks and yields an empty list. Flatness
    /// is judged relative to the largest sampled magnitude, so the result
    /// does not depend on the overall scale of the signal.
    ///
    /// # Errors
    ///
    /// [`E3Error::InvalidParameter`] for a zero resolution or a negative or
    /// non-finite `min_separation`.
    pub fn find_peaks(&self, options: &PeakOptions) -> Result<Vec<Peak>, E3Error> {
        if !(options.min_separation.is_finite() && options.min_separation >= 0.0) {
            return Err(E3Error::InvalidParameter(format!(
                "min_separation must be a non-negative angle, got {}",
                options.min_separation
            )));
        }
        let grid = SphereGrid::cell_centered(options.resolution)?;
        let values = self.sample(&grid);
        let (max, min) = values
            .iter()
            .fold((f64::NEG_INFINITY, f64::INFINITY), |(hi, lo), v| (hi.max(*v), lo.min(*v)));
        let scale = max.abs().max(min.abs()).max(f64::MIN_POSITIVE);
        if max - min <= tolerance::DOUBLE * scale {
            tracing::warn!(rs = %self.rs(), "function is constant on the sphere; no peaks");
            return Ok(Vec::new());
        }

        let (lmax, coeffs) = self.collapsed();
        let f = |d: &Vector3<f64>| evaluate_collapsed(lmax, &coeffs, d);
        let step = PI / options.resolution as f64;
        let mut refined: Vec<(Vector3<f64>, f64)> = grid_maxima(&grid, &values)
            .into_iter()
            .map(|(i, j)| refine(&f, grid.direction(i, j), step))
            .collect();
        refined.sort_by(|a, b| b.1.total_cmp(&a.1));

        let mut peaks: Vec<(Vector3<f64>, f64)> = Vec::new();
        for (dir, value) in refined {
            let separated = peaks
                .iter()
                .all(|(kept, _)| angle_between(kept, &dir) > options.min_separation);
            if separated {
                peaks.push((dir, value));
            }
        }
        tracing::debug!(count = peaks.len(), "found peaks");
        Ok(peaks
            .into_iter()
            .map(|(d, value)| Peak {
                direction: [d.x, d.y, d.z],
                value,
            })
            .collect())
    }
}

/// Grid indices whose value is at least that of all eight neighbours.
///
/// Azimuth wraps; past a pole the neighbour is in the same row, half a turn
/// away.
fn grid_maxima(grid: &SphereGrid, values: &[f64]) -> Vec<(usize, usize)> {
    let (nb, na) = grid.shape();
    let at = |i: isize, j: isize| -> f64 {
        let (mut i, mut j) = (i, j);
        if i < 0 {
            i = 0;
            j += na as isize / 2;
        } else if i >= nb as isize {
            i = nb as isize - 1;
            j += na as isize / 2;
        }
        let j = j.rem_euclid(na as isize) as usize;
        values[i as usize * na + j]
    };
    let mut out = Vec::new();
    for i in 0..nb as isize {
        for j in 0..na as isize {
            let v = at(i, j);
            let is_max = (-1..=1)
                .flat_map(|di| (-1..=1).map(move |dj| (di, dj)))
                .filter(|&(di, dj)| (di, dj) != (0, 0))
                .all(|(di, dj)| v >= at(i + di, j + dj));
            if is_max {
                out.push((i as usize, j as usize));
            }
        }
    }
    out
}

/// Pattern search on the sphere: try eight tangent directions, move to the
/// best improvement, halve the step when none improves.
fn refine(
    f: &impl Fn(&Vector3<f64>) -> f64,
    start: Vector3<f64>,
    initial_step: f64,
) -> (Vector3<f64>, f64) {
    let mut dir = start;
    let mut value = f(&dir);
    let mut step = initial_step;
    let mut iterations = 0;
    while step > tolerance::PEAK_ANGLE * 1e-4 && iterations < 10_000 {
        iterations += 1;
        let (e1, e2) = tangent_basis(&dir);
        let mut best: Option<(Vector3<f64>, f64)> = None;
        for k in 0..8 {
            let t = PI / 4.0 * k as f64;
            let candidate = (dir + (e1 * t.cos() + e2 * t.sin()) * step).normalize();
            let v = f(&candidate);
            if v > best.map_or(value, |(_, b)| b) {
                best = Some((candidate, v));
            }
        }
        match best {
            Some((d, v)) => {
                dir = d;
                value = v;
            }
            None => step *= 0.5,
        }
    }
    tracing::trace!(iterations, value, "refined peak");
    (dir, value)
}

fn tangent_basis(dir: &Vector3<f64>) -> (Vector3<f64>, Vector3<f64>) {
    let seed = if dir.x.abs() < 0.9 {
        Vector3::x()
    } else {
        Vector3::y()
    };
    let e1 = (seed - dir * seed.dot(dir)).normalize();
    let e2 = dir.cross(&e1);
    (e1, e2)
}

fn angle_between(a: &Vector3<f64>, b: &Vector3<f64>) -> f64 {
    a.dot(b).clamp(-1.0, 1.0).acos()
}

#[cfg(test)]
mod tests {
    use super::*;
    use e3sym_core::Rs;

    fn dir_of(p: &Peak) -> Vector3<f64> {
        Vector3::from(p.direction)
    }

    #[test]
    fn test_cell_centered_grid() {
        let grid = SphereGrid::cell_centered(4).unwrap();
        assert_eq!(grid.shape(), (4, 8));
        assert!(grid.betas().iter().all(|b| *b > 0.0 && *b < PI));
        assert!(grid.directions().iter().all(|d| (d.norm() - 1.0).abs() < 1e-14));
        assert!(SphereGrid::cell_centered(0).is_err());
    }

    #[test]
    fn test_closed_grid_includes_poles() {
        let grid = SphereGrid::closed(5).unwrap();
        assert_eq!(grid.shape(), (5, 5));
        assert_eq!(grid.betas()[0], 0.0);
        assert!((grid.betas()[4] - PI).abs() < 1e-15);
        assert!((grid.alphas()[4] - 2.0 * PI).abs() < 1e-15);
        assert!(SphereGrid::closed(1).is_err());
    }

    #[test]
    fn test_signal_on_grid_matches_evaluate() {
        let t = SphericalTensor::from_geometry(&[Vector3::new(0.2, -0.5, 0.9)], 3).unwrap();
        let values = t.signal_on_grid(6).unwrap();
        let grid = SphereGrid::cell_centered(6).unwrap();
        assert_eq!(values.len(), grid.len());
        for (d, v) in grid.directions().iter().zip(&values) {
            assert!((t.evaluate(d).unwrap() - v).abs() < 1e-12);
        }
    }

    #[test]
    fn test_plot_shape_and_relu() {
        let t = SphericalTensor::from_geometry(&[Vector3::z()], 2).unwrap();
        let surface = t.plot(&PlotOptions::default()).unwrap();
        assert_eq!((surface.n_beta, surface.n_alpha), (30, 30));
        assert_eq!(surface.points.len(), 900);
        assert!(surface.values.iter().all(|v| *v >= 0.0));
    }

    #[test]
    fn test_plot_radius_and_center() {
        let t = SphericalTensor::from_geometry(&[Vector3::z()], 1).unwrap();
        let opts = PlotOptions {
            resolution: 3,
            relu: false,
            center: Some([1.0, 2.0, 3.0]),
            radius: true,
        };
        let s = t.plot(&opts).unwrap();
        // First row is the north pole.
        let top = s.values[0];
        assert!((s.points[0][2] - (3.0 + top)).abs() < 1e-12);
        // South pole with a negative value lands above the center again.
        let bottom = s.values[s.values.len() - 1];
        assert!(bottom < 0.0);
        let last = s.points[s.points.len() - 1];
        assert!((last[2] - (3.0 - bottom)).abs() < 1e-12);

        let unit = t
            .plot(&PlotOptions {
                radius: false,
                center: None,
                ..opts
            })
            .unwrap();
        assert!(unit
            .points
            .iter()
            .all(|p| (Vector3::from(*p).norm() - 1.0).abs() < 1e-12));
    }

    #[test]
    fn test_plot_rejects_bad_options() {
        let t = SphericalTensor::from_geometry(&[Vector3::z()], 1).unwrap();
        let bad_center = PlotOptions {
            center: Some([f64::NAN, 0.0, 0.0]),
            ..PlotOptions::default()
        };
        assert!(t.plot(&bad_center).is_err());
        let bad_res = PlotOptions {
            resolution: 1,
            ..PlotOptions::default()
        };
        assert!(t.plot(&bad_res).is_err());
    }

    #[test]
    fn test_single_vector_peak() {
        let v = Vector3::new(0.3, -0.8, 0.52);
        let t = SphericalTensor::from_geometry(&[v], 5).unwrap();
        let peaks = t.find_peaks(&PeakOptions::default()).unwrap();
        assert!(!peaks.is_empty());
        let top = dir_of(&peaks[0]);
        assert!(angle_between(&top, &v.normalize()) < 1e-4);
        assert!((peaks[0].value - t.evaluate(&v).unwrap()).abs() < 1e-8);
    }

    #[test]
    fn test_short_vector_peak() {
        let v = Vector3::new(0.3, -0.8, 0.52) * 1e-10;
        let t = SphericalTensor::from_geometry(&[v], 5).unwrap();
        let peaks = t.find_peaks(&PeakOptions::default()).unwrap();
        assert!(!peaks.is_empty());
        assert!(angle_between(&dir_of(&peaks[0]), &v.normalize()) < 1e-4);
        let expected = t.evaluate(&v).unwrap();
        assert!((peaks[0].value - expected).abs() <= 1e-8 * expected.abs());
    }

    #[test]
    fn test_peaks_sorted_and_separated() {
        // Antipodal masses keep both maxima exactly on the axis.
        let a = Vector3::new(0.0, 0.0, 1.0);
        let b = Vector3::new(0.0, 0.0, -2.0);
        let t = SphericalTensor::from_geometry(&[a, b], 6).unwrap();
        let opts = PeakOptions::default();
        let peaks = t.find_peaks(&opts).unwrap();
        assert!(peaks.len() >= 2);
        assert!(peaks.windows(2).all(|w| w[0].value >= w[1].value));
        for (i, p) in peaks.iter().enumerate() {
            for q in &peaks[i + 1..] {
                assert!(angle_between(&dir_of(p), &dir_of(q)) > opts.min_separation);
            }
        }
        // The longer vector produces the strongest peak.
        assert!(angle_between(&dir_of(&peaks[0]), &b.normalize()) < 1e-3);
        assert!(peaks
            .iter()
            .any(|p| angle_between(&dir_of(p), &a) < 1e-3));
    }

    #[test]
    fn test_constant_function_has_no_peaks() {
        let t = SphericalTensor::new(vec![1.0], Rs::spherical(0).unwrap()).unwrap();
        assert!(t.find_peaks(&PeakOptions::default()).unwrap().is_empty());
        let zero = SphericalTensor::zeros(Rs::spherical(3).unwrap(), Default::default());
        assert!(zero.find_peaks(&PeakOptions::default()).unwrap().is_empty());
        let large = SphericalTensor::new(vec![1e12], Rs::spherical(0).unwrap()).unwrap();
        assert!(large.find_peaks(&PeakOptions::default()).unwrap().is_empty());
    }

    #[test]
    fn test_find_peaks_rejects_bad_separation() {
        let t = SphericalTensor::from_geometry(&[Vector3::z()], 2).unwrap();
        let opts = PeakOptions {
            min_separation: -1.0,
            ..PeakOptions::default()
        };
        assert!(t.find_peaks(&opts).is_err());
    }
}
