//! Toy point sets in the xy-plane, centered at the origin, listed
//! counter-clockwise starting from the `(+x, +y)` corner.

use nalgebra::Vector3;

/// Square of side `side`.
pub fn square(side: f64) -> Vec<Vector3<f64>> {
    rectangle(side, side)
}

/// Rectangle of `width` along x and `height` along y.
pub fn rectangle(width: f64, height: f64) -> Vec<Vector3<f64>> {
    let (w, h) = (width / 2.0, height / 2.0);
    vec![
        Vector3::new(w, h, 0.0),
        Vector3::new(-w, h, 0.0),
        Vector3::new(-w, -h, 0.0),
        Vector3::new(w, -h, 0.0),
    ]
}
