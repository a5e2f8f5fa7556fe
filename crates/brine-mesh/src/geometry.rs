//! Geometric primitives over the triangulation: areas, P1 gradients,
//! barycentric coordinates, facet measures, and point location.

use brine_core::{distance, Point};

use crate::topology::MeshTopology;

/// Tolerance for accepting a point as inside a cell: barycentric
/// coordinates may undershoot zero by this much.
const LOCATE_TOL: f64 = 1e-12;

/// Twice the signed area of a corner triple (positive for
/// counter-clockwise orientation).
fn doubled_signed_area(c: &[Point; 3]) -> f64 {
    (c[1][0] - c[0][0]) * (c[2][1] - c[0][1]) - (c[1][1] - c[0][1]) * (c[2][0] - c[0][0])
}

/// Unsigned area of a cell given its corners.
pub fn cell_area(corners: &[Point; 3]) -> f64 {
    0.5 * doubled_signed_area(corners).abs()
}

/// Gradient of the linear interpolant of `values` over a cell.
///
/// Exact for piecewise-linear fields; constant per cell.
pub fn p1_gradient(corners: &[Point; 3], values: [f64; 3]) -> [f64; 2] {
    let det = doubled_signed_area(corners);
    let mut grad = [0.0, 0.0];
    for i in 0..3 {
        let j = corners[(i + 1) % 3];
        let k = corners[(i + 2) % 3];
        // Gradient of the i-th barycentric coordinate.
        grad[0] += values[i] * (j[1] - k[1]) / det;
        grad[1] += values[i] * (k[0] - j[0]) / det;
    }
    grad
}

/// Barycentric coordinates of `p` with respect to a corner triple.
///
/// Coordinates sum to one; negative entries mean `p` lies outside.
pub fn barycentric(corners: &[Point; 3], p: Point) -> [f64; 3] {
    let det = doubled_signed_area(corners);
    let l0 = ((corners[1][0] - p[0]) * (corners[2][1] - p[1])
        - (corners[1][1] - p[1]) * (corners[2][0] - p[0]))
        / det;
    let l1 = ((corners[2][0] - p[0]) * (corners[0][1] - p[1])
        - (corners[2][1] - p[1]) * (corners[0][0] - p[0]))
        / det;
    [l0, l1, 1.0 - l0 - l1]
}

/// Length of the facet between two endpoints.
pub fn facet_length(a: Point, b: Point) -> f64 {
    distance(a, b)
}

/// Unit normal of the facet `a -> b`, oriented away from `opposite`
/// (the remaining corner of the adjacent cell). For an exterior facet
/// this is the outward normal.
pub fn facet_normal(a: Point, b: Point, opposite: Point) -> [f64; 2] {
    let len = distance(a, b);
    let mut n = [(b[1] - a[1]) / len, (a[0] - b[0]) / len];
    let to_opposite = [opposite[0] - a[0], opposite[1] - a[1]];
    if n[0] * to_opposite[0] + n[1] * to_opposite[1] > 0.0 {
        n = [-n[0], -n[1]];
    }
    n
}

/// Locates points in the triangulation by linear scan with a bounding
/// box reject per cell. Adequate for probe-sized point sets.
#[derive(Debug)]
pub struct PointLocator {
    boxes: Vec<(Point, Point)>,
}

impl PointLocator {
    /// Precompute per-cell bounding boxes.
    pub fn new(topology: &MeshTopology) -> Self {
        let boxes = (0..topology.n_elements() as u32)
            .map(|cell| {
                let c = topology.cell_corners(cell);
                let min = [
                    c[0][0].min(c[1][0]).min(c[2][0]),
                    c[0][1].min(c[1][1]).min(c[2][1]),
                ];
                let max = [
                    c[0][0].max(c[1][0]).max(c[2][0]),
                    c[0][1].max(c[1][1]).max(c[2][1]),
                ];
                (min, max)
            })
            .collect();
        Self { boxes }
    }

    /// The first cell containing `p`, with its barycentric coordinates.
    pub fn locate(&self, topology: &MeshTopology, p: Point) -> Option<(u32, [f64; 3])> {
        for (cell, (min, max)) in self.boxes.iter().enumerate() {
            if p[0] < min[0] - LOCATE_TOL
                || p[0] > max[0] + LOCATE_TOL
                || p[1] < min[1] - LOCATE_TOL
                || p[1] > max[1] + LOCATE_TOL
            {
                continue;
            }
            let corners = topology.cell_corners(cell as u32);
            let bary = barycentric(&corners, p);
            if bary.iter().all(|&l| l >= -LOCATE_TOL) {
                return Some((cell as u32, bary));
            }
        }
        None
    }
}

/// Linear interpolation of nodal values at barycentric coordinates.
pub fn interpolate(values: [f64; 3], bary: [f64; 3]) -> f64 {
    values[0] * bary[0] + values[1] * bary[1] + values[2] * bary[2]
}
