//! Closed polyline approximation of an orbit ellipse.
//!
//! Uses the same parameterization as [`OrbitalBody`](crate::OrbitalBody)
//! positions, so a path drawn in a body's focus frame passes exactly through
//! the points the body visits.

use glam::Vec3;

/// Default number of vertices for an orbit-path outline.
pub const ORBIT_PATH_VERTICES: u32 = 1000;

/// Immutable line-loop geometry for an ellipse in the XZ plane.
#[derive(Clone, Debug, PartialEq)]
pub struct EllipseGeometry {
    points: Vec<Vec3>,
    edges: Vec<[u32; 2]>,
}

impl EllipseGeometry {
    /// Sample `vertex_count` angles uniformly over `[0, 2π)`.
    ///
    /// Point `i` is `(a·sin θ, 0, b·cos θ)` and edge `i` joins point `i` to
    /// point `(i + 1) mod vertex_count`, closing the loop. A zero semi-axis
    /// collapses the loop onto a line (or a point) and is not an error.
    pub fn generate(a: f32, b: f32, vertex_count: u32) -> Self {
        let n = vertex_count as usize;
        let step = std::f64::consts::TAU / vertex_count.max(1) as f64;

        let points = (0..n)
            .map(|i| {
                let theta = step * i as f64;
                Vec3::new(
                    (a as f64 * theta.sin()) as f32,
                    0.0,
                    (b as f64 * theta.cos()) as f32,
                )
            })
            .collect();

        let edges = (0..vertex_count)
            .map(|i| [i, (i + 1) % vertex_count])
            .collect();

        Self { points, edges }
    }

    /// Sampled points, in angle order.
    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    /// Closed-loop edge list.
    pub fn edges(&self) -> &[[u32; 2]] {
        &self.edges
    }

    /// Edges flattened into a line-list index buffer.
    pub fn line_indices(&self) -> Vec<u32> {
        self.edges.iter().flatten().copied().collect()
    }

    /// Number of sampled points (and edges).
    pub fn vertex_count(&self) -> usize {
        self.points.len()
    }

    /// Whether the geometry has no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
