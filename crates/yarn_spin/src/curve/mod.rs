//! Path curves and path deformation.
//!
//! A [`StrandGeometry`] is an evaluated polyline with a cumulative arc-length table
//! and a per-vertex twist phase. Deforming a graph along it maps each vertex's
//! local z onto arc length and places its local (x, y) in the path frame at that
//! position.
use glam::{Quat, Vec3};

use crate::geometry::StrandGraph;

pub mod spiral;

pub use spiral::SpiralBuilder;

/// Position, unit tangent and twist phase at an arc-length position on a path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathFrame {
    pub position: Vec3,
    pub tangent: Vec3,
    pub twist: f32,
}

impl PathFrame {
    /// Rotation taking local +Z to the tangent, after spinning the cross-section by `twist`.
    #[inline]
    pub fn rotation(&self) -> Quat {
        Quat::from_rotation_arc(Vec3::Z, self.tangent) * Quat::from_rotation_z(self.twist)
    }

    /// Map a local-space point whose z is already consumed as arc length.
    #[inline]
    pub fn place(&self, x: f32, y: f32) -> Vec3 {
        self.position + self.rotation() * Vec3::new(x, y, 0.0)
    }
}

/// An ordered polyline used as a deformation path.
#[derive(Debug, Clone, PartialEq)]
pub struct StrandGeometry {
    points: Vec<Vec3>,
    twist: Vec<f32>,
    arc: Vec<f32>,
}

impl StrandGeometry {
    /// Path through `points` without twist.
    pub fn from_points(points: Vec<Vec3>) -> Self {
        let twist = vec![0.0; points.len()];
        Self::with_twist(points, twist)
    }

    /// Path through `points` carrying a twist phase per point.
    ///
    /// `twist` must have one entry per point; paths need at least two points.
    pub fn with_twist(points: Vec<Vec3>, twist: Vec<f32>) -> Self {
        debug_assert_eq!(points.len(), twist.len(), "one twist value per point");
        debug_assert!(points.len() >= 2, "a path needs at least two points");

        let mut arc = Vec::with_capacity(points.len());
        let mut acc = 0.0f32;
        arc.push(acc);
        for w in points.windows(2) {
            acc += w[0].distance(w[1]);
            arc.push(acc);
        }

        Self { points, twist, arc }
    }

    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    pub fn twist(&self) -> &[f32] {
        &self.twist
    }

    /// Consecutive vertex index pairs.
    pub fn edges(&self) -> impl Iterator<Item = [u32; 2]> + '_ {
        (1..self.points.len() as u32).map(|i| [i - 1, i])
    }

    /// Total arc length.
    pub fn length(&self) -> f32 {
        self.arc.last().copied().unwrap_or(0.0)
    }

    /// The path as a single-polyline graph.
    pub fn to_graph(&self) -> StrandGraph {
        let mut g = StrandGraph::with_capacity(self.points.len(), 1);
        g.push_polyline(self.points.iter().copied());
        g
    }

    /// Frame at arc length `s`. Positions before the start or past the end
    /// extrapolate along the first or last segment.
    pub fn frame_at(&self, s: f32) -> PathFrame {
        let last = self.points.len() - 1;
        let seg = match self.arc.partition_point(|&a| a <= s) {
            0 => 0,
            i => (i - 1).min(last - 1),
        };

        let a = self.points[seg];
        let b = self.points[seg + 1];
        let seg_len = self.arc[seg + 1] - self.arc[seg];
        let tangent = (b - a).try_normalize().unwrap_or(Vec3::Z);
        let t = if seg_len > 0.0 {
            (s - self.arc[seg]) / seg_len
        } else {
            0.0
        };

        PathFrame {
            position: a + (b - a) * t,
            tangent,
            twist: self.twist[seg] + (self.twist[seg + 1] - self.twist[seg]) * t,
        }
    }

    /// Deform `graph` in place: local z becomes arc length along this path.
    pub fn deform(&self, graph: &mut StrandGraph) {
        graph.map_vertices(|v| self.frame_at(v.z).place(v.x, v.y));
    }
}

#[cfg(test)]
mod tests {
    use core::f32::consts::FRAC_PI_2;

    use super::*;

    fn straight_z(len: f32) -> StrandGeometry {
        StrandGeometry::from_points(vec![Vec3::ZERO, Vec3::new(0.0, 0.0, len)])
    }

    #[test]
    fn arc_length_accumulates() {
        let p = StrandGeometry::from_points(vec![
            Vec3::ZERO,
            Vec3::new(3.0, 4.0, 0.0),
            Vec3::new(3.0, 4.0, 2.0),
        ]);
        assert!((p.length() - 7.0).abs() < 1e-6);
        assert_eq!(p.edges().collect::<Vec<_>>(), vec![[0, 1], [1, 2]]);
    }

    #[test]
    fn straight_path_is_identity_deformation() {
        let path = straight_z(10.0);
        let mut g = StrandGraph::from_parts(
            vec![Vec3::new(0.1, -0.2, 0.0), Vec3::new(0.3, 0.4, 5.0)],
            vec![[0, 1]],
        );
        let before = g.clone();
        path.deform(&mut g);
        for (a, b) in before.vertices.iter().zip(&g.vertices) {
            assert!((*a - *b).length() < 1e-6);
        }
    }

    #[test]
    fn frame_extrapolates_past_the_end() {
        let path = straight_z(2.0);
        let f = path.frame_at(3.0);
        assert!((f.position - Vec3::new(0.0, 0.0, 3.0)).length() < 1e-6);
        let f = path.frame_at(-1.0);
        assert!((f.position - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-6);
    }

    #[test]
    fn bent_path_maps_z_to_arc_length() {
        let path = StrandGeometry::from_points(vec![
            Vec3::ZERO,
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(1.0, 0.0, 1.0),
        ]);
        let f = path.frame_at(1.5);
        assert!((f.position - Vec3::new(0.5, 0.0, 1.0)).length() < 1e-6);
        assert!((f.tangent - Vec3::X).length() < 1e-6);
    }

    #[test]
    fn twist_spins_the_cross_section() {
        let path = StrandGeometry::with_twist(
            vec![Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0)],
            vec![0.0, FRAC_PI_2],
        );
        let start = path.frame_at(0.0).place(1.0, 0.0);
        let end = path.frame_at(1.0).place(1.0, 0.0);
        assert!((start - Vec3::X).length() < 1e-6);
        assert!((end - Vec3::new(0.0, 1.0, 1.0)).length() < 1e-5);
    }
}
