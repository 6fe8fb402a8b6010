//! Recursive construction of the fibre/ply hierarchy.
use rand::RngCore;
use tracing::{debug, info};

use crate::build::events::{EventSink, GenerationEvent, GenerationEventKind};
use crate::curve::spiral::{DEFAULT_STEPS_PER_TURN, DEFAULT_SUBDIVISIONS};
use crate::curve::SpiralBuilder;
use crate::geometry::StrandGraph;
use crate::spec::{FiberSpec, LevelSpec};

/// Builds the strand graph of a [`LevelSpec`] tree.
///
/// Each level samples its placements, builds its child once, then for every
/// placement squashes and orients a copy of the child, winds it along a fresh
/// spiral and appends it to the level output. Copies never share vertices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelBuilder {
    /// Spiral control points per turn.
    pub steps_per_turn: usize,
    /// Spline samples per spiral control segment.
    pub subdivisions: usize,
}

impl Default for LevelBuilder {
    fn default() -> Self {
        Self {
            steps_per_turn: DEFAULT_STEPS_PER_TURN,
            subdivisions: DEFAULT_SUBDIVISIONS,
        }
    }
}

impl LevelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_resolution(mut self, steps_per_turn: usize, subdivisions: usize) -> Self {
        self.steps_per_turn = steps_per_turn;
        self.subdivisions = subdivisions;
        self
    }

    /// Build `spec` without reporting events.
    ///
    /// `spec` is expected to be valid; see [`LevelSpec::validate`].
    pub fn build(&self, spec: &LevelSpec, rng: &mut dyn RngCore) -> StrandGraph {
        self.build_with_events(spec, rng, &mut ())
    }

    pub fn build_with_events(
        &self,
        spec: &LevelSpec,
        rng: &mut dyn RngCore,
        sink: &mut dyn EventSink,
    ) -> StrandGraph {
        self.build_level(spec, 0, rng, sink)
    }

    fn build_level(
        &self,
        spec: &LevelSpec,
        depth: usize,
        rng: &mut dyn RngCore,
        sink: &mut dyn EventSink,
    ) -> StrandGraph {
        // Placement draws come before anything the child consumes.
        let placements = spec.placement.sample(rng);

        let template = match &spec.child {
            FiberSpec::Leaf(leaf) => StrandGraph::straight_line(leaf.length, leaf.vertex_count()),
            FiberSpec::Level(child) => self.build_level(child, depth + 1, rng, sink),
        };
        let required_length = template.max_z();

        let mut out = StrandGraph::with_capacity(
            template.vertex_count() * placements.len(),
            template.polyline_count() * placements.len(),
        );

        for point in &placements {
            let mut copy = template.clone();
            if !point.is_center {
                copy.scale_xy(spec.ellipse_ratio, 1.0);
                copy.rotate_z(point.position.y.atan2(point.position.x));
            }

            let path = SpiralBuilder::new(&spec.curve, point.position)
                .with_resolution(self.steps_per_turn, self.subdivisions)
                .build(required_length, rng);
            path.deform(&mut copy);
            out.append(&copy);
        }

        let label = spec.label(depth);
        debug!(depth, required_length, "level template length");
        info!(
            "Built {}: {} placements, {} polylines, {} vertices.",
            label,
            placements.len(),
            out.polyline_count(),
            out.vertex_count()
        );
        if sink.wants(GenerationEventKind::LevelBuilt) {
            sink.send(GenerationEvent::LevelBuilt {
                depth,
                name: label,
                placements: placements.len(),
                polylines: out.polyline_count(),
                vertices: out.vertex_count(),
            });
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::build::events::VecSink;
    use crate::spec::{CurveSpec, PlacementSpec};

    fn single_level(placement: PlacementSpec) -> LevelSpec {
        LevelSpec::new(
            placement,
            CurveSpec::new(-3.0).with_axial_jitter(0.02),
            FiberSpec::leaf(10.0, 2.0),
        )
    }

    #[test]
    fn one_polyline_per_placement() {
        let spec = single_level(PlacementSpec::area(12, 0.3));
        let g = LevelBuilder::new().build(&spec, &mut StdRng::seed_from_u64(1));
        assert_eq!(g.polyline_count(), 12);
        assert_eq!(g.vertex_count(), 12 * 20);
        assert_eq!(g.vertex_count() - g.edge_count(), 12);
        for line in g.polylines() {
            assert_eq!(line.len(), 20);
        }
    }

    #[test]
    fn single_placement_is_valid() {
        let spec = single_level(PlacementSpec::circle(1, 0.2));
        let g = LevelBuilder::new().build(&spec, &mut StdRng::seed_from_u64(2));
        assert_eq!(g.polyline_count(), 1);
        assert!(g.vertices.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn nested_levels_multiply() {
        let plies = LevelSpec::new(
            PlacementSpec::circle(3, 0.5),
            CurveSpec::new(6.0),
            FiberSpec::level(single_level(PlacementSpec::area(5, 0.2))),
        )
        .with_ellipse(0.8);
        let mut sink = VecSink::filtered([GenerationEventKind::LevelBuilt]);
        let g = LevelBuilder::new().build_with_events(
            &plies,
            &mut StdRng::seed_from_u64(3),
            &mut sink,
        );
        assert_eq!(g.polyline_count(), 15);
        assert_eq!(g.vertex_count(), 15 * 20);

        // Inner level finishes first.
        let depths: Vec<usize> = sink
            .as_slice()
            .iter()
            .filter_map(|e| match e {
                GenerationEvent::LevelBuilt { depth, .. } => Some(*depth),
                _ => None,
            })
            .collect();
        assert_eq!(depths, vec![1, 0]);
    }

    #[test]
    fn center_strand_follows_the_axis() {
        let spec = LevelSpec::new(
            PlacementSpec::circle(3, 0.4).with_middle_strand(true),
            CurveSpec::new(2.0),
            FiberSpec::leaf(5.0, 4.0),
        )
        .with_ellipse(0.5);
        let g = LevelBuilder::new().build(&spec, &mut StdRng::seed_from_u64(4));
        assert_eq!(g.polyline_count(), 4);

        let center = g.polylines().last().expect("middle strand is placed last");
        for v in center {
            assert!(v.truncate().length() < 1e-4, "{v}");
        }
        let first = g.polylines().next().expect("ring strand");
        assert!((first[0] - Vec3::new(0.0, 0.4, 0.0)).length() < 1e-4);
    }

    #[test]
    fn placements_are_drawn_before_the_child() {
        // The axis-only child maps its first vertex onto the parent's spiral start.
        let axis = LevelSpec::new(
            PlacementSpec::circle(0, 0.1).with_middle_strand(true),
            CurveSpec::new(2.0).with_migration(0.2),
            FiberSpec::leaf(5.0, 4.0),
        );
        let plies = LevelSpec::new(
            PlacementSpec::circle(3, 0.5).with_jitter(0.05),
            CurveSpec::new(4.0),
            FiberSpec::level(axis),
        );
        let g = LevelBuilder::new().build(&plies, &mut StdRng::seed_from_u64(21));
        let expected = plies.placement.sample(&mut StdRng::seed_from_u64(21));

        let first = g.polylines().next().expect("first ply");
        assert!((first[0].truncate() - expected[0].position).length() < 1e-4);
    }

    #[test]
    fn same_seed_same_geometry() {
        let spec = single_level(PlacementSpec::area(6, 0.3).with_jitter(0.01));
        let a = LevelBuilder::new().build(&spec, &mut StdRng::seed_from_u64(9));
        let b = LevelBuilder::new().build(&spec, &mut StdRng::seed_from_u64(9));
        assert_eq!(a, b);
    }
}
