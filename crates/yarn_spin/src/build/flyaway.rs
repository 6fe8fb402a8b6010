//! Flyaway generation: loops and hairs grown off an existing strand graph.
//!
//! Each attempt picks a random vertex of the yarn, walks along its polyline for a
//! sampled number of vertices, copies the walk and bends the copy away from the
//! yarn. Attempts that start on an isolated vertex or run into a polyline end
//! are skipped and counted, never retried.
use core::f32::consts::PI;

use glam::{Quat, Vec3};
use rand::RngCore;
use tracing::{info, warn};

use crate::geometry::{other_end, Adjacency, StrandGraph};
use crate::sampling::{gaussian, index, rand01};
use crate::spec::{FlyawaySpec, LevelSpec};

/// Chance that a flyaway uses its long variant.
pub const LONG_FLYAWAY_PROBABILITY: f32 = 0.04;
/// Loop bow height per unit of sampled loop distance.
pub const LOOP_DISTANCE_SCALE: f32 = 0.1;

/// Hair spread along x relative to the walk start; negative mirrors the hair.
const HAIR_SQUEEZE_X: f32 = -1.0;
/// Loop compression along x relative to the walk start.
const LOOP_SQUEEZE_X: f32 = 2.0;

/// Properties of the yarn the flyaways attach to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlyawayContext {
    /// Length of the leaf fibre template.
    pub fiber_length: f32,
    /// Vertices per unit length of the leaf fibre template.
    pub fiber_resolution: f32,
    /// Placement radius of the outermost level.
    pub yarn_radius: f32,
}

impl FlyawayContext {
    pub fn from_level(spec: &LevelSpec) -> Self {
        let leaf = spec.leaf();
        Self {
            fiber_length: leaf.length,
            fiber_resolution: leaf.resolution,
            yarn_radius: spec.placement.radius(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlyawayKind {
    /// Both ends stay anchored; the middle bows outward.
    Loop,
    /// One end anchored, the rest tilted away from the yarn.
    Hair,
}

/// One generated flyaway polyline.
#[derive(Debug, Clone, PartialEq)]
pub struct Flyaway {
    pub kind: FlyawayKind,
    /// Whether the long variant was drawn.
    pub long: bool,
    pub points: Vec<Vec3>,
}

/// Counts of one flyaway pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlyawayReport {
    /// Attempts made, `round(amount_density * fiber_length)`.
    pub target: usize,
    /// Flyaways produced.
    pub realized: usize,
    pub loops: usize,
    pub hairs: usize,
    /// Attempts that started on a vertex without edges.
    pub isolated_start: usize,
    /// Attempts whose walk hit a polyline end too early.
    pub dead_end: usize,
}

impl FlyawayReport {
    pub fn skipped(&self) -> usize {
        self.isolated_start + self.dead_end
    }

    pub fn is_complete(&self) -> bool {
        self.realized == self.target
    }
}

/// Generated flyaways and the pass report.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlyawaySet {
    pub strands: Vec<Flyaway>,
    pub report: FlyawayReport,
}

impl FlyawaySet {
    pub fn len(&self) -> usize {
        self.strands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strands.is_empty()
    }

    /// All flyaways as one graph, one polyline each.
    pub fn to_graph(&self) -> StrandGraph {
        let vertices = self.strands.iter().map(|f| f.points.len()).sum();
        let mut g = StrandGraph::with_capacity(vertices, self.strands.len());
        for f in &self.strands {
            g.push_polyline(f.points.iter().copied());
        }
        g
    }
}

/// Shape parameters of one attempt.
struct Draw {
    kind: FlyawayKind,
    long: bool,
    length: f32,
    distance: f32,
}

impl Draw {
    fn sample(spec: &FlyawaySpec, rng: &mut dyn RngCore) -> Self {
        let kind = if rand01(rng) < spec.loop_probability {
            FlyawayKind::Loop
        } else {
            FlyawayKind::Hair
        };
        let long = rand01(rng) < LONG_FLYAWAY_PROBABILITY;

        let (length, distance) = match kind {
            FlyawayKind::Loop if long => (
                2.0 * spec.loop_length.mean,
                gaussian(rng, 2.0 * spec.loop_distance.mean, spec.loop_distance.std),
            ),
            FlyawayKind::Loop => {
                let length = gaussian(rng, spec.loop_length.mean, spec.loop_length.std);
                let mean = spec.loop_distance.mean;
                let d = gaussian(rng, mean, spec.loop_distance.std);
                // Reflected so loops never bow less than the mean.
                (length, if d < mean { mean + (mean - d) } else { d })
            }
            FlyawayKind::Hair => {
                let mean = if long {
                    3.0 * spec.hair_length.mean
                } else {
                    spec.hair_length.mean
                };
                (gaussian(rng, mean, spec.hair_length.std), 0.0)
            }
        };

        Self {
            kind,
            long,
            length,
            distance: distance * LOOP_DISTANCE_SCALE,
        }
    }

    /// Walk length in vertices, including the anchor vertices that get dropped.
    fn walk_vertices(&self, resolution: f32) -> usize {
        let body = (self.length * resolution).round().max(1.0) as usize;
        match self.kind {
            FlyawayKind::Loop => body + 2,
            FlyawayKind::Hair => body + 1,
        }
    }
}

/// Grow flyaways off `yarn`.
///
/// Makes exactly `spec.target_count(ctx.fiber_length)` attempts. Nothing is drawn
/// when `spec.enable` is false.
pub fn generate_flyaways(
    yarn: &StrandGraph,
    spec: &FlyawaySpec,
    ctx: &FlyawayContext,
    rng: &mut dyn RngCore,
) -> FlyawaySet {
    if !spec.enable {
        return FlyawaySet::default();
    }

    let mut report = FlyawayReport {
        target: spec.target_count(ctx.fiber_length),
        ..Default::default()
    };
    if yarn.is_empty() {
        warn!("Yarn has no vertices; no flyaways generated.");
        return FlyawaySet {
            strands: Vec::new(),
            report,
        };
    }

    let adjacency = yarn.adjacency();
    let mut strands = Vec::with_capacity(report.target);

    for _ in 0..report.target {
        let draw = Draw::sample(spec, rng);
        let walk_len = draw.walk_vertices(ctx.fiber_resolution);

        let start = index(rng, yarn.vertex_count()) as u32;
        let Some(path) = walk(&adjacency, yarn, start, walk_len, rng, &mut report) else {
            continue;
        };

        let points = shape(path, &draw, spec);
        match draw.kind {
            FlyawayKind::Loop => report.loops += 1,
            FlyawayKind::Hair => report.hairs += 1,
        }
        strands.push(Flyaway {
            kind: draw.kind,
            long: draw.long,
            points,
        });
    }
    report.realized = strands.len();

    info!(
        "Created {} of {} flyaways (yarn radius {:.3}).",
        report.realized, report.target, ctx.yarn_radius
    );
    FlyawaySet { strands, report }
}

/// Positions of a walk of `len` vertices starting at `start`, or `None` when
/// the walk cannot be completed.
fn walk(
    adjacency: &Adjacency,
    yarn: &StrandGraph,
    start: u32,
    len: usize,
    rng: &mut dyn RngCore,
    report: &mut FlyawayReport,
) -> Option<Vec<Vec3>> {
    let incident = adjacency.incident_edges(start as usize);
    let mut came_from = match incident.len() {
        0 => {
            report.isolated_start += 1;
            return None;
        }
        1 => incident[0],
        // The chosen edge is treated as already traversed, so it sets the direction.
        _ => {
            if rand01(rng) > 0.5 {
                incident[0]
            } else {
                incident[1]
            }
        }
    };

    let mut at = start;
    let mut points = Vec::with_capacity(len + 1);
    points.push(yarn.vertices[at as usize]);
    while points.len() <= len {
        let incident = adjacency.incident_edges(at as usize);
        if incident.len() < 2 {
            break;
        }
        let next_edge = if incident[0] != came_from {
            incident[0]
        } else {
            incident[1]
        };
        at = other_end(yarn.edges[next_edge as usize], at);
        points.push(yarn.vertices[at as usize]);
        came_from = next_edge;
    }

    if points.len() < len {
        report.dead_end += 1;
        return None;
    }
    Some(points)
}

/// Squeeze a copied walk and bend it into a loop or hair.
fn shape(mut points: Vec<Vec3>, draw: &Draw, spec: &FlyawaySpec) -> Vec<Vec3> {
    let Some(&anchor) = points.first() else {
        return points;
    };
    let last = points[points.len() - 1];
    let dir = Vec3::new(last.x, last.y, 0.0)
        .try_normalize()
        .unwrap_or(Vec3::X);

    let (squeeze_z, squeeze_x) = match draw.kind {
        FlyawayKind::Loop => (1.0, LOOP_SQUEEZE_X),
        FlyawayKind::Hair => (spec.hair_squeeze, HAIR_SQUEEZE_X),
    };
    for p in &mut points {
        p.z = anchor.z + (p.z - anchor.z) / squeeze_z;
        p.x = anchor.x + (p.x - anchor.x) / squeeze_x;
    }

    match draw.kind {
        FlyawayKind::Loop => {
            let mut inner = points;
            inner.pop();
            inner.remove(0);
            let n = inner.len() as f32;
            for (i, p) in inner.iter_mut().enumerate() {
                *p += dir * (i as f32 * PI / n).sin() * draw.distance;
            }
            inner
        }
        FlyawayKind::Hair => {
            let mut tail = points.split_off(1);
            let pivot = tail[0];
            let rotation = Quat::from_axis_angle(dir, spec.hair_angle);
            for p in &mut tail {
                *p = pivot + rotation * (*p - pivot);
            }
            tail
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::spec::{FlyawayMapping, Normal};

    fn spec(loop_prob: f32) -> FlyawaySpec {
        FlyawaySpec::from_mapping(FlyawayMapping {
            amount: 2.0,
            loop_prob,
            hair_length_mean: 1.0,
            hair_angle: 0.8,
            loop_length_mean: 1.5,
            loop_distance_mean: 3.0,
            loop_distance_std: 0.5,
            fuzziness: 0.4,
        })
    }

    fn ctx() -> FlyawayContext {
        FlyawayContext {
            fiber_length: 10.0,
            fiber_resolution: 4.0,
            yarn_radius: 0.5,
        }
    }

    /// Closed ring of `n` vertices around the z axis: every vertex has degree 2.
    fn ring(n: usize) -> StrandGraph {
        let vertices = (0..n)
            .map(|i| {
                let a = i as f32 / n as f32 * core::f32::consts::TAU;
                Vec3::new(a.cos() * 0.5, a.sin() * 0.5, i as f32 * 0.01)
            })
            .collect();
        let edges = (0..n as u32).map(|i| [i, (i + 1) % n as u32]).collect();
        StrandGraph::from_parts(vertices, edges)
    }

    #[test]
    fn min_degree_two_realizes_every_attempt() {
        let g = ring(400);
        let set = generate_flyaways(&g, &spec(0.5), &ctx(), &mut StdRng::seed_from_u64(1));
        assert_eq!(set.report.target, 20);
        assert_eq!(set.report.realized, 20);
        assert!(set.report.is_complete());
        assert_eq!(set.report.loops + set.report.hairs, 20);
        assert_eq!(set.report.skipped(), 0);
    }

    #[test]
    fn isolated_vertices_are_skipped_and_counted() {
        let g = StrandGraph::from_parts(vec![Vec3::ZERO, Vec3::X, Vec3::Y], Vec::new());
        let set = generate_flyaways(&g, &spec(0.5), &ctx(), &mut StdRng::seed_from_u64(2));
        assert_eq!(set.report.realized, 0);
        assert_eq!(set.report.isolated_start, set.report.target);
        assert!(set.is_empty());
    }

    /// Replays only the per-attempt shape draws and the start index.
    fn replay_attempt_draws(spec: &FlyawaySpec, vertex_count: usize, seed: u64) -> StdRng {
        let mut rng = StdRng::seed_from_u64(seed);
        for _ in 0..spec.target_count(ctx().fiber_length) {
            Draw::sample(spec, &mut rng);
            index(&mut rng, vertex_count);
        }
        rng
    }

    #[test]
    fn isolated_start_draws_nothing_more() {
        let g = StrandGraph::from_parts(vec![Vec3::ZERO, Vec3::X, Vec3::Y], Vec::new());
        let s = spec(0.5);
        let mut rng = StdRng::seed_from_u64(12);
        let set = generate_flyaways(&g, &s, &ctx(), &mut rng);
        assert_eq!(set.report.isolated_start, 20);

        let mut expected = replay_attempt_draws(&s, g.vertex_count(), 12);
        assert_eq!(rng.next_u64(), expected.next_u64());
    }

    #[test]
    fn degree_one_start_skips_the_direction_coin() {
        let mut g = StrandGraph::new();
        for i in 0..10 {
            g.push_polyline([Vec3::new(i as f32, 0.0, 0.0), Vec3::new(i as f32, 0.0, 0.1)]);
        }
        let s = spec(0.5);
        let mut rng = StdRng::seed_from_u64(13);
        let set = generate_flyaways(&g, &s, &ctx(), &mut rng);
        assert_eq!(set.report.dead_end, 20);

        let mut expected = replay_attempt_draws(&s, g.vertex_count(), 13);
        assert_eq!(rng.next_u64(), expected.next_u64());
    }

    #[test]
    fn certain_loop_probability_always_loops() {
        let g = ring(400);
        let set = generate_flyaways(&g, &spec(1.0), &ctx(), &mut StdRng::seed_from_u64(14));
        assert_eq!(set.report.loops, set.report.target);
        assert_eq!(set.report.hairs, 0);
    }

    #[test]
    fn short_polylines_dead_end() {
        let mut g = StrandGraph::new();
        for i in 0..10 {
            g.push_polyline([Vec3::new(i as f32, 0.0, 0.0), Vec3::new(i as f32, 0.0, 0.1)]);
        }
        let set = generate_flyaways(&g, &spec(0.5), &ctx(), &mut StdRng::seed_from_u64(3));
        assert_eq!(set.report.realized, 0);
        assert_eq!(set.report.dead_end, set.report.target);
    }

    #[test]
    fn realized_never_exceeds_target() {
        let mut g = StrandGraph::new();
        for i in 0..8 {
            let x = i as f32 * 0.1;
            g.push_polyline((0..40).map(|k| Vec3::new(x, 0.2, k as f32 * 0.25)));
        }
        let set = generate_flyaways(&g, &spec(0.5), &ctx(), &mut StdRng::seed_from_u64(4));
        let r = set.report;
        assert!(r.realized <= r.target);
        assert_eq!(r.realized + r.skipped(), r.target);
        assert_eq!(set.to_graph().polyline_count(), r.realized);
    }

    #[test]
    fn loops_drop_both_anchor_vertices() {
        let g = ring(400);
        let mut s = spec(1.0);
        s.loop_length = Normal::new(1.5, 0.0);
        let set = generate_flyaways(&g, &s, &ctx(), &mut StdRng::seed_from_u64(5));
        for f in &set.strands {
            assert_eq!(f.kind, FlyawayKind::Loop);
            // Eight steps give nine vertices; the seven between the anchors remain.
            if !f.long {
                assert_eq!(f.points.len(), 7);
            }
        }
    }

    #[test]
    fn hairs_drop_the_first_vertex() {
        let g = ring(400);
        let mut s = spec(0.0);
        s.hair_length = Normal::new(1.0, 0.0);
        let set = generate_flyaways(&g, &s, &ctx(), &mut StdRng::seed_from_u64(6));
        assert_eq!(set.report.hairs, set.report.realized);
        for f in set.strands.iter().filter(|f| !f.long) {
            assert_eq!(f.points.len(), 5);
        }
    }

    #[test]
    fn disabled_spec_draws_nothing() {
        let g = ring(50);
        let mut rng_a = StdRng::seed_from_u64(7);
        let mut rng_b = StdRng::seed_from_u64(7);
        let set = generate_flyaways(&g, &spec(0.5).with_enable(false), &ctx(), &mut rng_a);
        assert!(set.is_empty());
        assert_eq!(set.report.target, 0);
        assert_eq!(rng_a.next_u32(), rng_b.next_u32());
    }

    #[test]
    fn loop_distance_is_reflected_above_the_mean() {
        let s = spec(1.0);
        let mut rng = StdRng::seed_from_u64(8);
        for _ in 0..200 {
            let d = Draw::sample(&s, &mut rng);
            assert!(d.distance >= s.loop_distance.mean * LOOP_DISTANCE_SCALE - 1e-5 || d.long);
        }
    }
}
