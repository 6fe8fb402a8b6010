//! Cylindrical spiral paths with fibre migration and axial jitter.
use core::f32::consts::TAU;

use glam::{Quat, Vec2, Vec3};
use rand::RngCore;
use tracing::debug;

use crate::curve::StrandGeometry;
use crate::sampling::{gaussian, rand01, uniform};
use crate::spec::CurveSpec;

/// Control points per full turn.
pub const DEFAULT_STEPS_PER_TURN: usize = 16;
/// Evaluated samples per control segment.
pub const DEFAULT_SUBDIVISIONS: usize = 12;

/// Builds one spiral path around the shared strand axis.
///
/// Positive `twist_rate` winds clockwise seen from +Z, negative counter-clockwise;
/// the magnitude is the axial advance per turn. The spiral starts at azimuth
/// `start_angle` on a cylinder of `radius`.
#[derive(Debug, Clone)]
pub struct SpiralBuilder {
    /// Distance from the strand axis.
    pub radius: f32,
    /// Azimuth of the first point, `atan2(y, x)` of the placement offset.
    pub start_angle: f32,
    /// Signed axial advance per turn.
    pub twist_rate: f32,
    /// Axial jitter as a fraction of the advance per turn.
    pub axial_jitter: f32,
    /// Standard deviation of the per-curve migration amplitude.
    pub migration_strength: f32,
    /// Control points per turn.
    pub steps_per_turn: usize,
    /// Catmull–Rom samples per control segment.
    pub subdivisions: usize,
}

/// Random draws taken once per curve instance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Migration {
    pub phase_offset: f32,
    pub phase_speed: f32,
    pub amplitude: f32,
}

impl Migration {
    /// Draws `phase_offset`, `phase_speed` and the amplitude, in that order.
    /// All three are consumed even when `strength` is zero.
    pub fn sample(strength: f32, rng: &mut dyn RngCore) -> Self {
        let phase_offset = uniform(rng, 0.0, TAU);
        let phase_speed = uniform(rng, 0.0, 2.0);
        let amplitude = gaussian(rng, 0.0, strength).max(0.0);
        Self {
            phase_offset,
            phase_speed,
            amplitude,
        }
    }

    /// Lateral scale at height `z`.
    #[inline]
    pub fn scale_at(&self, z: f32) -> f32 {
        1.0 + self.amplitude * (self.phase_offset + z * self.phase_speed).cos()
    }
}

impl SpiralBuilder {
    /// Spiral through `start` using the curve parameters of a level.
    pub fn new(curve: &CurveSpec, start: Vec2) -> Self {
        Self {
            radius: start.length(),
            start_angle: start.y.atan2(start.x),
            twist_rate: curve.twist_rate,
            axial_jitter: curve.axial_jitter,
            migration_strength: curve.migration_strength,
            steps_per_turn: DEFAULT_STEPS_PER_TURN,
            subdivisions: DEFAULT_SUBDIVISIONS,
        }
    }

    pub fn with_resolution(mut self, steps_per_turn: usize, subdivisions: usize) -> Self {
        self.steps_per_turn = steps_per_turn.max(3);
        self.subdivisions = subdivisions.max(1);
        self
    }

    /// Turns needed so the path covers `required_length` whatever the migration
    /// and jitter draws turn out to be.
    ///
    /// Migration can pull the radius down to zero, so only the axial advance is
    /// counted. Jitter can shorten the axial span by up to `axial_jitter` turns,
    /// which the spare turns absorb. The count depends on the parameters only,
    /// never on drawn values.
    pub fn turns_for_length(&self, required_length: f32) -> usize {
        let advance = self.twist_rate.abs();
        if advance <= 0.0 || !required_length.is_finite() || required_length <= 0.0 {
            return 1;
        }
        let spare = 1 + self.axial_jitter.max(0.0).floor() as usize;
        (required_length / advance).ceil() as usize + spare
    }

    /// Build a path long enough to carry geometry whose local z reaches `required_length`.
    ///
    /// Draw order: the three [`Migration`] draws, then one axial jitter draw per
    /// control point. The draws do not depend on `axial_jitter` or
    /// `migration_strength` being zero.
    pub fn build(&self, required_length: f32, rng: &mut dyn RngCore) -> StrandGeometry {
        let turns = self.turns_for_length(required_length);
        let steps = self.steps_per_turn.max(3);
        let advance = self.twist_rate.abs();
        // Clockwise (positive twist) means decreasing azimuth.
        let direction = if self.twist_rate > 0.0 { -1.0 } else { 1.0 };
        let step_phi = direction * TAU / steps as f32;
        let step_z = advance / steps as f32;
        let control_count = turns * steps + 1;

        debug!(
            radius = self.radius,
            twist_rate = self.twist_rate,
            turns,
            control_count,
            "building spiral"
        );

        let migration = Migration::sample(self.migration_strength, rng);

        let mut control = Vec::with_capacity(control_count);
        let mut phase = Vec::with_capacity(control_count);
        for k in 0..control_count {
            let phi = k as f32 * step_phi;
            let z = k as f32 * step_z;
            let xy = Vec2::new(phi.cos(), phi.sin()) * self.radius * migration.scale_at(z);
            let jitter = (rand01(rng) - 0.5) * advance * self.axial_jitter;
            control.push(Vec3::new(xy.x, xy.y, z + jitter));
            phase.push(phi);
        }

        let orient = Quat::from_rotation_z(self.start_angle);
        for p in &mut control {
            *p = orient * *p;
        }

        let (points, twist) = catmull_rom(&control, &phase, self.subdivisions.max(1));
        StrandGeometry::with_twist(points, twist)
    }
}

/// Uniform Catmull–Rom evaluation through `control`, clamped at both ends.
/// `phase` is interpolated linearly alongside.
fn catmull_rom(control: &[Vec3], phase: &[f32], subdivisions: usize) -> (Vec<Vec3>, Vec<f32>) {
    let n = control.len();
    if n < 2 {
        return (control.to_vec(), phase.to_vec());
    }

    let mut points = Vec::with_capacity((n - 1) * subdivisions + 1);
    let mut twist = Vec::with_capacity(points.capacity());

    for k in 0..n - 1 {
        let p0 = control[k.saturating_sub(1)];
        let p1 = control[k];
        let p2 = control[k + 1];
        let p3 = control[(k + 2).min(n - 1)];

        for j in 0..subdivisions {
            let t = j as f32 / subdivisions as f32;
            let t2 = t * t;
            let t3 = t2 * t;
            let p = 0.5
                * ((2.0 * p1)
                    + (p2 - p0) * t
                    + (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * t2
                    + (3.0 * p1 - p0 - 3.0 * p2 + p3) * t3);
            points.push(p);
            twist.push(phase[k] + (phase[k + 1] - phase[k]) * t);
        }
    }

    points.push(control[n - 1]);
    twist.push(phase[n - 1]);
    (points, twist)
}
