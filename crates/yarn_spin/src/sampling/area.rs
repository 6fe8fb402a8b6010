//! Spiral area fill for packing many strands inside a disc.
use core::f32::consts::TAU;

use glam::Vec2;
use rand::RngCore;

use crate::sampling::{jitter2, PlacedPoint, PlacementSampling};

/// Angular increment between consecutive points, in turns.
pub const AREA_ANGLE_STEP: f32 = 0.137;
/// Radial growth exponent of the fill.
pub const AREA_RADIUS_EXPONENT: f32 = 0.3;

/// Packs `count` strands inside a disc of `radius` along a deterministic spiral.
///
/// Point `i` (1-based) sits at angle `i * 0.137` turns and radius
/// `i^0.3 / (count^0.3 / radius)`, so the outermost point lands on `radius`
/// before jitter.
#[derive(Debug, Clone)]
pub struct AreaSampling {
    /// Number of strands.
    pub count: usize,
    /// Disc radius.
    pub radius: f32,
    /// Standard deviation of the per-point Gaussian offset.
    pub jitter_xy: f32,
}

impl AreaSampling {
    pub fn new(count: usize, radius: f32) -> Self {
        Self {
            count,
            radius,
            jitter_xy: 0.0,
        }
    }

    pub fn with_jitter(mut self, jitter_xy: f32) -> Self {
        self.jitter_xy = jitter_xy;
        self
    }
}

impl PlacementSampling for AreaSampling {
    fn generate(&self, rng: &mut dyn RngCore) -> Vec<PlacedPoint> {
        if self.count == 0 {
            return Vec::new();
        }

        let scale = (self.count as f32).powf(AREA_RADIUS_EXPONENT) / self.radius;
        let mut out = Vec::with_capacity(self.count);

        for i in 1..=self.count {
            let fi = i as f32;
            let angle = fi * AREA_ANGLE_STEP * TAU;
            let r = fi.powf(AREA_RADIUS_EXPONENT) / scale;
            let p = Vec2::new(angle.sin(), angle.cos()) * r;
            out.push(PlacedPoint::new(p + jitter2(rng, self.jitter_xy)));
        }

        out
    }
}
