//! Evenly spaced ring placement with an optional middle strand.
use core::f32::consts::TAU;

use glam::Vec2;
use rand::RngCore;

use crate::sampling::{jitter2, PlacedPoint, PlacementSampling};

/// Places `count` strands on a ring of `radius`, angle measured from +Y.
#[derive(Debug, Clone)]
pub struct CircleSampling {
    /// Number of strands on the ring.
    pub count: usize,
    /// Ring radius.
    pub radius: f32,
    /// Standard deviation of the per-point Gaussian offset.
    pub jitter_xy: f32,
    /// Append an un-jittered strand at the origin.
    pub middle_strand: bool,
}

impl CircleSampling {
    pub fn new(count: usize, radius: f32) -> Self {
        Self {
            count,
            radius,
            jitter_xy: 0.0,
            middle_strand: false,
        }
    }

    pub fn with_jitter(mut self, jitter_xy: f32) -> Self {
        self.jitter_xy = jitter_xy;
        self
    }

    pub fn with_middle_strand(mut self, middle_strand: bool) -> Self {
        self.middle_strand = middle_strand;
        self
    }
}

impl PlacementSampling for CircleSampling {
    fn generate(&self, rng: &mut dyn RngCore) -> Vec<PlacedPoint> {
        let mut out = Vec::with_capacity(self.count + usize::from(self.middle_strand));

        for i in 0..self.count {
            let angle = i as f32 / self.count as f32 * TAU;
            let ring = Vec2::new(angle.sin(), angle.cos()) * self.radius;
            // The jitter pair is drawn even when jitter_xy is zero.
            out.push(PlacedPoint::new(ring + jitter2(rng, self.jitter_xy)));
        }

        if self.middle_strand {
            out.push(PlacedPoint::center());
        }

        out
    }
}
