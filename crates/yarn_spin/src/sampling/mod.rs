//! Placement sampling and the random-stream primitives shared by every generation step.
//!
//! All randomness in the crate flows through a single `&mut dyn RngCore` threaded
//! by the caller. The helpers below consume a fixed number of `u32` words per call
//! so that the draw order (and therefore the produced geometry) only depends on the
//! seed and the inputs.
use glam::Vec2;
use rand::RngCore;

pub mod area;
pub mod circle;

pub use area::AreaSampling;
pub use circle::CircleSampling;

/// A sampled 2D offset inside a cross-section.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedPoint {
    /// Offset from the shared strand axis.
    pub position: Vec2,
    /// True for the un-jittered middle strand of a circle placement.
    pub is_center: bool,
}

impl PlacedPoint {
    pub fn new(position: Vec2) -> Self {
        Self {
            position,
            is_center: false,
        }
    }

    pub fn center() -> Self {
        Self {
            position: Vec2::ZERO,
            is_center: true,
        }
    }
}

/// Trait for cross-section placement.
pub trait PlacementSampling: Send + Sync {
    fn generate(&self, rng: &mut dyn RngCore) -> Vec<PlacedPoint>;
}

/// Generate a random float in the range [0, 1).
///
/// Keeps the top 24 bits of one word so every value is exact in `f32`.
#[inline]
pub fn rand01(rng: &mut dyn RngCore) -> f32 {
    (rng.next_u32() >> 8) as f32 / (1u32 << 24) as f32
}

/// Uniform float in `[low, high]`.
#[inline]
pub fn uniform(rng: &mut dyn RngCore, low: f32, high: f32) -> f32 {
    low + (high - low) * rand01(rng)
}

/// Two independent standard normal samples (Box–Muller). Always consumes two words.
pub fn gaussian_pair(rng: &mut dyn RngCore) -> (f32, f32) {
    let u1 = (1.0 - rand01(rng)).clamp(f32::MIN_POSITIVE, 1.0);
    let u2 = rand01(rng);

    let r = (-2.0 * u1.ln()).sqrt();
    let theta = 2.0 * core::f32::consts::PI * u2;

    (r * theta.cos(), r * theta.sin())
}

/// Normal sample with the given mean and standard deviation.
///
/// A negative `std` is treated as zero; the draw is still consumed.
#[inline]
pub fn gaussian(rng: &mut dyn RngCore, mean: f32, std: f32) -> f32 {
    let (n, _) = gaussian_pair(rng);
    mean + std.max(0.0) * n
}

/// Uniform index in `[0, len)`. `len` must be non-zero.
#[inline]
pub fn index(rng: &mut dyn RngCore, len: usize) -> usize {
    debug_assert!(len > 0, "index() requires a non-empty range");
    let i = (rand01(rng) as f64 * len as f64) as usize;
    i.min(len.saturating_sub(1))
}

/// Isotropic 2D Gaussian offset with standard deviation `sigma`.
#[inline]
pub(crate) fn jitter2(rng: &mut dyn RngCore, sigma: f32) -> Vec2 {
    let (nx, ny) = gaussian_pair(rng);
    Vec2::new(nx, ny) * sigma.max(0.0)
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    struct FixedRng {
        value: u32,
        calls: usize,
    }

    impl RngCore for FixedRng {
        fn next_u32(&mut self) -> u32 {
            self.calls += 1;
            self.value
        }

        fn next_u64(&mut self) -> u64 {
            self.calls += 1;
            self.value as u64
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            let bytes = self.value.to_le_bytes();
            for (i, b) in dest.iter_mut().enumerate() {
                *b = bytes[i % 4];
            }
        }
    }

    #[test]
    fn rand01_returns_zero_for_zero_input() {
        let mut rng = FixedRng { value: 0, calls: 0 };
        assert_eq!(rand01(&mut rng), 0.0);
    }

    #[test]
    fn rand01_stays_in_unit_range() {
        for value in [0, 1, 1000, u32::MAX / 2, u32::MAX - 1, u32::MAX] {
            let mut rng = FixedRng { value, calls: 0 };
            let r = rand01(&mut rng);
            assert!((0.0..1.0).contains(&r), "rand01({value}) = {r}");
        }
    }

    #[test]
    fn rand01_top_word_stays_below_one() {
        let mut rng = FixedRng {
            value: u32::MAX,
            calls: 0,
        };
        let r = rand01(&mut rng);
        assert!(r < 1.0);
        assert_eq!(rng.calls, 1);
    }

    #[test]
    fn gaussian_consumes_two_words_even_with_zero_std() {
        let mut rng = FixedRng {
            value: u32::MAX / 3,
            calls: 0,
        };
        let v = gaussian(&mut rng, 1.5, 0.0);
        assert_eq!(v, 1.5);
        assert_eq!(rng.calls, 2);
    }

    #[test]
    fn index_is_in_range() {
        let mut rng = FixedRng {
            value: u32::MAX,
            calls: 0,
        };
        assert_eq!(index(&mut rng, 7), 6);

        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..1000 {
            assert!(index(&mut rng, 5) < 5);
        }
    }

    #[test]
    fn gaussian_moments_are_plausible() {
        let mut rng = StdRng::seed_from_u64(11);
        let n = 20_000;
        let samples: Vec<f32> = (0..n).map(|_| gaussian(&mut rng, 2.0, 0.5)).collect();
        let mean = samples.iter().sum::<f32>() / n as f32;
        let var = samples.iter().map(|s| (s - mean).powi(2)).sum::<f32>() / n as f32;
        assert!((mean - 2.0).abs() < 0.02, "mean {mean}");
        assert!((var.sqrt() - 0.5).abs() < 0.02, "std {}", var.sqrt());
    }

    #[test]
    fn uniform_respects_bounds() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..1000 {
            let v = uniform(&mut rng, -2.0, 3.0);
            assert!((-2.0..=3.0).contains(&v));
        }
    }
}
