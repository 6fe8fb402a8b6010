//! Flyaway parameters and the mapping from regression-friendly parameters.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Standard deviation of the hair length set by [`FlyawaySpec::from_mapping`].
pub const MAPPED_HAIR_LENGTH_STD: f32 = 0.05;
/// Standard deviation of the loop length set by [`FlyawaySpec::from_mapping`].
pub const MAPPED_LOOP_LENGTH_STD: f32 = 0.01;

/// A normal distribution, serialized as `[mean, std]`.
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(from = "(f32, f32)", into = "(f32, f32)")
)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normal {
    pub mean: f32,
    pub std: f32,
}

impl Normal {
    pub const fn new(mean: f32, std: f32) -> Self {
        Self { mean, std }
    }
}

impl From<(f32, f32)> for Normal {
    fn from((mean, std): (f32, f32)) -> Self {
        Self { mean, std }
    }
}

impl From<Normal> for (f32, f32) {
    fn from(n: Normal) -> Self {
        (n.mean, n.std)
    }
}

/// Flyaway population parameters.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct FlyawaySpec {
    /// Flyaways per unit of fibre length.
    #[cfg_attr(feature = "serde", serde(rename = "amount"))]
    pub amount_density: f32,
    /// Probability that a flyaway is a loop rather than a hair.
    #[cfg_attr(feature = "serde", serde(rename = "loop_prob"))]
    pub loop_probability: f32,
    pub hair_length: Normal,
    /// Rotation of a hair about the yarn's radial direction, radians.
    pub hair_angle: f32,
    /// Axial compression of hairs.
    pub hair_squeeze: f32,
    #[cfg_attr(feature = "serde", serde(rename = "loop_length_short"))]
    pub loop_length: Normal,
    /// Loop bow height factor.
    #[cfg_attr(feature = "serde", serde(rename = "loop_distance_factor_short"))]
    pub loop_distance: Normal,
    #[cfg_attr(feature = "serde", serde(default = "enabled"))]
    pub enable: bool,
    /// The parameters this spec was mapped from, if any.
    #[cfg_attr(
        feature = "serde",
        serde(
            rename = "mapping_parameters",
            default,
            skip_serializing_if = "Option::is_none"
        )
    )]
    pub mapping: Option<FlyawayMapping>,
}

#[cfg(feature = "serde")]
fn enabled() -> bool {
    true
}

/// Compact flyaway description; the quantities estimated from images.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlyawayMapping {
    pub amount: f32,
    pub loop_prob: f32,
    pub hair_length_mean: f32,
    pub hair_angle: f32,
    pub loop_length_mean: f32,
    pub loop_distance_mean: f32,
    pub loop_distance_std: f32,
    /// In [0, 1]; drives the hair squeeze.
    #[cfg_attr(feature = "serde", serde(rename = "fuzzyness"))]
    pub fuzziness: f32,
}

impl FlyawaySpec {
    /// Expand mapping parameters into a full spec.
    pub fn from_mapping(mapping: FlyawayMapping) -> Self {
        Self {
            amount_density: mapping.amount,
            loop_probability: mapping.loop_prob,
            hair_length: Normal::new(mapping.hair_length_mean, MAPPED_HAIR_LENGTH_STD),
            hair_angle: mapping.hair_angle,
            hair_squeeze: 1.0 + mapping.fuzziness * 1.5,
            loop_length: Normal::new(mapping.loop_length_mean, MAPPED_LOOP_LENGTH_STD),
            loop_distance: Normal::new(mapping.loop_distance_mean, mapping.loop_distance_std),
            enable: true,
            mapping: Some(mapping),
        }
    }

    /// Disable generation without discarding the parameters (builder-style).
    pub fn with_enable(mut self, enable: bool) -> Self {
        self.enable = enable;
        self
    }

    /// Number of generation attempts for a fibre of `fiber_length`.
    pub fn target_count(&self, fiber_length: f32) -> usize {
        (self.amount_density * fiber_length).round().max(0.0) as usize
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.amount_density.is_finite() && self.amount_density >= 0.0) {
            return Err(Error::invalid(format!(
                "flyaways: amount must be >= 0 (got {})",
                self.amount_density
            )));
        }
        if !(0.0..=1.0).contains(&self.loop_probability) {
            return Err(Error::invalid(format!(
                "flyaways: loop probability must be in [0, 1] (got {})",
                self.loop_probability
            )));
        }
        if !(self.hair_squeeze.is_finite() && self.hair_squeeze > 0.0) {
            return Err(Error::invalid(format!(
                "flyaways: hair squeeze must be > 0 (got {})",
                self.hair_squeeze
            )));
        }
        if !self.hair_angle.is_finite() {
            return Err(Error::invalid("flyaways: hair angle must be finite"));
        }
        for (name, n) in [
            ("hair_length", self.hair_length),
            ("loop_length", self.loop_length),
            ("loop_distance", self.loop_distance),
        ] {
            if !(n.mean.is_finite() && n.std.is_finite() && n.std >= 0.0) {
                return Err(Error::invalid(format!(
                    "flyaways: {name} needs a finite mean and std >= 0"
                )));
            }
        }
        Ok(())
    }
}
