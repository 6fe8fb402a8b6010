//! The per-sample parameter record.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::spec::{FlyawaySpec, LevelSpec, MaterialSpec, ThicknessSpec};

/// Everything needed to regenerate one yarn sample.
///
/// With the `serde` feature this serializes to the record stored next to each
/// rendered image, keyed `fiber`, `material`, `flyaways` and `thickness`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct YarnRecord {
    pub fiber: LevelSpec,
    pub material: MaterialSpec,
    pub flyaways: FlyawaySpec,
    pub thickness: ThicknessSpec,
}

impl YarnRecord {
    pub fn new(fiber: LevelSpec, flyaways: FlyawaySpec) -> Self {
        Self {
            fiber,
            material: MaterialSpec::default(),
            flyaways,
            thickness: ThicknessSpec::default(),
        }
    }

    pub fn with_material(mut self, material: MaterialSpec) -> Self {
        self.material = material;
        self
    }

    pub fn with_thickness(mut self, thickness: ThicknessSpec) -> Self {
        self.thickness = thickness;
        self
    }

    /// Validate every part; the first failure wins.
    pub fn validate(&self) -> Result<()> {
        self.fiber.validate()?;
        self.flyaways.validate()?;
        self.material.validate()?;
        self.thickness.validate()
    }
}
