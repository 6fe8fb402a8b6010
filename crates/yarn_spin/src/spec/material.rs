//! Hair-shader material description and strand thickness.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Material of fibres and flyaways, in one of two parameterizations.
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(tag = "type", rename_all = "lowercase")
)]
#[derive(Debug, Clone, PartialEq)]
pub enum MaterialSpec {
    /// Direct RGBA coloring.
    Direct {
        color: [f32; 4],
        roughness: f32,
        radial_roughness: f32,
        ior: f32,
        random_roughness: f32,
    },
    /// Pigment-based coloring.
    Melanin {
        melanin: f32,
        melanin_redness: f32,
        tint: [f32; 4],
        roughness: f32,
        radial_roughness: f32,
        ior: f32,
        random_color: f32,
        random_roughness: f32,
    },
}

impl Default for MaterialSpec {
    fn default() -> Self {
        MaterialSpec::Direct {
            color: [0.178, 0.178, 0.2, 1.0],
            roughness: 0.15,
            radial_roughness: 0.25,
            ior: 1.4,
            random_roughness: 0.0,
        }
    }
}

impl MaterialSpec {
    /// Flat color for previews: the direct color or the melanin tint.
    pub fn viewport_color(&self) -> [f32; 4] {
        match self {
            MaterialSpec::Direct { color, .. } => *color,
            MaterialSpec::Melanin { tint, .. } => *tint,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            MaterialSpec::Direct { .. } => "direct",
            MaterialSpec::Melanin { .. } => "melanin",
        }
    }

    pub fn validate(&self) -> Result<()> {
        let (rgba, unit, ior) = match self {
            MaterialSpec::Direct {
                color,
                roughness,
                radial_roughness,
                ior,
                random_roughness,
            } => (
                *color,
                vec![
                    ("roughness", *roughness),
                    ("radial_roughness", *radial_roughness),
                    ("random_roughness", *random_roughness),
                ],
                *ior,
            ),
            MaterialSpec::Melanin {
                melanin,
                melanin_redness,
                tint,
                roughness,
                radial_roughness,
                ior,
                random_color,
                random_roughness,
            } => (
                *tint,
                vec![
                    ("melanin", *melanin),
                    ("melanin_redness", *melanin_redness),
                    ("roughness", *roughness),
                    ("radial_roughness", *radial_roughness),
                    ("random_color", *random_color),
                    ("random_roughness", *random_roughness),
                ],
                *ior,
            ),
        };

        if rgba.iter().any(|c| !(0.0..=1.0).contains(c)) {
            return Err(Error::invalid(format!(
                "material ({}): color components must be in [0, 1]",
                self.type_name()
            )));
        }
        for (name, value) in unit {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::invalid(format!(
                    "material ({}): {name} must be in [0, 1] (got {value})",
                    self.type_name()
                )));
            }
        }
        if !(ior.is_finite() && ior > 0.0) {
            return Err(Error::invalid(format!(
                "material ({}): ior must be > 0 (got {ior})",
                self.type_name()
            )));
        }
        Ok(())
    }
}

/// Elliptical cross-section of rendered strands.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThicknessSpec {
    pub fiber_thickness_x: f32,
    pub fiber_thickness_y: f32,
    pub flyaway_thickness_x: f32,
    pub flyaway_thickness_y: f32,
}

impl Default for ThicknessSpec {
    fn default() -> Self {
        Self::uniform(0.01, 0.018)
    }
}

impl ThicknessSpec {
    /// Same cross-section for fibres and flyaways.
    pub fn uniform(x: f32, y: f32) -> Self {
        Self {
            fiber_thickness_x: x,
            fiber_thickness_y: y,
            flyaway_thickness_x: x,
            flyaway_thickness_y: y,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let all = [
            self.fiber_thickness_x,
            self.fiber_thickness_y,
            self.flyaway_thickness_x,
            self.flyaway_thickness_y,
        ];
        if all.iter().all(|t| t.is_finite() && *t > 0.0) {
            Ok(())
        } else {
            Err(Error::invalid("thickness values must be > 0"))
        }
    }
}
