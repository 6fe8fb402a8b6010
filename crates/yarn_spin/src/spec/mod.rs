//! Parameter descriptions for yarn generation.
//!
//! A yarn is described by a tree of [`LevelSpec`]s: each level places copies of
//! its child (a straight fibre or another level) on a cross-section and winds
//! them along spirals. Lengths are in millimetres.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use rand::RngCore;

use crate::error::{Error, Result};
use crate::sampling::{AreaSampling, CircleSampling, PlacedPoint, PlacementSampling};

pub mod flyaway;
pub mod material;
pub mod presets;
pub mod record;
pub mod sample;

pub use flyaway::{FlyawayMapping, FlyawaySpec, Normal};
pub use material::{MaterialSpec, ThicknessSpec};
pub use record::YarnRecord;

/// One level of the fibre/ply hierarchy.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct LevelSpec {
    /// Optional label used in logs and events.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub name: Option<String>,
    /// Where the child copies sit in the cross-section.
    #[cfg_attr(feature = "serde", serde(rename = "placement_params"))]
    pub placement: PlacementSpec,
    /// How each child copy winds along the axis.
    #[cfg_attr(feature = "serde", serde(rename = "curve_params"))]
    pub curve: CurveSpec,
    /// The geometry being placed.
    #[cfg_attr(feature = "serde", serde(rename = "fiber_params"))]
    pub child: FiberSpec,
    /// Cross-section squash in (0, 1] applied to every non-center copy.
    #[cfg_attr(feature = "serde", serde(rename = "ellipse", default = "default_ellipse"))]
    pub ellipse_ratio: f32,
}

#[cfg(feature = "serde")]
fn default_ellipse() -> f32 {
    1.0
}

/// Cross-section placement of child copies.
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(tag = "type", rename_all = "UPPERCASE")
)]
#[derive(Debug, Clone, PartialEq)]
pub enum PlacementSpec {
    /// Evenly spaced ring, optionally with a middle strand.
    Circle {
        #[cfg_attr(feature = "serde", serde(rename = "num_points"))]
        count: usize,
        radius: f32,
        #[cfg_attr(feature = "serde", serde(default))]
        jitter_xy: f32,
        #[cfg_attr(feature = "serde", serde(rename = "middle_ply", default))]
        middle_strand: bool,
    },
    /// Spiral fill of a disc.
    Area {
        #[cfg_attr(feature = "serde", serde(rename = "num_points"))]
        count: usize,
        radius: f32,
        #[cfg_attr(feature = "serde", serde(default))]
        jitter_xy: f32,
    },
}

/// Spiral parameters of a level.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveSpec {
    /// Signed axial advance per turn; the sign selects handedness.
    #[cfg_attr(feature = "serde", serde(rename = "dif_z"))]
    pub twist_rate: f32,
    /// Axial jitter as a fraction of the advance per turn.
    #[cfg_attr(feature = "serde", serde(rename = "jitter_z", default))]
    pub axial_jitter: f32,
    /// Spread of the per-curve lateral migration amplitude.
    #[cfg_attr(feature = "serde", serde(rename = "migration", default))]
    pub migration_strength: f32,
}

/// The child of a level.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub enum FiberSpec {
    /// A straight fibre template.
    #[cfg_attr(feature = "serde", serde(rename = "line"))]
    Leaf(LeafSpec),
    /// A nested level.
    #[cfg_attr(feature = "serde", serde(rename = "yarn"))]
    Level(Box<LevelSpec>),
}

/// A straight fibre along +Z.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeafSpec {
    pub length: f32,
    /// Vertices per unit length.
    pub resolution: f32,
}

impl LeafSpec {
    pub fn new(length: f32, resolution: f32) -> Self {
        Self { length, resolution }
    }

    /// Number of template vertices, `round(resolution * length)`.
    pub fn vertex_count(&self) -> usize {
        (self.resolution * self.length).round().max(0.0) as usize
    }
}

impl PlacementSpec {
    pub fn circle(count: usize, radius: f32) -> Self {
        PlacementSpec::Circle {
            count,
            radius,
            jitter_xy: 0.0,
            middle_strand: false,
        }
    }

    pub fn area(count: usize, radius: f32) -> Self {
        PlacementSpec::Area {
            count,
            radius,
            jitter_xy: 0.0,
        }
    }

    /// Set the Gaussian placement jitter (builder-style).
    pub fn with_jitter(mut self, jitter: f32) -> Self {
        match &mut self {
            PlacementSpec::Circle { jitter_xy, .. } | PlacementSpec::Area { jitter_xy, .. } => {
                *jitter_xy = jitter
            }
        }
        self
    }

    /// Enable the middle strand. Has no effect on area placements.
    pub fn with_middle_strand(mut self, middle: bool) -> Self {
        if let PlacementSpec::Circle { middle_strand, .. } = &mut self {
            *middle_strand = middle;
        }
        self
    }

    pub fn count(&self) -> usize {
        match self {
            PlacementSpec::Circle { count, .. } | PlacementSpec::Area { count, .. } => *count,
        }
    }

    pub fn radius(&self) -> f32 {
        match self {
            PlacementSpec::Circle { radius, .. } | PlacementSpec::Area { radius, .. } => *radius,
        }
    }

    /// Number of points [`PlacementSpec::sample`] returns.
    pub fn point_count(&self) -> usize {
        match self {
            PlacementSpec::Circle {
                count,
                middle_strand,
                ..
            } => count + usize::from(*middle_strand),
            PlacementSpec::Area { count, .. } => *count,
        }
    }

    pub fn sampler(&self) -> Box<dyn PlacementSampling> {
        match *self {
            PlacementSpec::Circle {
                count,
                radius,
                jitter_xy,
                middle_strand,
            } => Box::new(
                CircleSampling::new(count, radius)
                    .with_jitter(jitter_xy)
                    .with_middle_strand(middle_strand),
            ),
            PlacementSpec::Area {
                count,
                radius,
                jitter_xy,
            } => Box::new(AreaSampling::new(count, radius).with_jitter(jitter_xy)),
        }
    }

    pub fn sample(&self, rng: &mut dyn RngCore) -> Vec<PlacedPoint> {
        self.sampler().generate(rng)
    }

    fn validate(&self, ctx: &str) -> Result<()> {
        let (radius, jitter) = match self {
            PlacementSpec::Circle {
                radius, jitter_xy, ..
            }
            | PlacementSpec::Area {
                radius, jitter_xy, ..
            } => (*radius, *jitter_xy),
        };
        if self.point_count() == 0 {
            return Err(Error::invalid(format!(
                "{ctx}: placement must yield at least one point"
            )));
        }
        if !(radius.is_finite() && radius > 0.0) {
            return Err(Error::invalid(format!(
                "{ctx}: placement radius must be > 0 (got {radius})"
            )));
        }
        if !(jitter.is_finite() && jitter >= 0.0) {
            return Err(Error::invalid(format!(
                "{ctx}: jitter_xy must be >= 0 (got {jitter})"
            )));
        }
        Ok(())
    }
}

impl CurveSpec {
    pub fn new(twist_rate: f32) -> Self {
        Self {
            twist_rate,
            axial_jitter: 0.0,
            migration_strength: 0.0,
        }
    }

    pub fn with_axial_jitter(mut self, axial_jitter: f32) -> Self {
        self.axial_jitter = axial_jitter;
        self
    }

    pub fn with_migration(mut self, migration_strength: f32) -> Self {
        self.migration_strength = migration_strength;
        self
    }

    fn validate(&self, ctx: &str) -> Result<()> {
        if !(self.twist_rate.is_finite() && self.twist_rate != 0.0) {
            return Err(Error::invalid(format!(
                "{ctx}: twist rate must be finite and non-zero (got {})",
                self.twist_rate
            )));
        }
        if !(self.axial_jitter.is_finite() && self.axial_jitter >= 0.0) {
            return Err(Error::invalid(format!(
                "{ctx}: axial jitter must be >= 0"
            )));
        }
        if !(self.migration_strength.is_finite() && self.migration_strength >= 0.0) {
            return Err(Error::invalid(format!(
                "{ctx}: migration strength must be >= 0"
            )));
        }
        Ok(())
    }
}

impl FiberSpec {
    pub fn leaf(length: f32, resolution: f32) -> Self {
        FiberSpec::Leaf(LeafSpec::new(length, resolution))
    }

    pub fn level(spec: LevelSpec) -> Self {
        FiberSpec::Level(Box::new(spec))
    }
}

impl LevelSpec {
    /// A level with no ellipse squash and no name.
    pub fn new(placement: PlacementSpec, curve: CurveSpec, child: FiberSpec) -> Self {
        Self {
            name: None,
            placement,
            curve,
            child,
            ellipse_ratio: 1.0,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_ellipse(mut self, ellipse_ratio: f32) -> Self {
        self.ellipse_ratio = ellipse_ratio;
        self
    }

    /// Levels from this one down to the leaf, inclusive of this level.
    pub fn depth(&self) -> usize {
        match &self.child {
            FiberSpec::Leaf(_) => 1,
            FiberSpec::Level(child) => 1 + child.depth(),
        }
    }

    /// The straight fibre at the bottom of the tree.
    pub fn leaf(&self) -> &LeafSpec {
        match &self.child {
            FiberSpec::Leaf(leaf) => leaf,
            FiberSpec::Level(child) => child.leaf(),
        }
    }

    /// Number of leaf fibre instances the tree produces.
    pub fn strand_count(&self) -> usize {
        let here = self.placement.point_count();
        match &self.child {
            FiberSpec::Leaf(_) => here,
            FiberSpec::Level(child) => here * child.strand_count(),
        }
    }

    /// Total vertex count of the built yarn.
    pub fn vertex_count(&self) -> usize {
        self.strand_count() * self.leaf().vertex_count()
    }

    /// Display label: the name, or `level {depth}`.
    pub(crate) fn label(&self, depth: usize) -> String {
        match &self.name {
            Some(name) => format!("level {depth} ({name})"),
            None => format!("level {depth}"),
        }
    }

    /// Check the whole tree. Runs before any geometry is produced.
    pub fn validate(&self) -> Result<()> {
        self.validate_at(0)
    }

    fn validate_at(&self, depth: usize) -> Result<()> {
        let ctx = self.label(depth);
        self.placement.validate(&ctx)?;
        self.curve.validate(&ctx)?;
        if !(self.ellipse_ratio > 0.0 && self.ellipse_ratio <= 1.0) {
            return Err(Error::invalid(format!(
                "{ctx}: ellipse ratio must be in (0, 1] (got {})",
                self.ellipse_ratio
            )));
        }
        match &self.child {
            FiberSpec::Leaf(leaf) => {
                if !(leaf.length.is_finite() && leaf.length > 0.0) {
                    return Err(Error::invalid(format!(
                        "{ctx}: fibre length must be > 0 (got {})",
                        leaf.length
                    )));
                }
                if !(leaf.resolution.is_finite() && leaf.resolution > 0.0) {
                    return Err(Error::invalid(format!(
                        "{ctx}: fibre resolution must be > 0 (got {})",
                        leaf.resolution
                    )));
                }
                if leaf.vertex_count() < 2 {
                    return Err(Error::invalid(format!(
                        "{ctx}: fibre needs at least two vertices (resolution * length = {})",
                        leaf.resolution * leaf.length
                    )));
                }
                Ok(())
            }
            FiberSpec::Level(child) => child.validate_at(depth + 1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_level() -> LevelSpec {
        let fibers = LevelSpec::new(
            PlacementSpec::area(93, 0.38),
            CurveSpec::new(-3.65).with_axial_jitter(0.02),
            FiberSpec::leaf(40.0, 4.0),
        );
        LevelSpec::new(
            PlacementSpec::circle(4, 0.37),
            CurveSpec::new(10.7),
            FiberSpec::level(fibers),
        )
        .with_ellipse(0.84)
    }

    #[test]
    fn counts_multiply_down_the_tree() {
        let spec = two_level();
        assert_eq!(spec.depth(), 2);
        assert_eq!(spec.strand_count(), 372);
        assert_eq!(spec.leaf().vertex_count(), 160);
        assert_eq!(spec.vertex_count(), 372 * 160);
        assert!(spec.validate().is_ok());
    }

    #[test]
    fn middle_strand_adds_one_point() {
        let p = PlacementSpec::circle(3, 1.0).with_middle_strand(true);
        assert_eq!(p.point_count(), 4);
        let a = PlacementSpec::area(3, 1.0).with_middle_strand(true);
        assert_eq!(a.point_count(), 3);
    }

    #[test]
    fn zero_twist_is_rejected() {
        let spec = LevelSpec::new(
            PlacementSpec::circle(2, 0.3),
            CurveSpec::new(0.0),
            FiberSpec::leaf(10.0, 2.0),
        );
        assert!(matches!(spec.validate(), Err(Error::InvalidSpec(_))));
    }

    #[test]
    fn nested_errors_name_the_level() {
        let inner = LevelSpec::new(
            PlacementSpec::area(5, -1.0),
            CurveSpec::new(1.0),
            FiberSpec::leaf(10.0, 2.0),
        )
        .with_name("l1");
        let outer = LevelSpec::new(
            PlacementSpec::circle(2, 0.3),
            CurveSpec::new(2.0),
            FiberSpec::level(inner),
        );
        let err = outer.validate().expect_err("negative radius");
        assert!(err.to_string().contains("level 1 (l1)"), "{err}");
    }

    #[test]
    fn ellipse_and_leaf_ranges_are_checked() {
        let bad_ellipse = two_level().with_ellipse(1.5);
        assert!(bad_ellipse.validate().is_err());

        let short_leaf = LevelSpec::new(
            PlacementSpec::circle(1, 0.1),
            CurveSpec::new(1.0),
            FiberSpec::leaf(0.1, 1.0),
        );
        assert!(short_leaf.validate().is_err());

        let empty = LevelSpec::new(
            PlacementSpec::circle(0, 0.1),
            CurveSpec::new(1.0),
            FiberSpec::leaf(10.0, 1.0),
        );
        assert!(empty.validate().is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn level_tree_uses_record_field_names() {
        let json = serde_json::to_value(two_level()).expect("serialize");
        assert_eq!(json["placement_params"]["type"], "CIRCLE");
        assert_eq!(json["placement_params"]["num_points"], 4);
        assert_eq!(json["fiber_params"]["yarn"]["placement_params"]["type"], "AREA");
        assert_eq!(json["fiber_params"]["yarn"]["fiber_params"]["line"]["length"], 40.0);
        assert!(json["curve_params"]["dif_z"].is_number());

        let back: LevelSpec = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, two_level());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn malformed_child_is_rejected() {
        let json = r#"{
            "placement_params": {"type": "AREA", "num_points": 3, "radius": 0.2},
            "curve_params": {"dif_z": 1.0},
            "fiber_params": {},
            "ellipse": 1
        }"#;
        assert!(serde_json::from_str::<LevelSpec>(json).is_err());

        let unknown_kind = r#"{
            "placement_params": {"type": "HEX", "num_points": 3, "radius": 0.2},
            "curve_params": {"dif_z": 1.0},
            "fiber_params": {"line": {"length": 10, "resolution": 4}},
            "ellipse": 1
        }"#;
        assert!(serde_json::from_str::<LevelSpec>(unknown_kind).is_err());
    }
}
