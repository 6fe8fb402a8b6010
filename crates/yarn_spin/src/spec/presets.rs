//! Tuned parameter sets for a handful of real yarns.
use crate::spec::{
    CurveSpec, FiberSpec, FlyawayMapping, FlyawaySpec, LevelSpec, MaterialSpec, PlacementSpec,
    ThicknessSpec, YarnRecord,
};

/// Length of the fibre template used by every preset.
pub const PRESET_FIBER_LENGTH: f32 = 40.0;
/// Vertices per millimetre of the fibre template used by every preset.
pub const PRESET_FIBER_RESOLUTION: f32 = 4.0;
/// Axial jitter of the fibre level.
pub const PRESET_FIBER_JITTER_Z: f32 = 0.02;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Preset {
    /// Light 2-ply.
    Light,
    /// Orange 4-ply.
    Orange,
    /// Thick grey 2-ply.
    GreyThick,
    /// Two thick grey 2-ply strands plied again.
    GreyThick4Level,
    /// Light rose 5-ply.
    LightRose,
}

impl Preset {
    pub const ALL: [Preset; 5] = [
        Preset::Light,
        Preset::Orange,
        Preset::GreyThick,
        Preset::GreyThick4Level,
        Preset::LightRose,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Preset::Light => "light",
            Preset::Orange => "orange",
            Preset::GreyThick => "grey_thick",
            Preset::GreyThick4Level => "grey_thick_4level",
            Preset::LightRose => "light_rose",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }

    pub fn record(&self) -> YarnRecord {
        match self {
            Preset::Light => YarnRecord::new(
                plies(
                    fibers(93, 0.380_022_56, 0.010_824_423, -3.654_383_2, 0.232_999_06),
                    2,
                    0.368_774_98,
                    10.704_875,
                    0.837_595_94,
                ),
                flyaways(223.0, 0.468_342_72, 4.745_858_2, 1.122_419_4, 0.481_244_12, 8.142_321_6, 13.118_077, 2.084_929),
            )
            .with_thickness(ThicknessSpec::uniform(0.01, 0.018)),

            Preset::Orange => YarnRecord::new(
                plies(
                    fibers(52, 0.309_079_4, 0.014_676_226, -3.180_836_7, 0.198_125_5),
                    4,
                    0.440_245_45,
                    6.994_841_6,
                    0.888_654_35,
                ),
                flyaways(163.0, 0.541_712_28, 3.503_388_2, 1.069_558_1, 0.460_392_39, 5.139_950_8, 7.834_269, 1.778_832_3),
            )
            .with_thickness(ThicknessSpec::uniform(0.01, 0.018)),

            Preset::GreyThick => YarnRecord::new(
                grey_thick_plies(),
                grey_thick_flyaways(),
            )
            .with_thickness(ThicknessSpec::uniform(0.007, 0.011)),

            Preset::GreyThick4Level => YarnRecord::new(
                LevelSpec::new(
                    PlacementSpec::circle(2, 0.32),
                    CurveSpec::new(-4.825_475),
                    FiberSpec::level(grey_thick_plies()),
                )
                .with_name("l3")
                .with_ellipse(0.86),
                grey_thick_flyaways(),
            )
            .with_thickness(ThicknessSpec::uniform(0.007, 0.011)),

            Preset::LightRose => YarnRecord::new(
                plies(
                    fibers(104, 0.457_953_27, 0.009_535_204_6, -4.442_648_4, 0.262_635_32),
                    5,
                    0.742_345_7,
                    12.714_859,
                    0.986_184_7,
                ),
                flyaways(170.0, 0.530_443_79, 2.807_143_9, 0.750_175_6, 0.616_677_4, 7.098_300_9, 12.789_481, 2.404_696_5),
            )
            .with_material(MaterialSpec::Direct {
                color: [0.449_208_4, 0.263_626_5, 0.531_009_55, 1.0],
                roughness: 0.161_490_87,
                radial_roughness: 0.298_310_55,
                ior: 1.395_990_6,
                random_roughness: 0.962_946_65,
            })
            .with_thickness(ThicknessSpec::uniform(0.007, 0.011)),
        }
    }
}

fn fibers(count: usize, radius: f32, jitter_xy: f32, twist_rate: f32, migration: f32) -> LevelSpec {
    LevelSpec::new(
        PlacementSpec::area(count, radius).with_jitter(jitter_xy),
        CurveSpec::new(twist_rate)
            .with_axial_jitter(PRESET_FIBER_JITTER_Z)
            .with_migration(migration),
        FiberSpec::leaf(PRESET_FIBER_LENGTH, PRESET_FIBER_RESOLUTION),
    )
    .with_name("l1")
}

fn plies(child: LevelSpec, count: usize, radius: f32, twist_rate: f32, ellipse: f32) -> LevelSpec {
    LevelSpec::new(
        PlacementSpec::circle(count, radius),
        CurveSpec::new(twist_rate),
        FiberSpec::level(child),
    )
    .with_name("l2")
    .with_ellipse(ellipse)
}

fn grey_thick_plies() -> LevelSpec {
    plies(
        fibers(148, 0.334_109_7, 0.009_817_581_6, -2.524_704_5, 0.155_375_45),
        2,
        0.254_418_4,
        3.825_475,
        0.693_864_35,
    )
}

fn grey_thick_flyaways() -> FlyawaySpec {
    flyaways(176.0, 0.435_677_08, 1.925_833_7, 0.967_732_49, 0.429_410_96, 4.025_258_1, 5.416_306, 1.696_907_3)
}

/// `amount` is a flyaway count per fibre; [`FlyawaySpec`] stores it per millimetre.
#[allow(clippy::too_many_arguments)]
fn flyaways(
    amount: f32,
    loop_prob: f32,
    hair_length_mean: f32,
    hair_angle: f32,
    fuzziness: f32,
    loop_length_mean: f32,
    loop_distance_mean: f32,
    loop_distance_std: f32,
) -> FlyawaySpec {
    FlyawaySpec::from_mapping(FlyawayMapping {
        amount: amount * PRESET_FIBER_RESOLUTION / PRESET_FIBER_LENGTH,
        loop_prob,
        hair_length_mean,
        hair_angle,
        loop_length_mean,
        loop_distance_mean,
        loop_distance_std,
        fuzziness,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for p in Preset::ALL {
            assert_eq!(Preset::from_name(p.name()), Some(p));
        }
        assert_eq!(Preset::from_name("tweed"), None);
    }

    #[test]
    fn four_level_preset_nests_three_levels() {
        let r = Preset::GreyThick4Level.record();
        assert_eq!(r.fiber.depth(), 3);
        assert_eq!(r.fiber.strand_count(), 2 * 2 * 148);
    }

    #[test]
    fn light_preset_matches_reference_counts() {
        let r = Preset::Light.record();
        assert_eq!(r.fiber.strand_count(), 186);
        assert_eq!(r.fiber.leaf().vertex_count(), 160);
        assert_eq!(r.flyaways.target_count(PRESET_FIBER_LENGTH), 892);
    }
}
