//! Random yarn records for building training sets.
//!
//! [`sample_yarn_record`] draws a physically plausible two-level yarn: fibre
//! count, ply count, packing fractions and helix angles are drawn first, and
//! radii and twist rates follow from them.
use core::f32::consts::{FRAC_PI_2, TAU};

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;

use crate::sampling::{index, uniform};
use crate::spec::{
    CurveSpec, FiberSpec, FlyawayMapping, FlyawaySpec, LevelSpec, MaterialSpec, PlacementSpec,
    ThicknessSpec, YarnRecord,
};

/// Fibre template length of sampled yarns.
pub const SAMPLE_FIBER_LENGTH: f32 = 60.0;
/// Fibre template resolution of sampled yarns.
pub const SAMPLE_FIBER_RESOLUTION: f32 = 4.0;

const FIBER_JITTER_Z: f32 = 0.02;
const MAX_FIBER_THICKNESS: f32 = 0.02;
const MAX_FLYAWAY_AMOUNT: f32 = 300.0;

/// Draw a random, valid [`YarnRecord`]. The same seed gives the same record.
pub fn sample_yarn_record(seed: u64) -> YarnRecord {
    let mut rng = StdRng::seed_from_u64(seed);
    let rng = &mut rng;

    let fiber_jitter_xy = uniform(rng, 0.0, 0.03);
    let ply_jitter_xy = uniform(rng, 0.0, 0.02);
    let migration = uniform(rng, 0.0, 0.3);

    let thickness_x = uniform(rng, 0.006, 0.01);
    let thickness_y = uniform(rng, thickness_x, 2.5 * thickness_x).min(MAX_FIBER_THICKNESS);

    // Half-open: [2, 7) plies and [40, 200) fibres.
    let ply_count = 2 + index(rng, 5);
    let fiber_count = 40 + index(rng, 160);

    let ellipse = match ply_count {
        2 => uniform(rng, 0.67, 0.9),
        3 => uniform(rng, 0.72, 0.91),
        _ => uniform(rng, 0.85, 0.95),
    };

    // Helix angle and packing of the fibres inside a ply.
    let ply_helix = uniform(rng, 50.0, 81.0).to_radians();
    let ply_packing = uniform(rng, 0.035, 0.215);
    let fiber_radius =
        (fiber_count as f32 * thickness_x * thickness_y / ply_packing / ellipse).sqrt();

    // Packing of the plies inside the yarn.
    let yarn_packing = if ply_count > 4 {
        uniform(rng, 0.65, 0.82)
    } else {
        uniform(rng, 0.55, 0.82)
    };
    let ply_extent_x = fiber_radius / ply_helix.sin();
    let ply_extent_y = ellipse * ply_extent_x;
    let ply_radius =
        (ply_count as f32 * ply_extent_x * ply_extent_y / yarn_packing).sqrt() - ply_extent_y;
    let ply_twist = TAU * ply_radius * ply_helix.tan();

    let fiber_helix = uniform(rng, 50.0, 81.0).to_radians();
    let fiber_twist = -TAU * fiber_radius * fiber_helix.tan();

    let fibers = LevelSpec::new(
        PlacementSpec::area(fiber_count, fiber_radius).with_jitter(fiber_jitter_xy),
        CurveSpec::new(fiber_twist)
            .with_axial_jitter(FIBER_JITTER_Z)
            .with_migration(migration),
        FiberSpec::leaf(SAMPLE_FIBER_LENGTH, SAMPLE_FIBER_RESOLUTION),
    )
    .with_name("l1");
    let plies = LevelSpec::new(
        PlacementSpec::circle(ply_count, ply_radius).with_jitter(ply_jitter_xy),
        CurveSpec::new(ply_twist),
        FiberSpec::level(fibers),
    )
    .with_name("l2")
    .with_ellipse(ellipse);

    let material = MaterialSpec::Direct {
        roughness: uniform(rng, 0.001, 0.6),
        radial_roughness: uniform(rng, 0.2, 0.99),
        ior: uniform(rng, 1.4, 1.62),
        color: [
            uniform(rng, 0.0, 1.0),
            uniform(rng, 0.0, 1.0),
            uniform(rng, 0.0, 1.0),
            1.0,
        ],
        random_roughness: uniform(rng, 0.0, 1.0),
    };

    let flyaways = sample_flyaways(
        rng,
        fiber_count,
        ply_count,
        ply_radius,
        fiber_radius * ellipse,
        ply_twist,
    );

    debug!(
        seed,
        fiber_count, ply_count, fiber_radius, ply_radius, "sampled yarn record"
    );

    YarnRecord::new(plies, flyaways)
        .with_material(material)
        .with_thickness(ThicknessSpec::uniform(thickness_x, thickness_y))
}

/// Flyaway parameters scaled to the overall yarn radius.
fn sample_flyaways(
    rng: &mut StdRng,
    fiber_count: usize,
    ply_count: usize,
    ply_radius: f32,
    ply_half_width: f32,
    ply_twist: f32,
) -> FlyawaySpec {
    let loop_length = ply_twist.abs();
    let whole_radius = ply_radius + ply_half_width;

    let loop_distance_mean = uniform(rng, 3.0 * whole_radius, 20.0 * whole_radius);
    let headroom = 20.0 * whole_radius - loop_distance_mean;
    let loop_distance_std = uniform(rng, 0.01, headroom.min(5.0).max(0.01));
    let max_amount = ((fiber_count * ply_count * 2) as f32).min(MAX_FLYAWAY_AMOUNT);

    let hair_length_mean = uniform(rng, 1.5 * whole_radius, 8.0 * whole_radius);
    let hair_angle = uniform(rng, 0.05, FRAC_PI_2);
    let amount = uniform(rng, 30.0, max_amount);
    let loop_prob = uniform(rng, 0.35, 0.65);
    let loop_length_mean = uniform(rng, 0.6 * loop_length, 1.3 * loop_length);
    let fuzziness = uniform(rng, 0.0, 1.0);

    FlyawaySpec::from_mapping(FlyawayMapping {
        amount: amount * SAMPLE_FIBER_RESOLUTION / SAMPLE_FIBER_LENGTH,
        loop_prob,
        hair_length_mean,
        hair_angle,
        loop_length_mean,
        loop_distance_mean,
        loop_distance_std,
        fuzziness,
    })
}
