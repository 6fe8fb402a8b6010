//! Yarn construction: the level hierarchy, flyaways and the generator tying them together.
pub mod events;
pub mod flyaway;
pub mod level;
pub mod runner;

pub use flyaway::{
    generate_flyaways, Flyaway, FlyawayContext, FlyawayKind, FlyawayReport, FlyawaySet,
};
pub use level::LevelBuilder;
pub use runner::{generate_strands, generate_yarn, GenerateConfig, GeneratedYarn, YarnGenerator};
