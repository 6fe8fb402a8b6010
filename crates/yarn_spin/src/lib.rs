#![forbid(unsafe_code)]
//! yarn_spin: Procedural geometry for twisted multi-level yarns and their flyaway strands.
//!
//! Modules:
//! - spec: level trees, flyaway/material/thickness parameters, presets, random records
//! - sampling: random-stream helpers and cross-section placement (circle, packed area)
//! - curve: spiral paths and deformation of geometry along a path
//! - geometry: strand graphs (vertex/edge lists of open polylines) and adjacency
//! - build: recursive level construction, flyaway generation, events, the generator
//! - kernel: hand-off of finished geometry to a host geometry kernel
//!
//! Lengths are in millimetres. The same seed and record always give the same geometry.
pub mod build;
pub mod curve;
pub mod error;
pub mod geometry;
pub mod kernel;
pub mod sampling;
pub mod spec;

/// Convenient re-exports for common types. Import with `use yarn_spin::prelude::*;`.
pub mod prelude {
    pub use crate::build::events::{
        EventSink, FnSink, GenerationEvent, GenerationEventKind, VecSink,
    };
    pub use crate::build::flyaway::{
        generate_flyaways, Flyaway, FlyawayContext, FlyawayKind, FlyawayReport, FlyawaySet,
    };
    pub use crate::build::level::LevelBuilder;
    pub use crate::build::runner::{
        generate_strands, generate_yarn, GenerateConfig, GeneratedYarn, YarnGenerator,
    };
    pub use crate::curve::{PathFrame, SpiralBuilder, StrandGeometry};
    pub use crate::error::{Error, Result};
    pub use crate::geometry::{Adjacency, StrandGraph};
    pub use crate::kernel::{assemble, AssembledYarn, GeometryKernel, InMemoryKernel};
    pub use crate::sampling::{AreaSampling, CircleSampling, PlacedPoint, PlacementSampling};
    pub use crate::spec::presets::Preset;
    pub use crate::spec::sample::sample_yarn_record;
    pub use crate::spec::{
        CurveSpec, FiberSpec, FlyawayMapping, FlyawaySpec, LeafSpec, LevelSpec, MaterialSpec,
        Normal, PlacementSpec, ThicknessSpec, YarnRecord,
    };
}
