//! Event types and sinks for observing yarn generation.
//!
//! A [`GenerationEvent`] is emitted at each stage of
//! [`crate::build::runner::YarnGenerator::generate_with_events`]. Sinks choose
//! which kinds they receive through [`EventSink::wants`].
use crate::build::flyaway::FlyawayReport;
use crate::build::runner::GenerateConfig;

/// Describes events emitted while generating a yarn.
#[non_exhaustive]
#[derive(Debug, Clone)]
pub enum GenerationEvent {
    /// Emitted once the record passed validation, before any geometry is built.
    GenerationStarted {
        /// The configuration used.
        config: GenerateConfig,
        /// Number of levels in the fibre tree.
        depth: usize,
        /// Number of leaf fibres the tree will produce.
        strand_count: usize,
    },

    /// Emitted after a level has placed, spiralled and merged its child copies.
    LevelBuilt {
        /// Depth of the level; 0 is the outermost.
        depth: usize,
        /// Level label for logs.
        name: String,
        /// Child copies placed on the cross-section.
        placements: usize,
        /// Polylines in the level's output.
        polylines: usize,
        /// Vertices in the level's output.
        vertices: usize,
    },

    /// Emitted after the flyaway pass.
    FlyawaysGenerated {
        /// Attempt and outcome counts.
        report: FlyawayReport,
    },

    /// Emitted when the yarn is complete.
    GenerationFinished {
        /// Vertices in the fibre geometry.
        fiber_vertices: usize,
        /// Vertices in the flyaway geometry.
        flyaway_vertices: usize,
    },

    /// Non-fatal warning generated during generation.
    Warning {
        /// Context string (e.g. level label).
        context: String,
        /// Human-readable message.
        message: String,
    },
}

/// Discriminant of [`GenerationEvent`], used for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GenerationEventKind {
    GenerationStarted,
    LevelBuilt,
    FlyawaysGenerated,
    GenerationFinished,
    Warning,
}

impl GenerationEvent {
    pub fn kind(&self) -> GenerationEventKind {
        match self {
            GenerationEvent::GenerationStarted { .. } => GenerationEventKind::GenerationStarted,
            GenerationEvent::LevelBuilt { .. } => GenerationEventKind::LevelBuilt,
            GenerationEvent::FlyawaysGenerated { .. } => GenerationEventKind::FlyawaysGenerated,
            GenerationEvent::GenerationFinished { .. } => GenerationEventKind::GenerationFinished,
            GenerationEvent::Warning { .. } => GenerationEventKind::Warning,
        }
    }
}

/// A generic event sink that accepts [`GenerationEvent`]s.
pub trait EventSink {
    fn send(&mut self, event: GenerationEvent);

    /// Whether events of `kind` should be built and sent at all.
    #[inline]
    fn wants(&self, _kind: GenerationEventKind) -> bool {
        true
    }
}

/// A no-op event sink.
impl EventSink for () {
    #[inline]
    fn send(&mut self, _event: GenerationEvent) {}

    #[inline]
    fn wants(&self, _kind: GenerationEventKind) -> bool {
        false
    }
}

/// An event sink that forwards to a user-provided closure.
pub struct FnSink<F>
where
    F: FnMut(GenerationEvent),
{
    f: F,
}

impl<F> FnSink<F>
where
    F: FnMut(GenerationEvent),
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> EventSink for FnSink<F>
where
    F: FnMut(GenerationEvent),
{
    #[inline]
    fn send(&mut self, event: GenerationEvent) {
        (self.f)(event);
    }
}

/// An event sink that collects events in a `Vec`, optionally only some kinds.
#[derive(Default)]
pub struct VecSink {
    events: Vec<GenerationEvent>,
    only: Option<Vec<GenerationEventKind>>,
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect only events whose kind is in `kinds`.
    pub fn filtered(kinds: impl IntoIterator<Item = GenerationEventKind>) -> Self {
        Self {
            events: Vec::new(),
            only: Some(kinds.into_iter().collect()),
        }
    }

    pub fn into_inner(self) -> Vec<GenerationEvent> {
        self.events
    }

    pub fn as_slice(&self) -> &[GenerationEvent] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl EventSink for VecSink {
    #[inline]
    fn send(&mut self, event: GenerationEvent) {
        if self.wants(event.kind()) {
            self.events.push(event);
        }
    }

    fn wants(&self, kind: GenerationEventKind) -> bool {
        self.only.as_ref().is_none_or(|only| only.contains(&kind))
    }
}
