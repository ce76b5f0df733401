//! Render processing logic and orchestration.
//!
//! This module organizes the steps of a render run into submodules and
//! exposes the orchestrator that sequences them.

/// Progress weighting across tracks, units and folders
pub mod aggregator;

/// Encoder process supervision and progress parsing
pub mod driver;

/// Per-run duration cache
pub mod durations;

/// Top-level run sequencing
pub mod orchestrator;

/// Tracklist sidecar generation
pub mod tracklist;

pub use aggregator::ProgressAggregator;
pub use driver::{ProcessDriver, relative_progress};
pub use durations::DurationCache;
pub use orchestrator::{RenderOrchestrator, RunState, RunSummary};
pub use tracklist::{TrackEntry, build_entries, format_tracklist, sidecar_path, write_tracklist};
