//! Core library for rendering a looping background video under an audio
//! playlist with ffmpeg.
//!
//! This crate provides batch discovery of project folders, ffmpeg command
//! construction, encoder process supervision with progress translation,
//! progress aggregation across multi-stage jobs and tracklist generation.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use loopcast_core::{EventDispatcher, JobConfigBuilder, RenderWorker, RunSettings};
//! use loopcast_core::events::ChannelEventHandler;
//! use std::path::PathBuf;
//! use std::sync::{Arc, mpsc};
//!
//! let config = JobConfigBuilder::new()
//!     .video(PathBuf::from("/media/loop.mp4"))
//!     .add_audio(PathBuf::from("/media/01 Intro.mp3"))
//!     .output(PathBuf::from("/renders/mix.mp4"))
//!     .build()
//!     .unwrap();
//!
//! let (tx, rx) = mpsc::channel();
//! let mut events = EventDispatcher::new();
//! events.add_handler(Arc::new(ChannelEventHandler::new(tx)));
//!
//! let handle = RenderWorker::spawn(config, RunSettings::from_env(), events).unwrap();
//! for event in rx {
//!     println!("{event:?}");
//! }
//! let summary = handle.join().unwrap();
//! println!("{}", summary.message);
//! ```

pub mod cancellation;
pub mod config;
pub mod discovery;
pub mod encoder;
pub mod error;
pub mod events;
pub mod external;
pub mod media;
pub mod processing;
pub mod progress;
pub mod utils;
pub mod worker;

// Re-exports for public API
pub use cancellation::CancellationToken;
pub use config::{
    BatchJobConfig, JobConfig, JobConfigBuilder, JobMode, JobSpec, MissingVideoPolicy,
    RenderOptions, RunSettings, SingleJobConfig,
};
pub use discovery::{DiscoveryReport, FolderOutcome, discover_batch};
pub use encoder::EncoderFamily;
pub use error::{CoreError, CoreResult};
pub use events::{EventDispatcher, EventHandler, RenderEvent};
pub use media::{MediaAsset, MediaKind, OutputTarget, RenderUnit};
pub use processing::{RenderOrchestrator, RunState, RunSummary};
pub use utils::{format_duration, format_track_timestamp, parse_ffmpeg_time};
pub use worker::{RenderHandle, RenderWorker};
