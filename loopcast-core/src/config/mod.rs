//! Configuration structures and constants for the loopcast-core library.
//!
//! A render job is described by a closed, mode-tagged [`JobConfig`]. Values
//! of that type only come out of [`JobConfigBuilder::build`], which is the
//! single place where job settings are validated, so an orchestrator never
//! sees an inconsistent configuration.

mod builder;
mod job_spec;
mod settings;
pub mod utils;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::encoder::EncoderFamily;

pub use builder::JobConfigBuilder;
pub use job_spec::JobSpec;
pub use settings::{
    DEFAULT_FFMPEG_BINARY, DEFAULT_FFPROBE_BINARY, DEFAULT_POLL_INTERVAL, ENV_FFMPEG,
    ENV_FFPROBE, ENV_STALL_TIMEOUT_SECS, RunSettings,
};

/// Default number of times the playlist is played back to back in combined mode.
pub const DEFAULT_REPEAT_COUNT: u32 = 1;

/// Which of the two render modes a job runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobMode {
    #[default]
    Single,
    Batch,
}

/// What a combined-mode batch run does with a folder that has audio but no video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingVideoPolicy {
    /// Render the folder's playlist without a video stream as `<folder>.m4a`.
    #[default]
    AudioOnly,
    /// Log the folder and move on. Skipped folders do not count as successes.
    Skip,
}

/// Options shared by both modes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    pub encoder: EncoderFamily,

    /// Render one output per audio track instead of one concatenated output.
    pub separate_files: bool,

    /// Number of times the audio sequence is repeated in combined mode.
    /// Always at least 1. Ignored when `separate_files` is set.
    pub repeat_count: u32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            encoder: EncoderFamily::default(),
            separate_files: false,
            repeat_count: DEFAULT_REPEAT_COUNT,
        }
    }
}

/// A single project: one optional video looped under an ordered playlist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingleJobConfig {
    pub video: Option<PathBuf>,

    /// Audio files in the order the user chose. Never empty.
    pub audio: Vec<PathBuf>,

    /// Output file in combined mode, output folder in separate mode.
    pub output: PathBuf,

    pub options: RenderOptions,
}

/// A root folder whose immediate subfolders are each rendered as one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchJobConfig {
    pub batch_root: PathBuf,
    pub output_root: PathBuf,
    pub missing_video: MissingVideoPolicy,
    pub options: RenderOptions,
}

/// A validated render job.
///
/// # Examples
///
/// ```rust,no_run
/// use loopcast_core::config::{JobConfig, JobConfigBuilder};
/// use std::path::PathBuf;
///
/// let config = JobConfigBuilder::new()
///     .video(PathBuf::from("/media/loop.mp4"))
///     .add_audio(PathBuf::from("/media/01 Intro.mp3"))
///     .add_audio(PathBuf::from("/media/02 Theme.mp3"))
///     .output(PathBuf::from("/renders/mix.mp4"))
///     .encoder_token("h264_nvenc")
///     .repeat_count(2)
///     .build()
///     .expect("valid job");
/// assert!(matches!(config, JobConfig::Single(_)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobConfig {
    Single(SingleJobConfig),
    Batch(BatchJobConfig),
}

impl JobConfig {
    #[must_use]
    pub fn mode(&self) -> JobMode {
        match self {
            Self::Single(_) => JobMode::Single,
            Self::Batch(_) => JobMode::Batch,
        }
    }

    #[must_use]
    pub fn options(&self) -> &RenderOptions {
        match self {
            Self::Single(single) => &single.options,
            Self::Batch(batch) => &batch.options,
        }
    }

    /// The file or folder results are written to.
    #[must_use]
    pub fn output_location(&self) -> &Path {
        match self {
            Self::Single(single) => &single.output,
            Self::Batch(batch) => &batch.output_root,
        }
    }
}
