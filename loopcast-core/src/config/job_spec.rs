//! Serializable job description.
//!
//! `JobSpec` mirrors the loosely-typed settings record a front end collects
//! (every field optional, strings for the encoder). It is read from JSON job
//! files and only becomes a usable [`JobConfig`] through the builder.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{DEFAULT_REPEAT_COUNT, JobConfig, JobConfigBuilder, JobMode, MissingVideoPolicy};
use crate::encoder::SOFTWARE_CODEC;
use crate::error::CoreResult;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JobSpec {
    pub mode: JobMode,
    pub encoder: String,
    pub separate_files: bool,
    pub repeat_count: u32,
    pub video: Option<PathBuf>,
    pub audio: Vec<PathBuf>,
    pub output: Option<PathBuf>,
    pub batch_root: Option<PathBuf>,
    pub output_root: Option<PathBuf>,
    pub missing_video: MissingVideoPolicy,
}

impl Default for JobSpec {
    fn default() -> Self {
        Self {
            mode: JobMode::Single,
            encoder: SOFTWARE_CODEC.to_string(),
            separate_files: false,
            repeat_count: DEFAULT_REPEAT_COUNT,
            video: None,
            audio: Vec::new(),
            output: None,
            batch_root: None,
            output_root: None,
            missing_video: MissingVideoPolicy::default(),
        }
    }
}

impl JobSpec {
    /// Parses a job description from JSON text.
    pub fn from_json_str(json: &str) -> CoreResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a JSON job file.
    pub fn from_file(path: &Path) -> CoreResult<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Validates the description through [`JobConfigBuilder`].
    ///
    /// Fields that do not belong to the selected mode are ignored.
    pub fn into_config(self) -> CoreResult<JobConfig> {
        let mut builder = JobConfigBuilder::new()
            .mode(self.mode)
            .encoder_token(&self.encoder)
            .separate_files(self.separate_files)
            .repeat_count(self.repeat_count)
            .missing_video(self.missing_video)
            .video_opt(self.video)
            .audio(self.audio);
        if let Some(output) = self.output {
            builder = builder.output(output);
        }
        if let Some(root) = self.batch_root {
            builder = builder.batch_root(root);
        }
        if let Some(root) = self.output_root {
            builder = builder.output_root(root);
        }
        builder.build()
    }
}
