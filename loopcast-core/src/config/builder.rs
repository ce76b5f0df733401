// ============================================================================
// loopcast-core/src/config/builder.rs
// ============================================================================
//
// CONFIGURATION BUILDER: Builder Pattern for JobConfig
//
// This module implements the builder pattern for the JobConfig enum. The
// builder collects loosely-typed settings through a fluent API and turns them
// into a validated, mode-tagged configuration in `build()`. Every rule that
// must hold before an encoder is spawned is checked here.
//
// KEY COMPONENTS:
// - JobConfigBuilder: Builder struct for creating JobConfig values
// - Mode-specific validation for Single and Batch jobs

// ---- Standard library imports ----
use std::path::{Path, PathBuf};

// ---- Internal crate imports ----
use super::{
    BatchJobConfig, DEFAULT_REPEAT_COUNT, JobConfig, JobMode, MissingVideoPolicy, RenderOptions,
    SingleJobConfig,
};
use crate::encoder::EncoderFamily;
use crate::error::{CoreError, CoreResult};
use crate::media::{AUDIO_EXTENSIONS, AUDIO_ONLY_OUTPUT_EXTENSIONS, VIDEO_EXTENSIONS};
use crate::processing::tracklist::TRACKLIST_EXTENSION;
use crate::utils::{display_name, has_extension};

/// Builder for creating JobConfig values.
///
/// The mode defaults to [`JobMode::Single`]. Setting a batch root switches the
/// builder to [`JobMode::Batch`] unless a mode was chosen explicitly.
///
/// # Examples
///
/// ```rust,no_run
/// use loopcast_core::config::{JobConfigBuilder, MissingVideoPolicy};
/// use std::path::PathBuf;
///
/// let config = JobConfigBuilder::new()
///     .batch_root(PathBuf::from("/projects"))
///     .output_root(PathBuf::from("/renders"))
///     .missing_video(MissingVideoPolicy::Skip)
///     .separate_files(false)
///     .build();
/// ```
#[derive(Debug, Clone, Default)]
pub struct JobConfigBuilder {
    mode: Option<JobMode>,

    // Single mode
    video: Option<PathBuf>,
    audio: Vec<PathBuf>,
    output: Option<PathBuf>,

    // Batch mode
    batch_root: Option<PathBuf>,
    output_root: Option<PathBuf>,
    missing_video: MissingVideoPolicy,

    // Shared
    encoder: EncoderFamily,
    separate_files: bool,
    repeat_count: Option<u32>,
}

impl JobConfigBuilder {
    /// Creates a new JobConfigBuilder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Forces the render mode instead of inferring it from the batch root.
    #[must_use]
    pub fn mode(mut self, mode: JobMode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Sets the background video that is looped under the playlist.
    #[must_use]
    pub fn video(mut self, video: PathBuf) -> Self {
        self.video = Some(video);
        self
    }

    /// Sets or clears the background video.
    #[must_use]
    pub fn video_opt(mut self, video: Option<PathBuf>) -> Self {
        self.video = video;
        self
    }

    /// Replaces the playlist. Order is preserved.
    #[must_use]
    pub fn audio(mut self, audio: Vec<PathBuf>) -> Self {
        self.audio = audio;
        self
    }

    /// Appends one track to the playlist.
    #[must_use]
    pub fn add_audio(mut self, audio: PathBuf) -> Self {
        self.audio.push(audio);
        self
    }

    /// Output file (combined) or output folder (separate) for a single job.
    #[must_use]
    pub fn output(mut self, output: PathBuf) -> Self {
        self.output = Some(output);
        self
    }

    #[must_use]
    pub fn batch_root(mut self, batch_root: PathBuf) -> Self {
        self.batch_root = Some(batch_root);
        self
    }

    #[must_use]
    pub fn output_root(mut self, output_root: PathBuf) -> Self {
        self.output_root = Some(output_root);
        self
    }

    #[must_use]
    pub fn missing_video(mut self, policy: MissingVideoPolicy) -> Self {
        self.missing_video = policy;
        self
    }

    #[must_use]
    pub fn encoder(mut self, encoder: EncoderFamily) -> Self {
        self.encoder = encoder;
        self
    }

    /// Sets the encoder from an opaque token such as "h264_nvenc".
    #[must_use]
    pub fn encoder_token(mut self, token: &str) -> Self {
        self.encoder = EncoderFamily::from_token(token);
        self
    }

    #[must_use]
    pub fn separate_files(mut self, separate: bool) -> Self {
        self.separate_files = separate;
        self
    }

    /// Sets how many times the playlist is repeated in combined mode.
    /// Zero is rejected by `build()`.
    #[must_use]
    pub fn repeat_count(mut self, count: u32) -> Self {
        self.repeat_count = Some(count);
        self
    }

    /// Validates the collected settings and builds a JobConfig.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::ConfigValidation` describing the first rule the
    /// settings break.
    pub fn build(self) -> CoreResult<JobConfig> {
        let repeat_count = self.repeat_count.unwrap_or(DEFAULT_REPEAT_COUNT);
        if repeat_count == 0 {
            return Err(invalid("repeat count must be at least 1"));
        }

        let options = RenderOptions {
            encoder: self.encoder,
            separate_files: self.separate_files,
            repeat_count,
        };

        let mode = self.mode.unwrap_or(if self.batch_root.is_some() {
            JobMode::Batch
        } else {
            JobMode::Single
        });

        match mode {
            JobMode::Single => {
                let output = self
                    .output
                    .ok_or_else(|| invalid("an output path is required"))?;
                validate_single(self.video.as_deref(), &self.audio, &output, &options)?;
                Ok(JobConfig::Single(SingleJobConfig {
                    video: self.video,
                    audio: self.audio,
                    output,
                    options,
                }))
            }
            JobMode::Batch => {
                let batch_root = self
                    .batch_root
                    .ok_or_else(|| invalid("a batch root folder is required"))?;
                if !batch_root.is_dir() {
                    return Err(invalid(format!(
                        "batch root {} is not an existing directory",
                        batch_root.display()
                    )));
                }
                let output_root = self
                    .output_root
                    .ok_or_else(|| invalid("an output folder is required"))?;
                Ok(JobConfig::Batch(BatchJobConfig {
                    batch_root,
                    output_root,
                    missing_video: self.missing_video,
                    options,
                }))
            }
        }
    }
}

fn validate_single(
    video: Option<&Path>,
    audio: &[PathBuf],
    output: &Path,
    options: &RenderOptions,
) -> CoreResult<()> {
    if audio.is_empty() {
        return Err(invalid("at least one audio file is required"));
    }

    for path in audio {
        if !has_extension(path, AUDIO_EXTENSIONS) {
            return Err(invalid(format!(
                "{} is not a supported audio file",
                display_name(path)
            )));
        }
        if !path.is_file() {
            return Err(invalid(format!("audio file {} not found", path.display())));
        }
    }

    // The tracklist is written next to the output with this extension.
    if !options.separate_files && has_extension(output, &[TRACKLIST_EXTENSION]) {
        return Err(invalid(format!(
            "output {} would be overwritten by its .{TRACKLIST_EXTENSION} track list",
            display_name(output)
        )));
    }

    match video {
        Some(video) => {
            if !has_extension(video, VIDEO_EXTENSIONS) {
                return Err(invalid(format!(
                    "{} is not a supported video file",
                    display_name(video)
                )));
            }
            if !video.is_file() {
                return Err(invalid(format!("video file {} not found", video.display())));
            }
        }
        None if options.separate_files => {
            return Err(invalid(
                "separate track output requires a background video",
            ));
        }
        None => {
            if !has_extension(output, AUDIO_ONLY_OUTPUT_EXTENSIONS) {
                return Err(invalid(format!(
                    "audio-only output {} must use one of: {}",
                    display_name(output),
                    AUDIO_ONLY_OUTPUT_EXTENSIONS.join(", ")
                )));
            }
        }
    }

    Ok(())
}

fn invalid(message: impl Into<String>) -> CoreError {
    CoreError::ConfigValidation(message.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, b"").unwrap();
        path
    }

    fn assert_invalid(result: CoreResult<JobConfig>, needle: &str) {
        match result {
            Err(CoreError::ConfigValidation(msg)) => {
                assert!(msg.contains(needle), "unexpected message: {msg}");
            }
            other => panic!("expected ConfigValidation, got {other:?}"),
        }
    }

    #[test]
    fn test_single_combined_builds() {
        let tmp = tempfile::tempdir().unwrap();
        let video = touch(tmp.path(), "loop.mp4");
        let a = touch(tmp.path(), "a.mp3");
        let b = touch(tmp.path(), "b.wav");

        let config = JobConfigBuilder::new()
            .video(video.clone())
            .audio(vec![a.clone(), b.clone()])
            .output(tmp.path().join("out.mp4"))
            .encoder_token("h264_amf")
            .repeat_count(3)
            .build()
            .unwrap();

        match config {
            JobConfig::Single(single) => {
                assert_eq!(single.video, Some(video));
                assert_eq!(single.audio, vec![a, b]);
                assert_eq!(single.options.repeat_count, 3);
                assert_eq!(
                    single.options.encoder,
                    EncoderFamily::Amf {
                        codec: "h264_amf".to_string()
                    }
                );
            }
            JobConfig::Batch(_) => panic!("expected single job"),
        }
    }

    #[test]
    fn test_single_rejections() {
        let tmp = tempfile::tempdir().unwrap();
        let a = touch(tmp.path(), "a.mp3");
        let video = touch(tmp.path(), "loop.mov");

        assert_invalid(
            JobConfigBuilder::new()
                .output(tmp.path().join("out.mp4"))
                .build(),
            "at least one audio file",
        );

        assert_invalid(
            JobConfigBuilder::new()
                .video(video.clone())
                .add_audio(a.clone())
                .output(tmp.path().join("out.mp4"))
                .repeat_count(0)
                .build(),
            "repeat count",
        );

        assert_invalid(
            JobConfigBuilder::new()
                .add_audio(a.clone())
                .output(tmp.path().join("tracks"))
                .separate_files(true)
                .build(),
            "requires a background video",
        );

        assert_invalid(
            JobConfigBuilder::new()
                .add_audio(a.clone())
                .output(tmp.path().join("out.mp3"))
                .build(),
            "audio-only output",
        );

        assert_invalid(
            JobConfigBuilder::new()
                .video(video.clone())
                .add_audio(tmp.path().join("missing.mp3"))
                .output(tmp.path().join("out.mp4"))
                .build(),
            "not found",
        );

        assert_invalid(
            JobConfigBuilder::new()
                .video(video)
                .add_audio(touch(tmp.path(), "notes.txt"))
                .output(tmp.path().join("out.mp4"))
                .build(),
            "not a supported audio file",
        );

        assert_invalid(
            JobConfigBuilder::new().add_audio(a).build(),
            "output path is required",
        );
    }

    #[test]
    fn test_combined_output_cannot_share_tracklist_path() {
        let tmp = tempfile::tempdir().unwrap();
        let a = touch(tmp.path(), "a.mp3");
        let video = touch(tmp.path(), "loop.mp4");

        for name in ["mix.txt", "mix.TXT"] {
            assert_invalid(
                JobConfigBuilder::new()
                    .video(video.clone())
                    .add_audio(a.clone())
                    .output(tmp.path().join(name))
                    .build(),
                "track list",
            );
        }

        // A separate-mode output folder named like a text file is fine.
        let config = JobConfigBuilder::new()
            .video(video)
            .add_audio(a)
            .output(tmp.path().join("tracks.txt"))
            .separate_files(true)
            .build()
            .unwrap();
        assert_eq!(config.mode(), JobMode::Single);
    }

    #[test]
    fn test_audio_only_combined_accepts_m4a() {
        let tmp = tempfile::tempdir().unwrap();
        let a = touch(tmp.path(), "a.flac");
        let config = JobConfigBuilder::new()
            .add_audio(a)
            .output(tmp.path().join("mix.M4A"))
            .build()
            .unwrap();
        assert_eq!(config.mode(), JobMode::Single);
    }

    #[test]
    fn test_batch_mode_inferred_and_validated() {
        let tmp = tempfile::tempdir().unwrap();
        let config = JobConfigBuilder::new()
            .batch_root(tmp.path().to_path_buf())
            .output_root(tmp.path().join("out"))
            .missing_video(MissingVideoPolicy::Skip)
            .build()
            .unwrap();
        match config {
            JobConfig::Batch(batch) => {
                assert_eq!(batch.missing_video, MissingVideoPolicy::Skip);
                assert_eq!(batch.options.repeat_count, 1);
            }
            JobConfig::Single(_) => panic!("expected batch job"),
        }

        assert_invalid(
            JobConfigBuilder::new()
                .batch_root(tmp.path().join("nope"))
                .output_root(tmp.path().join("out"))
                .build(),
            "not an existing directory",
        );

        assert_invalid(
            JobConfigBuilder::new().mode(JobMode::Batch).build(),
            "batch root",
        );
    }
}
