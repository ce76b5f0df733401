// ============================================================================
// loopcast-core/src/processing/orchestrator.rs
// ============================================================================
//
// RENDER ORCHESTRATOR: Top-Level Sequencing of a Render Run
//
// Turns a validated JobConfig into encoder invocations. Single jobs render
// one unit; batch jobs discover one unit per subfolder and render them
// strictly one after another. Each successful output gets its tracklist.
//
// KEY COMPONENTS:
// - RenderOrchestrator: owns the run state, duration cache and progress
// - RunState: Idle -> Running -> Succeeded | Failed
// - RunSummary: what was attempted, rendered, failed and skipped
//
// ERROR POLICY:
// Batch runs log a unit's encoder failure (or stall) and continue with the
// next folder. Every other error, and any failure in a single job, ends the
// run. Exactly one Finished event is emitted per run.

use std::collections::HashSet;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use log::{error, info, warn};

use super::aggregator::ProgressAggregator;
use super::driver::ProcessDriver;
use super::durations::DurationCache;
use super::tracklist::{build_entries, write_tracklist};
use crate::cancellation::CancellationToken;
use crate::config::{
    BatchJobConfig, JobConfig, MissingVideoPolicy, RenderOptions, RunSettings, SingleJobConfig,
};
use crate::discovery::{FolderOutcome, discover_batch};
use crate::error::{CoreError, CoreResult};
use crate::events::EventDispatcher;
use crate::external::{
    AudioMapping, DurationProbe, EncoderSpawner, RenderParams, build_render_args,
};
use crate::media::{MediaAsset, OutputTarget, RenderUnit, VIDEO_OUTPUT_EXTENSION};
use crate::progress::ProgressRange;
use crate::utils::{file_stem_lossy, sanitize_file_name};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
    Succeeded,
    Failed,
}

/// Outcome of a finished run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Units handed to the encoder.
    pub attempted: usize,
    pub succeeded: usize,
    /// Names of units whose encode failed.
    pub failed: Vec<String>,
    /// Names of folders that were not rendered.
    pub skipped: Vec<String>,
    /// Every media file written.
    pub outputs: Vec<PathBuf>,
    /// Line reported in the terminal event.
    pub message: String,
}

/// A batch folder after the missing-video policy was applied.
enum PlannedFolder {
    Render(RenderUnit),
    Skip(String),
}

pub struct RenderOrchestrator<S: EncoderSpawner, P: DurationProbe> {
    config: JobConfig,
    spawner: S,
    probe: P,
    settings: RunSettings,
    cancel: CancellationToken,
    durations: DurationCache,
    progress: ProgressAggregator,
    state: RunState,
}

impl<S: EncoderSpawner, P: DurationProbe> RenderOrchestrator<S, P> {
    pub fn new(
        config: JobConfig,
        spawner: S,
        probe: P,
        settings: RunSettings,
        events: EventDispatcher,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            config,
            spawner,
            probe,
            settings,
            cancel,
            durations: DurationCache::new(),
            progress: ProgressAggregator::new(events),
            state: RunState::Idle,
        }
    }

    #[must_use]
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Executes the job and emits the terminal event.
    ///
    /// An orchestrator runs once; calling `run` again returns an error
    /// without emitting anything.
    pub fn run(&mut self) -> CoreResult<RunSummary> {
        if self.state != RunState::Idle {
            return Err(CoreError::Unexpected(
                "render orchestrator has already run".to_string(),
            ));
        }
        self.state = RunState::Running;

        let config = self.config.clone();
        let result = match &config {
            JobConfig::Single(single) => self.run_single(single),
            JobConfig::Batch(batch) => self.run_batch(batch),
        };

        match &result {
            Ok(summary) => {
                info!("{}", summary.message);
                self.state = RunState::Succeeded;
                self.progress.finished(true, summary.message.clone());
            }
            Err(e) => {
                error!("Render failed: {e}");
                self.state = RunState::Failed;
                self.progress.finished(false, e.to_string());
            }
        }
        result
    }

    fn run_single(&mut self, config: &SingleJobConfig) -> CoreResult<RunSummary> {
        let unit = single_unit(config)?;
        self.progress.status(format!(
            "Rendering {} track(s) to {}",
            unit.audio.len(),
            config.output.display()
        ));

        let outputs = self.render_unit(&unit, &config.options)?;
        Ok(RunSummary {
            attempted: 1,
            succeeded: 1,
            outputs,
            message: format!("Render complete: {}", config.output.display()),
            ..RunSummary::default()
        })
    }

    fn run_batch(&mut self, config: &BatchJobConfig) -> CoreResult<RunSummary> {
        let separate = config.options.separate_files;
        self.progress
            .status(format!("Scanning {}", config.batch_root.display()));
        let report = discover_batch(&config.batch_root, &config.output_root, separate)?;

        let without_video = report.folders_without_video();
        if separate && !without_video.is_empty() {
            let names: Vec<&str> = without_video.iter().map(|f| f.name.as_str()).collect();
            return Err(CoreError::ConfigValidation(format!(
                "separate track output requires a video in every folder; missing in: {}",
                names.join(", ")
            )));
        }

        let plan: Vec<(String, PlannedFolder)> = report
            .folders()
            .iter()
            .map(|folder| {
                let planned = match &folder.outcome {
                    FolderOutcome::Ready(unit) => PlannedFolder::Render(unit.clone()),
                    FolderOutcome::NoVideo(_) => match config.missing_video {
                        MissingVideoPolicy::AudioOnly => folder
                            .audio_only_unit(&config.output_root)
                            .map_or_else(
                                || PlannedFolder::Skip("no video".to_string()),
                                PlannedFolder::Render,
                            ),
                        MissingVideoPolicy::Skip => PlannedFolder::Skip("no video".to_string()),
                    },
                    FolderOutcome::NoAudio => PlannedFolder::Skip("no audio".to_string()),
                };
                (folder.name.clone(), planned)
            })
            .collect();

        if !plan
            .iter()
            .any(|(_, planned)| matches!(planned, PlannedFolder::Render(_)))
        {
            return Err(CoreError::DiscoveryEmpty(format!(
                "no folder in {} has renderable media",
                config.batch_root.display()
            )));
        }

        let total = report.total();
        let mut summary = RunSummary::default();

        for (index, (name, planned)) in plan.into_iter().enumerate() {
            if self.cancel.is_cancelled() {
                return Err(CoreError::Cancelled);
            }
            self.progress.start_folder(index, total);

            let unit = match planned {
                PlannedFolder::Render(unit) => unit,
                PlannedFolder::Skip(reason) => {
                    warn!("Skipping folder {name}: {reason}");
                    self.progress
                        .status(format!("Skipping {name} ({reason})"));
                    summary.skipped.push(name);
                    continue;
                }
            };

            self.progress.status(format!(
                "Processing folder {}/{total}: {name}",
                index + 1
            ));
            summary.attempted += 1;
            match self.render_unit(&unit, &config.options) {
                Ok(outputs) => {
                    summary.succeeded += 1;
                    summary.outputs.extend(outputs);
                }
                Err(e) if e.is_process_failure() => {
                    error!("Folder {name} failed: {e}");
                    self.progress.status(format!("Failed {name}: {e}"));
                    summary.failed.push(name);
                }
                Err(e) => return Err(e),
            }
        }

        self.progress.finish_batch();
        summary.message = format!(
            "Batch processing complete: processed {}/{total} folders",
            summary.succeeded
        );
        Ok(summary)
    }

    /// Renders one unit and writes its tracklist(s). Returns the media files written.
    fn render_unit(
        &mut self,
        unit: &RenderUnit,
        options: &RenderOptions,
    ) -> CoreResult<Vec<PathBuf>> {
        self.progress.start_unit();

        let outputs = match &unit.target {
            OutputTarget::File(output) => {
                self.render_combined(unit, output, options)?;
                vec![output.clone()]
            }
            OutputTarget::Folder(folder) => self.render_separate(unit, folder, options)?,
        };

        self.progress.finish_unit();
        Ok(outputs)
    }

    fn render_combined(
        &mut self,
        unit: &RenderUnit,
        output: &Path,
        options: &RenderOptions,
    ) -> CoreResult<()> {
        let expanded = unit.expanded_audio(options.repeat_count);
        let audio: Vec<&Path> = expanded.iter().map(|asset| asset.path()).collect();
        let total = self.durations.total(&self.probe, audio.iter().copied());

        let args = build_render_args(&RenderParams {
            video: unit.video.as_ref().map(MediaAsset::path),
            audio: &audio,
            mapping: AudioMapping::Concat,
            encoder: &options.encoder,
            output,
        });

        ensure_parent_dir(output)?;
        self.drive(&args, total, ProgressRange::FULL)?;

        let entries = build_entries(&unit.audio, |path| self.durations.get(&self.probe, path));
        write_tracklist(output, &entries)?;
        Ok(())
    }

    fn render_separate(
        &mut self,
        unit: &RenderUnit,
        folder: &Path,
        options: &RenderOptions,
    ) -> CoreResult<Vec<PathBuf>> {
        let video = unit.video.as_ref().ok_or_else(|| {
            CoreError::ConfigValidation(format!(
                "separate track output for {} requires a background video",
                unit.name
            ))
        })?;

        let count = unit.audio.len();
        let mut used_names = HashSet::new();
        let mut outputs = Vec::with_capacity(count);

        for (index, track) in unit.audio.iter().enumerate() {
            if self.cancel.is_cancelled() {
                return Err(CoreError::Cancelled);
            }
            self.progress.status(format!(
                "Rendering track {}/{count}: {}",
                index + 1,
                track.display_name()
            ));

            let name = unique_name(track_output_name(track.path(), index), &mut used_names);
            let output = folder.join(format!("{name}.{VIDEO_OUTPUT_EXTENSION}"));
            let audio = [track.path()];
            let args = build_render_args(&RenderParams {
                video: Some(video.path()),
                audio: &audio,
                mapping: AudioMapping::Direct,
                encoder: &options.encoder,
                output: &output,
            });
            let total = self.durations.get(&self.probe, track.path());

            fs::create_dir_all(folder)?;
            let range = ProgressAggregator::track_range(true, index, count);
            self.drive(&args, total, range)?;
            // Tracks of unknown duration report nothing while encoding.
            self.progress.report_job(range.map(100.0));

            let entries = build_entries(std::slice::from_ref(track), |path| {
                self.durations.get(&self.probe, path)
            });
            write_tracklist(&output, &entries)?;
            outputs.push(output);
        }

        Ok(outputs)
    }

    fn drive(
        &mut self,
        args: &[OsString],
        total: Option<f64>,
        range: ProgressRange,
    ) -> CoreResult<()> {
        let driver = ProcessDriver::new(
            &self.spawner,
            &self.cancel,
            self.settings.poll_interval,
            self.settings.stall_timeout,
        );
        driver.drive(args, total, range, &mut self.progress)
    }
}

/// Builds the single render unit of a single job.
fn single_unit(config: &SingleJobConfig) -> CoreResult<RenderUnit> {
    let video = config
        .video
        .as_ref()
        .map(|path| {
            MediaAsset::classify(path.clone()).ok_or_else(|| {
                CoreError::ConfigValidation(format!(
                    "{} is not a supported video file",
                    path.display()
                ))
            })
        })
        .transpose()?;

    let audio = config
        .audio
        .iter()
        .map(|path| {
            MediaAsset::classify(path.clone()).ok_or_else(|| {
                CoreError::ConfigValidation(format!(
                    "{} is not a supported audio file",
                    path.display()
                ))
            })
        })
        .collect::<CoreResult<Vec<_>>>()?;

    let target = if config.options.separate_files {
        OutputTarget::Folder(config.output.clone())
    } else {
        OutputTarget::File(config.output.clone())
    };

    Ok(RenderUnit {
        name: file_stem_lossy(&config.output),
        video,
        audio,
        target,
    })
}

/// Output stem for track `index`: the sanitized source stem, or
/// `track_<n>` when nothing usable is left.
fn track_output_name(track: &Path, index: usize) -> String {
    let name = sanitize_file_name(&file_stem_lossy(track));
    if name.is_empty() {
        format!("track_{}", index + 1)
    } else {
        name
    }
}

fn unique_name(name: String, used: &mut HashSet<String>) -> String {
    let mut candidate = name.clone();
    let mut n = 2;
    while !used.insert(candidate.to_lowercase()) {
        candidate = format!("{name} ({n})");
        n += 1;
    }
    candidate
}

fn ensure_parent_dir(path: &Path) -> CoreResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}
