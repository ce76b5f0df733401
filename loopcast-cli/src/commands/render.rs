//! Implementation of the `render` subcommand: one playlist, one output.

use anyhow::Result;
use indicatif::MultiProgress;
use log::info;

use loopcast_core::{CoreResult, JobConfig, JobConfigBuilder, RunSettings, RunSummary};

use crate::cli::RenderArgs;

/// Builds and validates the single-job configuration for `args`.
pub fn build_config(args: RenderArgs) -> CoreResult<JobConfig> {
    JobConfigBuilder::new()
        .video_opt(args.video)
        .audio(args.audio)
        .output(args.output)
        .encoder_token(&args.options.encoder)
        .separate_files(args.options.separate)
        .repeat_count(args.options.repeat)
        .build()
}

pub fn run_render(
    args: RenderArgs,
    settings: RunSettings,
    multi: &MultiProgress,
) -> Result<RunSummary> {
    let track_count = args.audio.len();
    let config = build_config(args)?;
    info!(
        "Rendering {track_count} track(s) with {}",
        config.options().encoder
    );
    super::execute(config, settings, multi)
}
