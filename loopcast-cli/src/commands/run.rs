//! Implementation of the `run` subcommand: a job read from a JSON file.

use anyhow::{Context, Result};
use indicatif::MultiProgress;
use log::info;

use loopcast_core::{JobSpec, RunSettings, RunSummary};

use crate::cli::RunArgs;

pub fn run_job(
    args: RunArgs,
    settings: RunSettings,
    multi: &MultiProgress,
) -> Result<RunSummary> {
    let spec = JobSpec::from_file(&args.job)
        .with_context(|| format!("Failed to read job file '{}'", args.job.display()))?;
    info!("Loaded job file {} ({:?} mode)", args.job.display(), spec.mode);
    let config = spec.into_config()?;
    super::execute(config, settings, multi)
}
