//! Implementation of the `batch` subcommand: one render per subfolder.

use anyhow::Result;
use indicatif::MultiProgress;
use log::info;

use loopcast_core::{
    CoreResult, JobConfig, JobConfigBuilder, MissingVideoPolicy, RunSettings, RunSummary,
};

use crate::cli::BatchArgs;

/// Builds and validates the batch configuration for `args`.
pub fn build_config(args: BatchArgs) -> CoreResult<JobConfig> {
    let policy = if args.skip_missing_video {
        MissingVideoPolicy::Skip
    } else {
        MissingVideoPolicy::AudioOnly
    };

    JobConfigBuilder::new()
        .batch_root(args.root)
        .output_root(args.output)
        .missing_video(policy)
        .encoder_token(&args.options.encoder)
        .separate_files(args.options.separate)
        .repeat_count(args.options.repeat)
        .build()
}

pub fn run_batch(
    args: BatchArgs,
    settings: RunSettings,
    multi: &MultiProgress,
) -> Result<RunSummary> {
    info!("Scanning {}", args.root.display());
    let config = build_config(args)?;
    let summary = super::execute(config, settings, multi)?;

    for name in &summary.skipped {
        info!("Skipped: {name}");
    }
    for name in &summary.failed {
        info!("Failed: {name}");
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::EncodeOptions;
    use loopcast_core::CoreError;

    fn args(root: std::path::PathBuf, skip: bool) -> BatchArgs {
        BatchArgs {
            root,
            output: "renders".into(),
            skip_missing_video: skip,
            options: EncodeOptions {
                encoder: "libx264".to_string(),
                separate: false,
                repeat: 1,
            },
        }
    }

    #[test]
    fn test_missing_video_policy_from_flag() {
        let dir = tempfile::tempdir().unwrap();

        for (skip, expected) in [
            (false, MissingVideoPolicy::AudioOnly),
            (true, MissingVideoPolicy::Skip),
        ] {
            match build_config(args(dir.path().to_path_buf(), skip)).unwrap() {
                JobConfig::Batch(batch) => assert_eq!(batch.missing_video, expected),
                other => panic!("expected batch job, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_missing_root_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = build_config(args(dir.path().join("absent"), false)).unwrap_err();
        assert!(matches!(err, CoreError::ConfigValidation(_)));
    }
}
