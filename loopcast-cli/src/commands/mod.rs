//! Command implementations for the CLI.
//!
//! Each subcommand only turns its arguments into a [`JobConfig`]; running the
//! job and showing its progress is shared by [`execute`].

pub mod batch;
pub mod render;
pub mod run;

use std::sync::{Arc, mpsc};

use anyhow::Result;
use indicatif::MultiProgress;
use log::{debug, info};

use loopcast_core::events::ChannelEventHandler;
use loopcast_core::{EventDispatcher, JobConfig, JobMode, RenderWorker, RunSettings, RunSummary};

use crate::progress::{FinalStatus, ProgressDisplay, print_final};

/// Runs `config` on a background worker while drawing its progress into `multi`.
///
/// Returns an error when the run did not succeed; the message is the one of
/// the terminal event.
pub fn execute(
    config: JobConfig,
    settings: RunSettings,
    multi: &MultiProgress,
) -> Result<RunSummary> {
    info!("Output: {}", config.output_location().display());
    debug!("Tool settings: {settings:?}");

    let display = ProgressDisplay::new(multi, config.mode() == JobMode::Batch);
    let (tx, rx) = mpsc::channel();
    let mut events = EventDispatcher::new();
    events.add_handler(Arc::new(ChannelEventHandler::new(tx)));

    let handle = RenderWorker::spawn(config, settings, events)?;

    // The channel closes when the worker drops its dispatcher.
    let mut final_status: Option<FinalStatus> = None;
    for event in rx {
        if let Some(status) = display.handle(&event) {
            final_status = Some(status);
        }
    }
    display.finish();

    let result = handle.join();
    if let Some(status) = &final_status {
        print_final(status);
    }

    Ok(result?)
}
