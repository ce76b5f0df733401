// ============================================================================
// loopcast-core/src/external/ffmpeg_executor.rs
// ============================================================================
//
// FFMPEG EXECUTOR: FFmpeg Process Management and Abstraction
//
// This module provides abstractions for spawning and interacting with FFmpeg
// processes. The driver only needs three things from a running encoder: the
// next parsed event (with a bounded wait), a way to kill it, and its exit code.
//
// KEY COMPONENTS:
// - EncoderProcess: Trait representing an active encoder process
// - EncoderSpawner: Trait for creating new encoder processes
// - SidecarSpawner / SidecarProcess: Implementation using ffmpeg-sidecar
//
// ARCHITECTURE:
// ffmpeg-sidecar parses the encoder's stderr into `FfmpegEvent`s. Its iterator
// blocks, so one forwarding thread drains it into a channel and the consumer
// polls that channel with a timeout to stay responsive to cancellation.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use ffmpeg_sidecar::child::FfmpegChild;
use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::FfmpegEvent;
use log::{debug, warn};

use super::apply_no_window;
use crate::config::DEFAULT_FFMPEG_BINARY;
use crate::error::{CoreError, CoreResult, command_start_error};

/// Outcome of waiting for the next encoder event.
#[derive(Debug, Clone, PartialEq)]
pub enum NextEvent {
    Event(FfmpegEvent),
    /// Nothing arrived within the wait.
    Pending,
    /// The encoder's output is exhausted.
    Closed,
}

/// Exit information of a finished encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessExit {
    /// `None` when the process was terminated by a signal.
    pub code: Option<i32>,
}

impl ProcessExit {
    #[must_use]
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Trait representing an active encoder process instance.
pub trait EncoderProcess {
    /// Waits up to `wait` for the next parsed event.
    fn next_event(&mut self, wait: Duration) -> NextEvent;

    /// Terminates the process. Killing an already finished process is not an error.
    fn kill(&mut self) -> CoreResult<()>;

    /// Waits for the process to exit.
    fn wait(&mut self) -> CoreResult<ProcessExit>;
}

/// Trait representing something that can spawn an EncoderProcess.
pub trait EncoderSpawner {
    type Process: EncoderProcess;

    /// Starts the encoder with the given arguments (program name excluded).
    fn spawn(&self, args: &[OsString]) -> CoreResult<Self::Process>;

    /// Program name used in logs and errors.
    fn program(&self) -> &Path;
}

// --- Concrete Implementation using ffmpeg-sidecar ---

/// Wrapper around `ffmpeg_sidecar::child::FfmpegChild` implementing `EncoderProcess`.
pub struct SidecarProcess {
    child: FfmpegChild,
    events: Receiver<FfmpegEvent>,
    forwarder: Option<JoinHandle<()>>,
}

impl SidecarProcess {
    /// Starts forwarding the events of a freshly spawned child.
    ///
    /// On failure the child is killed and reaped before the error is returned.
    fn attach(mut child: FfmpegChild) -> CoreResult<Self> {
        match forward_events(&mut child) {
            Ok((events, forwarder)) => Ok(Self {
                child,
                events,
                forwarder: Some(forwarder),
            }),
            Err(e) => {
                warn!("Could not read ffmpeg output, stopping it: {e}");
                if let Err(kill_err) = child.kill() {
                    debug!("ffmpeg kill returned: {kill_err}");
                }
                if let Err(wait_err) = child.wait() {
                    debug!("Waiting for stopped ffmpeg failed: {wait_err}");
                }
                Err(e)
            }
        }
    }
}

impl EncoderProcess for SidecarProcess {
    fn next_event(&mut self, wait: Duration) -> NextEvent {
        match self.events.recv_timeout(wait) {
            Ok(event) => NextEvent::Event(event),
            Err(RecvTimeoutError::Timeout) => NextEvent::Pending,
            Err(RecvTimeoutError::Disconnected) => NextEvent::Closed,
        }
    }

    fn kill(&mut self) -> CoreResult<()> {
        if let Err(e) = self.child.kill() {
            // Already exited; the subsequent wait reports the real status.
            debug!("ffmpeg kill returned: {e}");
        }
        Ok(())
    }

    fn wait(&mut self) -> CoreResult<ProcessExit> {
        let status = self.child.wait()?;
        if let Some(forwarder) = self.forwarder.take() {
            if forwarder.join().is_err() {
                warn!("ffmpeg event forwarding thread panicked");
            }
        }
        Ok(ProcessExit {
            code: status.code(),
        })
    }
}

/// Moves the child's event iterator onto a named thread feeding a channel.
fn forward_events(
    child: &mut FfmpegChild,
) -> CoreResult<(Receiver<FfmpegEvent>, JoinHandle<()>)> {
    let iter = child
        .iter()
        .map_err(|e| CoreError::Unexpected(format!("Failed to get ffmpeg event iterator: {e}")))?;
    let (tx, rx) = mpsc::channel();
    let forwarder = thread::Builder::new()
        .name("ffmpeg-events".to_string())
        .spawn(move || {
            for event in iter {
                if tx.send(event).is_err() {
                    break;
                }
            }
        })?;
    Ok((rx, forwarder))
}

/// Concrete implementation of `EncoderSpawner` using `ffmpeg-sidecar`.
#[derive(Debug, Clone)]
pub struct SidecarSpawner {
    ffmpeg_path: PathBuf,
}

impl Default for SidecarSpawner {
    fn default() -> Self {
        Self::new(PathBuf::from(DEFAULT_FFMPEG_BINARY))
    }
}

impl SidecarSpawner {
    #[must_use]
    pub fn new(ffmpeg_path: PathBuf) -> Self {
        Self { ffmpeg_path }
    }
}

impl EncoderSpawner for SidecarSpawner {
    type Process = SidecarProcess;

    fn spawn(&self, args: &[OsString]) -> CoreResult<Self::Process> {
        let mut cmd = FfmpegCommand::new_with_path(&self.ffmpeg_path);
        cmd.args(args);
        apply_no_window(cmd.as_inner_mut());

        let child = cmd
            .spawn()
            .map_err(|e| command_start_error(self.ffmpeg_path.display().to_string(), e))?;
        SidecarProcess::attach(child)
    }

    fn program(&self) -> &Path {
        &self.ffmpeg_path
    }
}
