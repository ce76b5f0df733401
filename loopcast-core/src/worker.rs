// ============================================================================
// loopcast-core/src/worker.rs
// ============================================================================
//
// RENDER WORKER: Running a Render off the Caller's Thread
//
// A front end must stay responsive while ffmpeg runs, so the orchestrator is
// moved onto one background thread. The caller keeps a RenderHandle to cancel
// or join the run and receives progress through its event handlers. A panic
// inside the run is caught and reported as a failed terminal event instead of
// taking the host down.
//
// KEY COMPONENTS:
// - RenderWorker: spawns the background thread
// - RenderHandle: cancellation and join

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::thread::{self, JoinHandle};

use log::error;

use crate::cancellation::CancellationToken;
use crate::config::{JobConfig, RunSettings};
use crate::error::{CoreError, CoreResult};
use crate::events::{EventDispatcher, RenderEvent};
use crate::external::{DurationProbe, EncoderSpawner, FfprobeCli, SidecarSpawner};
use crate::processing::{RenderOrchestrator, RunSummary};

const WORKER_THREAD_NAME: &str = "loopcast-render";

pub struct RenderWorker;

impl RenderWorker {
    /// Starts `config` with the ffmpeg and ffprobe binaries named in `settings`.
    pub fn spawn(
        config: JobConfig,
        settings: RunSettings,
        events: EventDispatcher,
    ) -> CoreResult<RenderHandle> {
        let spawner = SidecarSpawner::new(settings.ffmpeg_path.clone());
        let probe = FfprobeCli::new(settings.ffprobe_path.clone());
        Self::spawn_with(config, spawner, probe, settings, events)
    }

    /// Starts `config` with caller-supplied tool implementations.
    pub fn spawn_with<S, P>(
        config: JobConfig,
        spawner: S,
        probe: P,
        settings: RunSettings,
        events: EventDispatcher,
    ) -> CoreResult<RenderHandle>
    where
        S: EncoderSpawner + Send + 'static,
        P: DurationProbe + Send + 'static,
    {
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let thread = thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(move || {
                let fallback = events.clone();
                let outcome = panic::catch_unwind(AssertUnwindSafe(move || {
                    RenderOrchestrator::new(config, spawner, probe, settings, events, token).run()
                }));
                match outcome {
                    Ok(result) => result,
                    Err(payload) => {
                        let message = format!("render worker panicked: {}", panic_message(&*payload));
                        error!("{message}");
                        fallback.emit(RenderEvent::Finished {
                            success: false,
                            message: message.clone(),
                        });
                        Err(CoreError::Unexpected(message))
                    }
                }
            })?;

        Ok(RenderHandle { cancel, thread })
    }
}

/// Control handle of a running render.
pub struct RenderHandle {
    cancel: CancellationToken,
    thread: JoinHandle<CoreResult<RunSummary>>,
}

impl RenderHandle {
    /// Requests cancellation. The encoder is killed at the next poll.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Waits for the run and returns its outcome.
    pub fn join(self) -> CoreResult<RunSummary> {
        self.thread
            .join()
            .map_err(|payload| CoreError::Unexpected(panic_message(&*payload)))?
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
