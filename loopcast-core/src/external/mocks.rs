// loopcast-core/src/external/mocks.rs

// --- Mocking Infrastructure (for testing) ---

use std::collections::{HashMap, VecDeque};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use ffmpeg_sidecar::event::{FfmpegEvent, FfmpegProgress, LogLevel};

use super::{DurationProbe, EncoderProcess, EncoderSpawner, NextEvent, ProcessExit};
use crate::error::{CoreError, CoreResult};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A progress event at ffmpeg time `time` (`HH:MM:SS.ss`).
pub fn progress_event(time: &str) -> FfmpegEvent {
    FfmpegEvent::Progress(FfmpegProgress {
        frame: 0,
        fps: 0.0,
        q: 0.0,
        size_kb: 0,
        time: time.to_string(),
        bitrate_kbps: 192.0,
        speed: 1.0,
        raw_log_message: format!("size=       0kB time={time} bitrate= 192.0kbits/s speed=1x"),
    })
}

/// A log line at the given level.
pub fn log_event(level: LogLevel, line: &str) -> FfmpegEvent {
    FfmpegEvent::Log(level, line.to_string())
}

/// Mock implementation of EncoderProcess replaying scripted events.
#[derive(Debug)]
pub struct MockEncoderProcess {
    events: VecDeque<FfmpegEvent>,
    exit_code: Option<i32>,
    stall: bool,
    killed: Arc<AtomicBool>,
}

impl MockEncoderProcess {
    /// A process emitting `events` and exiting with `exit_code`.
    pub fn new(events: Vec<FfmpegEvent>, exit_code: i32) -> Self {
        Self {
            events: events.into(),
            exit_code: Some(exit_code),
            stall: false,
            killed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// A process emitting `events` and then hanging until killed.
    pub fn stalling(events: Vec<FfmpegEvent>) -> Self {
        Self {
            events: events.into(),
            exit_code: None,
            stall: true,
            killed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Flag set once the process has been killed.
    pub fn killed_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.killed)
    }
}

impl EncoderProcess for MockEncoderProcess {
    fn next_event(&mut self, wait: Duration) -> NextEvent {
        if self.killed.load(Ordering::SeqCst) {
            return NextEvent::Closed;
        }
        if let Some(event) = self.events.pop_front() {
            return NextEvent::Event(event);
        }
        if self.stall {
            std::thread::sleep(wait.min(Duration::from_millis(5)));
            NextEvent::Pending
        } else {
            NextEvent::Closed
        }
    }

    fn kill(&mut self) -> CoreResult<()> {
        self.killed.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn wait(&mut self) -> CoreResult<ProcessExit> {
        if self.killed.load(Ordering::SeqCst) {
            return Ok(ProcessExit { code: None });
        }
        Ok(ProcessExit {
            code: self.exit_code,
        })
    }
}

/// Represents an expected encoder call and its mock result.
#[derive(Debug)]
pub struct MockEncoderExpectation {
    pub arg_pattern: String,
    pub result: CoreResult<MockEncoderProcess>,
    pub create_dummy_output: bool,
}

/// Mock implementation of EncoderSpawner supporting multiple expectations.
///
/// Each spawn consumes the first expectation whose pattern is contained in
/// any argument. Clones share state, so a clone kept by the test can inspect
/// the calls made through the one handed to the orchestrator.
#[derive(Debug, Clone, Default)]
pub struct MockEncoderSpawner {
    expectations: Arc<Mutex<Vec<MockEncoderExpectation>>>,
    received_calls: Arc<Mutex<Vec<Vec<OsString>>>>,
}

impl MockEncoderSpawner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_expectation(
        &self,
        arg_pattern: &str,
        result: CoreResult<MockEncoderProcess>,
        create_dummy_output: bool,
    ) {
        lock(&self.expectations).push(MockEncoderExpectation {
            arg_pattern: arg_pattern.to_string(),
            result,
            create_dummy_output,
        });
    }

    pub fn add_success_expectation(&self, arg_pattern: &str, events: Vec<FfmpegEvent>) {
        self.add_expectation(arg_pattern, Ok(MockEncoderProcess::new(events, 0)), true);
    }

    pub fn add_exit_error_expectation(
        &self,
        arg_pattern: &str,
        events: Vec<FfmpegEvent>,
        exit_code: i32,
    ) {
        self.add_expectation(
            arg_pattern,
            Ok(MockEncoderProcess::new(events, exit_code)),
            false,
        );
    }

    pub fn add_spawn_error_expectation(&self, arg_pattern: &str, error: CoreError) {
        self.add_expectation(arg_pattern, Err(error), false);
    }

    pub fn get_received_calls(&self) -> Vec<Vec<OsString>> {
        lock(&self.received_calls).clone()
    }
}

impl EncoderSpawner for MockEncoderSpawner {
    type Process = MockEncoderProcess;

    fn spawn(&self, args: &[OsString]) -> CoreResult<Self::Process> {
        lock(&self.received_calls).push(args.to_vec());

        let expectation = {
            let mut expectations = lock(&self.expectations);
            let found = expectations.iter().position(|exp| {
                args.iter()
                    .any(|arg| arg.to_string_lossy().contains(&exp.arg_pattern))
            });
            found.map(|index| expectations.remove(index))
        };

        let Some(expectation) = expectation else {
            log::error!("MockEncoderSpawner: No expectation found for args: {args:?}");
            return Err(CoreError::Unexpected(format!(
                "MockEncoderSpawner: no expectation for {args:?}"
            )));
        };
        log::info!(
            "MockEncoderSpawner: Matched expectation with pattern '{}'",
            expectation.arg_pattern
        );

        if expectation.create_dummy_output && expectation.result.is_ok() {
            if let Some(output) = args.last() {
                let output = PathBuf::from(output);
                if let Some(parent) = output.parent() {
                    let _ = std::fs::create_dir_all(parent);
                }
                if let Err(e) = std::fs::write(&output, b"") {
                    log::warn!("MockEncoderSpawner could not create {}: {e}", output.display());
                }
            }
        }

        expectation.result
    }

    fn program(&self) -> &Path {
        Path::new("ffmpeg")
    }
}

/// Mock implementation of DurationProbe backed by a path map.
///
/// Paths without an entry report an unknown duration.
#[derive(Debug, Clone, Default)]
pub struct MockDurationProbe {
    durations: Arc<Mutex<HashMap<PathBuf, Option<f64>>>>,
    calls: Arc<AtomicUsize>,
}

impl MockDurationProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expect_duration(&self, path: &Path, duration: Option<f64>) {
        lock(&self.durations).insert(path.to_path_buf(), duration);
    }

    /// Number of duration lookups performed so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl DurationProbe for MockDurationProbe {
    fn probe_duration(&self, path: &Path) -> Option<f64> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        lock(&self.durations).get(path).copied().flatten()
    }
}
