// ============================================================================
// loopcast-core/src/processing/driver.rs
// ============================================================================
//
// PROCESS DRIVER: Running One Encode and Translating Its Progress
//
// Spawns the encoder, reads its parsed events and turns progress reports
// into job-bar progress inside a caller-supplied range. Log lines are kept
// as the error tail. Between events the driver checks the cancellation token
// and the optional stall timeout; either one kills the child.
//
// KEY COMPONENTS:
// - ProcessDriver: spawner plus supervision settings
// - relative_progress: percentage of one ffmpeg timestamp against a total duration

use std::collections::VecDeque;
use std::ffi::OsString;
use std::time::{Duration, Instant};

use ffmpeg_sidecar::event::FfmpegEvent;
use log::{debug, error, warn};

use super::aggregator::ProgressAggregator;
use crate::cancellation::CancellationToken;
use crate::error::{CoreError, CoreResult, command_failed_error};
use crate::external::{EncoderProcess, EncoderSpawner, NextEvent, format_command_line};
use crate::progress::ProgressRange;
use crate::utils::{display_name, parse_ffmpeg_time};

/// Number of log lines kept for error reports.
const OUTPUT_TAIL_LINES: usize = 20;

/// Percentage (0 to 100) of `total_secs` reached at ffmpeg time `time`.
///
/// Returns `None` for unparsable or negative times (`N/A`, `-00:00:00.02`)
/// and whenever the total is unknown or not positive.
#[must_use]
pub fn relative_progress(time: &str, total_secs: Option<f64>) -> Option<f64> {
    let total = total_secs.filter(|t| t.is_finite() && *t > 0.0)?;
    let elapsed = parse_ffmpeg_time(time).filter(|secs| secs.is_finite() && *secs >= 0.0)?;
    Some((elapsed / total * 100.0).clamp(0.0, 100.0))
}

pub struct ProcessDriver<'a, S: EncoderSpawner> {
    spawner: &'a S,
    cancel: &'a CancellationToken,
    poll_interval: Duration,
    stall_timeout: Option<Duration>,
}

impl<'a, S: EncoderSpawner> ProcessDriver<'a, S> {
    pub fn new(
        spawner: &'a S,
        cancel: &'a CancellationToken,
        poll_interval: Duration,
        stall_timeout: Option<Duration>,
    ) -> Self {
        Self {
            spawner,
            cancel,
            poll_interval,
            stall_timeout,
        }
    }

    fn tool_name(&self) -> String {
        display_name(self.spawner.program())
    }

    /// Runs one encode to completion.
    ///
    /// # Errors
    ///
    /// * `CoreError::Cancelled` when the token is set while the encoder runs
    /// * `CoreError::Timeout` when the encoder stays silent past the stall timeout
    /// * `CoreError::ProcessFailed` on any non-zero exit
    /// * `CoreError::CommandStart` when the encoder cannot be started
    pub fn drive(
        &self,
        args: &[OsString],
        total_secs: Option<f64>,
        range: ProgressRange,
        progress: &mut ProgressAggregator,
    ) -> CoreResult<()> {
        if self.cancel.is_cancelled() {
            return Err(CoreError::Cancelled);
        }

        debug!(
            "Running: {}",
            format_command_line(self.spawner.program(), args)
        );
        if total_secs.is_none() {
            debug!("Total duration unknown; progress will not be reported for this encode");
        }

        let mut process = self.spawner.spawn(args)?;
        let mut tail: VecDeque<String> = VecDeque::with_capacity(OUTPUT_TAIL_LINES);
        let mut last_output = Instant::now();

        loop {
            if self.cancel.is_cancelled() {
                debug!("Cancellation requested, stopping {}", self.tool_name());
                stop(&mut process);
                return Err(CoreError::Cancelled);
            }

            match process.next_event(self.poll_interval) {
                NextEvent::Event(event) => {
                    last_output = Instant::now();
                    match event {
                        FfmpegEvent::Progress(p) => {
                            if let Some(relative) = relative_progress(&p.time, total_secs) {
                                progress.report_job(range.map(relative));
                            }
                        }
                        FfmpegEvent::Log(_, line) | FfmpegEvent::Error(line) => {
                            if tail.len() == OUTPUT_TAIL_LINES {
                                tail.pop_front();
                            }
                            tail.push_back(line);
                        }
                        _ => {}
                    }
                }
                NextEvent::Pending => {
                    if let Some(limit) = self.stall_timeout {
                        if last_output.elapsed() >= limit {
                            warn!(
                                "{} produced no output for {}s, stopping it",
                                self.tool_name(),
                                limit.as_secs()
                            );
                            stop(&mut process);
                            return Err(CoreError::Timeout {
                                tool: self.tool_name(),
                                seconds: limit.as_secs(),
                            });
                        }
                    }
                }
                NextEvent::Closed => break,
            }
        }

        let exit = process.wait()?;
        if exit.success() {
            return Ok(());
        }

        let output = Vec::from(tail).join("\n");
        error!(
            "{} failed with exit code {:?}:\n{output}",
            self.tool_name(),
            exit.code
        );
        Err(command_failed_error(self.tool_name(), exit.code, output))
    }
}

fn stop<P: EncoderProcess>(process: &mut P) {
    if let Err(e) = process.kill() {
        warn!("Failed to kill encoder: {e}");
    }
    if let Err(e) = process.wait() {
        debug!("Waiting for killed encoder failed: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{EventDispatcher, EventHandler, RenderEvent};
    use crate::external::mocks::{
        MockEncoderProcess, MockEncoderSpawner, log_event, progress_event,
    };
    use ffmpeg_sidecar::event::LogLevel;
    use std::sync::atomic::Ordering;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct Recorder(Mutex<Vec<RenderEvent>>);

    impl EventHandler for Recorder {
        fn handle(&self, event: &RenderEvent) {
            self.0.lock().unwrap().push(event.clone());
        }
    }

    fn aggregator() -> (ProgressAggregator, Arc<Recorder>) {
        let recorder = Arc::new(Recorder::default());
        let mut events = EventDispatcher::new();
        events.add_handler(recorder.clone());
        (ProgressAggregator::new(events), recorder)
    }

    fn job_values(recorder: &Recorder) -> Vec<u8> {
        recorder
            .0
            .lock()
            .unwrap()
            .iter()
            .filter_map(|e| match e {
                RenderEvent::JobProgress { percent } => Some(*percent),
                _ => None,
            })
            .collect()
    }

    fn args() -> Vec<OsString> {
        vec![OsString::from("-y"), OsString::from("out.mp4")]
    }

    #[test]
    fn test_relative_progress() {
        assert_eq!(relative_progress("00:00:30.00", Some(120.0)), Some(25.0));
        assert_eq!(relative_progress("00:00:30.00", Some(10.0)), Some(100.0));
        assert_eq!(relative_progress("00:00:30.00", None), None);
        assert_eq!(relative_progress("00:00:30.00", Some(0.0)), None);
        assert_eq!(relative_progress("N/A", Some(10.0)), None);
        assert_eq!(relative_progress("-00:00:00.02", Some(10.0)), None);
    }

    #[test]
    fn test_progress_is_mapped_into_range() {
        let spawner = MockEncoderSpawner::new();
        spawner.add_success_expectation(
            "out.mp4",
            vec![
                log_event(LogLevel::Info, "Input #0, mp3, from 'a.mp3':"),
                progress_event("00:00:10.00"),
                progress_event("00:00:05.00"),
                progress_event("N/A"),
                progress_event("00:00:20.00"),
            ],
        );
        let cancel = CancellationToken::new();
        let driver = ProcessDriver::new(&spawner, &cancel, Duration::from_millis(1), None);
        let (mut agg, recorder) = aggregator();
        agg.start_unit();

        driver
            .drive(&args(), Some(20.0), ProgressRange::chunk(1, 2), &mut agg)
            .unwrap();

        assert_eq!(job_values(&recorder), [0, 75, 100]);
    }

    #[test]
    fn test_unknown_total_reports_nothing() {
        let spawner = MockEncoderSpawner::new();
        spawner.add_success_expectation("out.mp4", vec![progress_event("00:00:10.00")]);
        let cancel = CancellationToken::new();
        let driver = ProcessDriver::new(&spawner, &cancel, Duration::from_millis(1), None);
        let (mut agg, recorder) = aggregator();

        driver
            .drive(&args(), None, ProgressRange::FULL, &mut agg)
            .unwrap();
        assert!(job_values(&recorder).is_empty());
    }

    #[test]
    fn test_non_zero_exit_carries_code_and_log_tail() {
        let spawner = MockEncoderSpawner::new();
        spawner.add_exit_error_expectation(
            "out.mp4",
            vec![
                progress_event("00:00:01.00"),
                log_event(LogLevel::Error, "Unknown encoder 'h264_nvenc'"),
                FfmpegEvent::Error("Conversion failed!".to_string()),
            ],
            1,
        );
        let cancel = CancellationToken::new();
        let driver = ProcessDriver::new(&spawner, &cancel, Duration::from_millis(1), None);
        let (mut agg, _) = aggregator();

        let err = driver
            .drive(&args(), Some(10.0), ProgressRange::FULL, &mut agg)
            .unwrap_err();
        match err {
            CoreError::ProcessFailed { code, output, .. } => {
                assert_eq!(code, Some(1));
                assert_eq!(output, "Unknown encoder 'h264_nvenc'\nConversion failed!");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_tail_keeps_only_last_log_lines() {
        let spawner = MockEncoderSpawner::new();
        let events = (0..OUTPUT_TAIL_LINES + 5)
            .map(|i| log_event(LogLevel::Warning, &format!("line {i}")))
            .collect();
        spawner.add_exit_error_expectation("out.mp4", events, 187);
        let cancel = CancellationToken::new();
        let driver = ProcessDriver::new(&spawner, &cancel, Duration::from_millis(1), None);
        let (mut agg, _) = aggregator();

        let err = driver
            .drive(&args(), None, ProgressRange::FULL, &mut agg)
            .unwrap_err();
        let CoreError::ProcessFailed { output, .. } = err else {
            panic!("unexpected error: {err:?}");
        };
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), OUTPUT_TAIL_LINES);
        assert_eq!(lines[0], "line 5");
        assert_eq!(lines[OUTPUT_TAIL_LINES - 1], format!("line {}", OUTPUT_TAIL_LINES + 4));
    }

    #[test]
    fn test_spawn_error_is_returned_unchanged() {
        let spawner = MockEncoderSpawner::new();
        spawner.add_spawn_error_expectation(
            "out.mp4",
            crate::error::command_start_error(
                "ffmpeg",
                std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
            ),
        );
        let cancel = CancellationToken::new();
        let driver = ProcessDriver::new(&spawner, &cancel, Duration::from_millis(1), None);
        let (mut agg, recorder) = aggregator();

        let err = driver
            .drive(&args(), Some(10.0), ProgressRange::FULL, &mut agg)
            .unwrap_err();
        assert!(matches!(err, CoreError::CommandStart(_, _)));
        assert!(!err.is_process_failure());
        assert!(job_values(&recorder).is_empty());
    }

    #[test]
    fn test_stall_timeout_kills_process() {
        let spawner = MockEncoderSpawner::new();
        let process = MockEncoderProcess::stalling(vec![progress_event("00:00:01.00")]);
        let killed = process.killed_flag();
        spawner.add_expectation("out.mp4", Ok(process), false);
        let cancel = CancellationToken::new();
        let driver = ProcessDriver::new(
            &spawner,
            &cancel,
            Duration::from_millis(1),
            Some(Duration::from_millis(30)),
        );
        let (mut agg, _) = aggregator();

        let err = driver
            .drive(&args(), Some(10.0), ProgressRange::FULL, &mut agg)
            .unwrap_err();
        assert!(matches!(err, CoreError::Timeout { .. }));
        assert!(err.is_process_failure());
        assert!(killed.load(Ordering::SeqCst));
    }

    #[test]
    fn test_cancel_before_spawn() {
        let spawner = MockEncoderSpawner::new();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let driver = ProcessDriver::new(&spawner, &cancel, Duration::from_millis(1), None);
        let (mut agg, _) = aggregator();

        let err = driver
            .drive(&args(), None, ProgressRange::FULL, &mut agg)
            .unwrap_err();
        assert!(matches!(err, CoreError::Cancelled));
        assert!(spawner.get_received_calls().is_empty());
    }

    #[test]
    fn test_cancel_while_running_kills_process() {
        let spawner = MockEncoderSpawner::new();
        let process = MockEncoderProcess::stalling(Vec::new());
        let killed = process.killed_flag();
        spawner.add_expectation("out.mp4", Ok(process), false);
        let cancel = CancellationToken::new();
        let driver = ProcessDriver::new(&spawner, &cancel, Duration::from_millis(1), None);
        let (mut agg, _) = aggregator();

        let canceller = cancel.clone();
        let timer = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            canceller.cancel();
        });
        let err = driver
            .drive(&args(), None, ProgressRange::FULL, &mut agg)
            .unwrap_err();
        timer.join().unwrap();

        assert!(matches!(err, CoreError::Cancelled));
        assert!(killed.load(Ordering::SeqCst));
    }
}
