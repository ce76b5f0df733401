//! Progress weighting across units, tracks and folders.
//!
//! Single combined renders drive the whole job bar. Separate renders split it
//! into one equal chunk per track. Batch runs move the batch bar to
//! `floor(i / total * 100)` when folder `i` starts and to 100 once every
//! folder was attempted. The job bar restarts at 0 for every unit.

use crate::events::{EventDispatcher, RenderEvent};
use crate::progress::{ProgressRange, ProgressState, batch_percent_at};

/// Owns the run's progress counters and the dispatcher they are reported through.
pub struct ProgressAggregator {
    state: ProgressState,
    events: EventDispatcher,
}

impl ProgressAggregator {
    #[must_use]
    pub fn new(events: EventDispatcher) -> Self {
        Self {
            state: ProgressState::new(),
            events,
        }
    }

    /// Job-bar slice driven by track `index` of `count`.
    #[must_use]
    pub fn track_range(separate_files: bool, index: usize, count: usize) -> ProgressRange {
        if separate_files {
            ProgressRange::chunk(index, count)
        } else {
            ProgressRange::FULL
        }
    }

    #[must_use]
    pub fn state(&self) -> &ProgressState {
        &self.state
    }

    pub fn status(&self, message: impl Into<String>) {
        self.events.emit(RenderEvent::status(message));
    }

    pub fn finished(&self, success: bool, message: impl Into<String>) {
        self.events.emit(RenderEvent::Finished {
            success,
            message: message.into(),
        });
    }

    /// Resets the job bar for a new unit.
    pub fn start_unit(&mut self) {
        let percent = self.state.reset_job();
        self.events.emit(RenderEvent::JobProgress { percent });
    }

    /// Reports an absolute job-bar value; stale or repeated values are dropped.
    pub fn report_job(&mut self, percent: f64) {
        if let Some(percent) = self.state.update_job(percent) {
            self.events.emit(RenderEvent::JobProgress { percent });
        }
    }

    /// Forces the job bar to 100 after a unit succeeded.
    pub fn finish_unit(&mut self) {
        self.report_job(100.0);
    }

    /// Moves the batch bar to the start of folder `index` of `total`.
    pub fn start_folder(&mut self, index: usize, total: usize) {
        self.report_batch(batch_percent_at(index, total));
    }

    /// Forces the batch bar to 100 after every folder was attempted.
    pub fn finish_batch(&mut self) {
        self.report_batch(100.0);
    }

    fn report_batch(&mut self, percent: f64) {
        if let Some(percent) = self.state.update_batch(percent) {
            self.events.emit(RenderEvent::BatchProgress { percent });
        }
    }
}
