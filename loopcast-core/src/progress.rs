// ============================================================================
// loopcast-core/src/progress.rs
// ============================================================================
//
// PROGRESS STATE: Bounded, Monotonic Progress Counters
//
// A run reports two percentages: the current unit (job) and the whole batch.
// Both only ever move forward within their scope and repeated values are not
// reported twice. Drivers work in a unit-relative sub-range, which
// ProgressRange maps onto the job bar.
//
// KEY COMPONENTS:
// - ProgressRange: offset/scale sub-range of the job bar
// - ProgressState: the two counters and their emission rules
// - batch_percent_at: batch bar value at the start of a folder

/// A slice of the job bar, `[offset, offset + scale]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressRange {
    pub offset: f64,
    pub scale: f64,
}

impl ProgressRange {
    /// The whole bar.
    pub const FULL: Self = Self {
        offset: 0.0,
        scale: 100.0,
    };

    /// The `index`-th of `count` equal chunks.
    #[must_use]
    pub fn chunk(index: usize, count: usize) -> Self {
        if count == 0 {
            return Self::FULL;
        }
        let size = 100.0 / count as f64;
        Self {
            offset: index as f64 * size,
            scale: size,
        }
    }

    /// Maps a driver-relative percentage (clamped to 0..=100) into this range.
    #[must_use]
    pub fn map(&self, relative: f64) -> f64 {
        self.offset + relative.clamp(0.0, 100.0) * self.scale / 100.0
    }
}

/// Batch bar value at the start of folder `index` of `total`: `floor(index / total * 100)`.
#[must_use]
pub fn batch_percent_at(index: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    ((index as f64 / total as f64) * 100.0).floor()
}

/// The job and batch counters of one run.
///
/// Values are whole percentages: inputs are clamped to 0..=100 and floored,
/// and a value is reported only when its floor moves forward.
#[derive(Debug, Clone, Default)]
pub struct ProgressState {
    job: Option<u8>,
    batch: Option<u8>,
}

impl ProgressState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn job(&self) -> u8 {
        self.job.unwrap_or(0)
    }

    #[must_use]
    pub fn batch(&self) -> u8 {
        self.batch.unwrap_or(0)
    }

    /// Starts a new job scope at 0. Always returns the value to report.
    pub fn reset_job(&mut self) -> u8 {
        self.job = Some(0);
        0
    }

    /// Records a job value, returning it when it should be reported.
    pub fn update_job(&mut self, percent: f64) -> Option<u8> {
        advance(&mut self.job, percent)
    }

    /// Records a batch value, returning it when it should be reported.
    pub fn update_batch(&mut self, percent: f64) -> Option<u8> {
        advance(&mut self.batch, percent)
    }
}

fn whole_percent(percent: f64) -> Option<u8> {
    if percent.is_nan() {
        return None;
    }
    Some(percent.clamp(0.0, 100.0).floor() as u8)
}

fn advance(slot: &mut Option<u8>, percent: f64) -> Option<u8> {
    let percent = whole_percent(percent)?;
    match *slot {
        Some(current) if percent <= current => None,
        _ => {
            *slot = Some(percent);
            Some(percent)
        }
    }
}
