// ============================================================================
// loopcast-cli/src/progress.rs
// ============================================================================
//
// PROGRESS DISPLAY: Terminal Rendering of Render Events
//
// Turns the core's RenderEvents into indicatif bars. A job bar tracks the
// unit being encoded; batch runs add a second bar for the whole batch.
// Status messages are printed above the bars through MultiProgress so they do
// not tear the bars apart. The MultiProgress is shared with the logger, which
// hides the bars while it writes.

use std::time::Duration;

use console::style;
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};

use loopcast_core::RenderEvent;

const JOB_TEMPLATE: &str = "{prefix:>6} [{bar:40.cyan/blue}] {pos:>3}% {msg}";
const BATCH_TEMPLATE: &str = "{prefix:>6} [{bar:40.green/white}] {pos:>3}%";
const PROGRESS_CHARS: &str = "=> ";

/// Terminal result of a run, as reported by the final event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalStatus {
    pub success: bool,
    pub message: String,
}

pub struct ProgressDisplay {
    multi: MultiProgress,
    job: ProgressBar,
    batch: Option<ProgressBar>,
}

impl ProgressDisplay {
    /// Adds the bars to `multi`. `batch` adds the batch bar.
    pub fn new(multi: &MultiProgress, batch: bool) -> Self {
        Self::attach(multi.clone(), batch)
    }

    /// Creates a display that draws nothing.
    pub fn hidden(batch: bool) -> Self {
        let multi = MultiProgress::with_draw_target(ProgressDrawTarget::hidden());
        Self::attach(multi, batch)
    }

    fn attach(multi: MultiProgress, batch: bool) -> Self {
        let batch = batch.then(|| {
            let bar = multi.add(ProgressBar::new(100));
            bar.set_style(bar_style(BATCH_TEMPLATE));
            bar.set_prefix("Batch");
            bar
        });
        let job = multi.add(ProgressBar::new(100));
        job.set_style(bar_style(JOB_TEMPLATE));
        job.set_prefix("Job");
        job.enable_steady_tick(Duration::from_millis(120));
        Self { multi, job, batch }
    }

    #[must_use]
    pub fn job_position(&self) -> u64 {
        self.job.position()
    }

    #[must_use]
    pub fn batch_position(&self) -> Option<u64> {
        self.batch.as_ref().map(ProgressBar::position)
    }

    /// Applies one event. Returns the final status for the terminal event.
    pub fn handle(&self, event: &RenderEvent) -> Option<FinalStatus> {
        match event {
            RenderEvent::Status { message } => {
                self.job.set_message(message.clone());
                let _ = self
                    .multi
                    .println(format!("  {}{}", style("› ").magenta(), message));
                None
            }
            RenderEvent::JobProgress { percent } => {
                self.job.set_position(to_position(*percent));
                None
            }
            RenderEvent::BatchProgress { percent } => {
                if let Some(bar) = &self.batch {
                    bar.set_position(to_position(*percent));
                }
                None
            }
            RenderEvent::Finished { success, message } => {
                self.finish();
                Some(FinalStatus {
                    success: *success,
                    message: message.clone(),
                })
            }
        }
    }

    /// Removes the bars from the terminal.
    pub fn finish(&self) {
        self.job.finish_and_clear();
        self.multi.remove(&self.job);
        if let Some(bar) = &self.batch {
            bar.finish_and_clear();
            self.multi.remove(bar);
        }
    }
}

fn bar_style(template: &str) -> ProgressStyle {
    ProgressStyle::default_bar()
        .template(template)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars(PROGRESS_CHARS)
}

fn to_position(percent: u8) -> u64 {
    u64::from(percent.min(100))
}

/// Prints the run result in the terminal's summary style.
pub fn print_final(status: &FinalStatus) {
    println!("\n{}", style("RESULT").bold().cyan());
    if status.success {
        println!("  {}", style(&status.message).green().bold());
    } else {
        println!("  {}", style(&status.message).red().bold());
    }
}
