// ============================================================================
// loopcast-core/src/error.rs
// ============================================================================
//
// ERROR HANDLING: Custom Error Types for loopcast-core
//
// This module defines the error taxonomy of the render engine. Each variant
// maps to one failure class of a run so the orchestrator can apply the
// mode-specific continue/abort rule without inspecting error strings.
//
// KEY COMPONENTS:
// - CoreError: Enum of all errors produced by the library
// - CoreResult: Result alias used throughout the crate
// - Helper constructors for external command failures

use std::io;

use thiserror::Error;

/// Errors produced by the loopcast-core library.
#[derive(Error, Debug)]
pub enum CoreError {
    /// The job configuration was rejected before any process was spawned.
    #[error("Invalid configuration: {0}")]
    ConfigValidation(String),

    /// Batch discovery found nothing that can be rendered.
    #[error("Nothing to render: {0}")]
    DiscoveryEmpty(String),

    /// An external tool could not be started.
    #[error("Failed to start {0}: {1}")]
    CommandStart(String, #[source] io::Error),

    /// An external tool ran but exited unsuccessfully.
    #[error("{tool} exited with {}: {output}", describe_exit_code(.code))]
    ProcessFailed {
        tool: String,
        code: Option<i32>,
        output: String,
    },

    /// An external tool produced no output for longer than the stall timeout.
    #[error("{tool} produced no output for {seconds}s and was stopped")]
    Timeout { tool: String, seconds: u64 },

    /// The run was cancelled through its cancellation token.
    #[error("Render cancelled")]
    Cancelled,

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Job file error: {0}")]
    Json(#[from] serde_json::Error),

    /// Any fault the run did not anticipate, including worker panics.
    #[error("Unexpected failure: {0}")]
    Unexpected(String),
}

impl CoreError {
    /// Whether this error is a per-unit encoder failure.
    ///
    /// Batch runs log these and continue with the next unit; every other
    /// error ends the run.
    #[must_use]
    pub fn is_process_failure(&self) -> bool {
        matches!(self, Self::ProcessFailed { .. } | Self::Timeout { .. })
    }
}

/// Result type for loopcast-core operations
pub type CoreResult<T> = Result<T, CoreError>;

fn describe_exit_code(code: &Option<i32>) -> String {
    match *code {
        Some(code) => format!("exit code {code}"),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

/// Builds a `CommandStart` error for a tool that failed to spawn.
pub fn command_start_error(tool: impl Into<String>, err: io::Error) -> CoreError {
    CoreError::CommandStart(tool.into(), err)
}

/// Builds a `ProcessFailed` error from an exit code and captured output.
pub fn command_failed_error(
    tool: impl Into<String>,
    code: Option<i32>,
    output: impl Into<String>,
) -> CoreError {
    CoreError::ProcessFailed {
        tool: tool.into(),
        code,
        output: output.into(),
    }
}
