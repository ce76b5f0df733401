// ============================================================================
// loopcast-core/src/external/mod.rs
// ============================================================================
//
// EXTERNAL TOOLS: Interactions with ffmpeg and ffprobe
//
// This module encapsulates interactions with the external command-line tools.
// It provides abstractions through traits and concrete implementations so the
// orchestrator can be driven by fakes in tests.
//
// KEY COMPONENTS:
// - Argument building for render encodes (ffmpeg)
// - Traits for spawning and driving the encoder (EncoderSpawner, EncoderProcess)
// - Duration probing (DurationProbe, FfprobeCli)
// - Mock implementations for tests (mocks)

// ---- Standard library imports ----
use std::process::Command;

// ============================================================================
// SUBMODULES
// ============================================================================

/// Contains ffmpeg argument building logic
pub mod ffmpeg;

/// Contains traits and implementations for running ffmpeg
pub mod ffmpeg_executor;

/// Contains traits and implementations for running ffprobe
pub mod ffprobe_executor;

#[cfg(test)]
pub mod mocks;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use ffmpeg::{AudioMapping, RenderParams, build_render_args, format_command_line};
pub use ffmpeg_executor::{
    EncoderProcess, EncoderSpawner, NextEvent, ProcessExit, SidecarProcess, SidecarSpawner,
};
pub use ffprobe_executor::{DurationProbe, FfprobeCli};

// ============================================================================
// PLATFORM
// ============================================================================

/// Keeps child processes from opening a console window on Windows.
#[cfg(windows)]
pub(crate) fn apply_no_window(cmd: &mut Command) {
    use std::os::windows::process::CommandExt;
    // CREATE_NO_WINDOW
    cmd.creation_flags(0x0800_0000);
}

#[cfg(not(windows))]
pub(crate) fn apply_no_window(_cmd: &mut Command) {}
