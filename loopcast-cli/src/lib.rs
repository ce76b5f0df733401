// loopcast-cli/src/lib.rs
//
// Library portion of the Loopcast CLI application.
// Contains argument definitions and command logic.

pub mod cli;
pub mod commands;
pub mod logging;
pub mod progress;

// Re-export items needed by the binary or integration tests
pub use cli::{BatchArgs, Cli, Commands, EncodeOptions, RenderArgs, RunArgs};
pub use commands::batch::run_batch;
pub use commands::render::run_render;
pub use commands::run::run_job;
