// loopcast-cli/src/cli.rs
//
// Defines the command-line argument structures using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use loopcast_core::encoder::SOFTWARE_CODEC;

/// Environment variable read by `--encoder`.
pub const ENV_ENCODER: &str = "LOOPCAST_ENCODER";

// --- CLI Argument Definition ---

#[derive(Parser, Debug)]
#[command(
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "Loopcast: loop a background video under an audio playlist",
    long_about = "Renders a looping background video (or plain audio) under a playlist of \
                  tracks with ffmpeg and writes a timestamped tracklist next to every output."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging, including the full ffmpeg command lines
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Also write a timestamped log file into this directory
    #[arg(long, global = true, value_name = "LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// Kill ffmpeg after this many seconds without output (0 disables).
    /// Defaults to LOOPCAST_STALL_TIMEOUT_SECS.
    #[arg(long, global = true, value_name = "SECS")]
    pub stall_timeout: Option<u64>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Renders one playlist, optionally over a looping video
    Render(RenderArgs),
    /// Renders every subfolder of a root directory
    Batch(BatchArgs),
    /// Runs a job described by a JSON file
    Run(RunArgs),
}

/// Options shared by `render` and `batch`.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Video encoder token (e.g. libx264, h264_nvenc, h264_amf)
    #[arg(long, value_name = "TOKEN", env = ENV_ENCODER, default_value = SOFTWARE_CODEC)]
    pub encoder: String,

    /// Render one output per track instead of one combined file
    #[arg(long)]
    pub separate: bool,

    /// Play the playlist this many times in a combined render
    #[arg(long, value_name = "N", default_value_t = 1)]
    pub repeat: u32,
}

#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Audio tracks in playback order
    #[arg(short = 'a', long = "audio", required = true, num_args = 1.., value_name = "AUDIO")]
    pub audio: Vec<PathBuf>,

    /// Background video looped for the length of the playlist
    #[arg(long, value_name = "VIDEO")]
    pub video: Option<PathBuf>,

    /// Output file, or output folder with --separate
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    pub output: PathBuf,

    #[command(flatten)]
    pub options: EncodeOptions,
}

#[derive(Args, Debug)]
pub struct BatchArgs {
    /// Directory whose subfolders are rendered one by one
    #[arg(long, value_name = "DIR")]
    pub root: PathBuf,

    /// Directory receiving the rendered outputs
    #[arg(short = 'o', long = "output", value_name = "DIR")]
    pub output: PathBuf,

    /// Skip folders without a video instead of rendering them audio-only
    #[arg(long)]
    pub skip_missing_video: bool,

    #[command(flatten)]
    pub options: EncodeOptions,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// JSON job file
    #[arg(long, value_name = "FILE")]
    pub job: PathBuf,
}
