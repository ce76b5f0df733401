//! Runtime settings that are independent of any one job: tool locations and
//! process supervision timings.

use std::path::PathBuf;
use std::time::Duration;

use super::utils::{get_env_path, get_env_u64};

pub const DEFAULT_FFMPEG_BINARY: &str = "ffmpeg";
pub const DEFAULT_FFPROBE_BINARY: &str = "ffprobe";

/// How often the driver wakes up to check for cancellation while the encoder is quiet.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

pub const ENV_FFMPEG: &str = "LOOPCAST_FFMPEG";
pub const ENV_FFPROBE: &str = "LOOPCAST_FFPROBE";
pub const ENV_STALL_TIMEOUT_SECS: &str = "LOOPCAST_STALL_TIMEOUT_SECS";

/// Settings for the external tools driven by a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSettings {
    /// ffmpeg executable, resolved through `PATH` when not absolute.
    pub ffmpeg_path: PathBuf,

    /// ffprobe executable, resolved through `PATH` when not absolute.
    pub ffprobe_path: PathBuf,

    /// Kill the encoder when it prints nothing for this long. `None` waits forever.
    pub stall_timeout: Option<Duration>,

    pub poll_interval: Duration,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            ffmpeg_path: PathBuf::from(DEFAULT_FFMPEG_BINARY),
            ffprobe_path: PathBuf::from(DEFAULT_FFPROBE_BINARY),
            stall_timeout: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl RunSettings {
    /// Defaults overridden by `LOOPCAST_FFMPEG`, `LOOPCAST_FFPROBE` and
    /// `LOOPCAST_STALL_TIMEOUT_SECS`. A stall timeout of 0 disables it.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let stall_secs = get_env_u64(ENV_STALL_TIMEOUT_SECS, 0);
        Self {
            ffmpeg_path: get_env_path(ENV_FFMPEG, defaults.ffmpeg_path),
            ffprobe_path: get_env_path(ENV_FFPROBE, defaults.ffprobe_path),
            stall_timeout: (stall_secs > 0).then(|| Duration::from_secs(stall_secs)),
            poll_interval: defaults.poll_interval,
        }
    }

    /// Overrides the stall timeout; `Some(0)` disables it.
    #[must_use]
    pub fn with_stall_timeout_secs(mut self, secs: Option<u64>) -> Self {
        if let Some(secs) = secs {
            self.stall_timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }
        self
    }
}
