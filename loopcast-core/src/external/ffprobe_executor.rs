//! FFprobe integration for media durations
//!
//! Only the container duration is queried. A probe never fails the run:
//! every problem (tool missing, non-zero exit, unparsable output) is logged
//! and reported as an unknown duration.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use log::{debug, warn};

use super::apply_no_window;
use crate::config::DEFAULT_FFPROBE_BINARY;

/// Something that can report the duration of a media file.
pub trait DurationProbe {
    /// Duration in seconds, or `None` when it cannot be determined.
    fn probe_duration(&self, path: &Path) -> Option<f64>;
}

/// Arguments placed before the media path.
pub const DURATION_PROBE_ARGS: &[&str] = &[
    "-v",
    "error",
    "-show_entries",
    "format=duration",
    "-of",
    "default=noprint_wrappers=1:nokey=1",
];

/// `DurationProbe` running the ffprobe executable.
#[derive(Debug, Clone)]
pub struct FfprobeCli {
    ffprobe_path: PathBuf,
}

impl Default for FfprobeCli {
    fn default() -> Self {
        Self::new(PathBuf::from(DEFAULT_FFPROBE_BINARY))
    }
}

impl FfprobeCli {
    #[must_use]
    pub fn new(ffprobe_path: PathBuf) -> Self {
        Self { ffprobe_path }
    }
}

impl DurationProbe for FfprobeCli {
    fn probe_duration(&self, path: &Path) -> Option<f64> {
        debug!("Running ffprobe for duration on: {}", path.display());

        let mut cmd = Command::new(&self.ffprobe_path);
        cmd.args(DURATION_PROBE_ARGS)
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        apply_no_window(&mut cmd);

        let output = match cmd.output() {
            Ok(output) => output,
            Err(e) => {
                warn!(
                    "Could not run {} for {}: {e}",
                    self.ffprobe_path.display(),
                    path.display()
                );
                return None;
            }
        };

        if !output.status.success() {
            warn!(
                "ffprobe failed for {} ({}): {}",
                path.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
            return None;
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let duration = parse_duration_output(&stdout);
        if duration.is_none() {
            warn!(
                "ffprobe returned no usable duration for {}: {:?}",
                path.display(),
                stdout.trim()
            );
        }
        duration
    }
}

/// Parses ffprobe's plain duration output. Only finite, non-negative values are accepted.
#[must_use]
pub fn parse_duration_output(stdout: &str) -> Option<f64> {
    stdout
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())?
        .parse::<f64>()
        .ok()
        .filter(|secs| secs.is_finite() && *secs >= 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration_output() {
        assert_eq!(parse_duration_output("212.845000\n"), Some(212.845));
        assert_eq!(parse_duration_output("\n  3600.0  \n"), Some(3600.0));
        assert_eq!(parse_duration_output("0\n"), Some(0.0));
        assert_eq!(parse_duration_output("N/A\n"), None);
        assert_eq!(parse_duration_output("-1.5"), None);
        assert_eq!(parse_duration_output("inf"), None);
        assert_eq!(parse_duration_output("NaN"), None);
        assert_eq!(parse_duration_output(""), None);
    }

    #[test]
    fn test_missing_tool_yields_none() {
        let probe = FfprobeCli::new(PathBuf::from("/nonexistent/loopcast-ffprobe"));
        assert_eq!(probe.probe_duration(Path::new("song.mp3")), None);
    }
}
