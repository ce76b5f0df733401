//! Timestamped tracklist sidecar.
//!
//! Every rendered output gets a `.txt` file next to it listing where each
//! track of the (un-repeated) playlist starts:
//!
//! ```text
//! 00:00 - 01 Intro.mp3
//! 03:25 - 02 Theme.mp3
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::CoreResult;
use crate::media::MediaAsset;
use crate::utils::format_track_timestamp;

/// Extension of the sidecar file.
pub const TRACKLIST_EXTENSION: &str = "txt";

#[derive(Debug, Clone, PartialEq)]
pub struct TrackEntry {
    pub start_offset_seconds: f64,
    pub display_name: String,
}

/// Builds one entry per asset. The running offset advances by each known
/// duration and stays put when a duration is unknown.
pub fn build_entries<F>(audio: &[MediaAsset], mut duration_of: F) -> Vec<TrackEntry>
where
    F: FnMut(&Path) -> Option<f64>,
{
    let mut offset = 0.0;
    audio
        .iter()
        .map(|asset| {
            let entry = TrackEntry {
                start_offset_seconds: offset,
                display_name: asset.display_name(),
            };
            if let Some(duration) = duration_of(asset.path()) {
                offset += duration;
            }
            entry
        })
        .collect()
}

/// Renders entries as `"<timestamp> - <name>"` lines, each terminated by a newline.
#[must_use]
pub fn format_tracklist(entries: &[TrackEntry]) -> String {
    entries
        .iter()
        .map(|entry| {
            format!(
                "{} - {}\n",
                format_track_timestamp(entry.start_offset_seconds),
                entry.display_name
            )
        })
        .collect()
}

/// Sidecar location for a rendered output: same path, `.txt` extension.
#[must_use]
pub fn sidecar_path(output: &Path) -> PathBuf {
    output.with_extension(TRACKLIST_EXTENSION)
}

/// Writes the sidecar for `output` and returns its path.
pub fn write_tracklist(output: &Path, entries: &[TrackEntry]) -> CoreResult<PathBuf> {
    let path = sidecar_path(output);
    fs::write(&path, format_tracklist(entries))?;
    debug!("Wrote tracklist {} ({} entries)", path.display(), entries.len());
    Ok(path)
}
