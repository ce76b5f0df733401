//! Media asset classification.
//!
//! Assets are classified once, by extension, into video or audio. Anything
//! outside the two allow-lists is ignored by discovery and rejected by
//! configuration validation.

use std::path::{Path, PathBuf};

use crate::utils::{display_name, has_extension};

/// Extensions accepted as looping background videos.
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "avi", "mkv", "webm"];

/// Extensions accepted as playlist tracks.
pub const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "aac", "m4a", "flac", "ogg"];

/// Containers that can hold the fixed AAC audio stream of an audio-only render.
pub const AUDIO_ONLY_OUTPUT_EXTENSIONS: &[&str] = &["m4a", "aac"];

/// Container used for video renders produced by batch runs and separate tracks.
pub const VIDEO_OUTPUT_EXTENSION: &str = "mp4";

/// Container used for audio-only renders produced by batch runs.
pub const AUDIO_OUTPUT_EXTENSION: &str = "m4a";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Video,
    Audio,
}

impl MediaKind {
    /// Classifies a path by its extension (case-insensitive).
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        if has_extension(path, VIDEO_EXTENSIONS) {
            Some(Self::Video)
        } else if has_extension(path, AUDIO_EXTENSIONS) {
            Some(Self::Audio)
        } else {
            None
        }
    }
}

/// A classified media file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaAsset {
    path: PathBuf,
    kind: MediaKind,
}

impl MediaAsset {
    /// Classifies `path`, returning `None` when its extension is on neither allow-list.
    #[must_use]
    pub fn classify(path: impl Into<PathBuf>) -> Option<Self> {
        let path = path.into();
        let kind = MediaKind::from_path(&path)?;
        Some(Self { path, kind })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    /// File name shown in status lines and the tracklist.
    #[must_use]
    pub fn display_name(&self) -> String {
        display_name(&self.path)
    }
}

/// Where a render unit writes its results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// One concatenated output file.
    File(PathBuf),
    /// A folder receiving one output file per audio track.
    Folder(PathBuf),
}

impl OutputTarget {
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::File(path) | Self::Folder(path) => path,
        }
    }
}

/// One project to render: an optional looping video and a non-empty playlist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderUnit {
    pub name: String,
    pub video: Option<MediaAsset>,
    pub audio: Vec<MediaAsset>,
    pub target: OutputTarget,
}

impl RenderUnit {
    /// Playlist as it is fed to the encoder: the whole sequence `repeat_count` times.
    #[must_use]
    pub fn expanded_audio(&self, repeat_count: u32) -> Vec<&MediaAsset> {
        let repeats = repeat_count.max(1) as usize;
        let mut expanded = Vec::with_capacity(self.audio.len() * repeats);
        for _ in 0..repeats {
            expanded.extend(self.audio.iter());
        }
        expanded
    }
}

/// Sorts audio assets case-insensitively by file name, keeping the relative
/// order of names that compare equal.
pub fn sort_by_name_case_insensitive(assets: &mut [MediaAsset]) {
    assets.sort_by_cached_key(|asset| asset.display_name().to_lowercase());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert_eq!(MediaKind::from_path(Path::new("loop.MP4")), Some(MediaKind::Video));
        assert_eq!(MediaKind::from_path(Path::new("loop.webm")), Some(MediaKind::Video));
        assert_eq!(MediaKind::from_path(Path::new("track.FLAC")), Some(MediaKind::Audio));
        assert_eq!(MediaKind::from_path(Path::new("track.ogg")), Some(MediaKind::Audio));
        assert_eq!(MediaKind::from_path(Path::new("cover.jpg")), None);
        assert_eq!(MediaKind::from_path(Path::new("README")), None);
        assert!(MediaAsset::classify("notes.txt").is_none());
    }

    #[test]
    fn test_sort_is_case_insensitive() {
        let mut assets: Vec<MediaAsset> = ["b.mp3", "A.mp3", "c.wav", "a2.mp3"]
            .iter()
            .filter_map(|p| MediaAsset::classify(*p))
            .collect();
        sort_by_name_case_insensitive(&mut assets);
        let names: Vec<String> = assets.iter().map(MediaAsset::display_name).collect();
        assert_eq!(names, ["A.mp3", "a2.mp3", "b.mp3", "c.wav"]);
    }

    #[test]
    fn test_expanded_audio_repeats_whole_sequence() {
        let unit = RenderUnit {
            name: "set".to_string(),
            video: None,
            audio: ["x.mp3", "y.mp3"]
                .iter()
                .filter_map(|p| MediaAsset::classify(*p))
                .collect(),
            target: OutputTarget::File(PathBuf::from("set.m4a")),
        };
        let names: Vec<String> = unit
            .expanded_audio(3)
            .into_iter()
            .map(MediaAsset::display_name)
            .collect();
        assert_eq!(names, ["x.mp3", "y.mp3", "x.mp3", "y.mp3", "x.mp3", "y.mp3"]);
        assert_eq!(unit.expanded_audio(0).len(), 2);
    }
}
