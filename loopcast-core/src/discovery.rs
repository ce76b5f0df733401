//! Batch discovery of render units.
//!
//! Every immediate subfolder of a batch root is one project. The folder is
//! walked recursively in name order: the first video file found becomes the
//! looping background, and every audio file joins the playlist, which is then
//! sorted case-insensitively by file name. Files with other extensions are
//! ignored.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use walkdir::WalkDir;

use crate::error::{CoreError, CoreResult};
use crate::media::{
    AUDIO_OUTPUT_EXTENSION, MediaAsset, MediaKind, OutputTarget, RenderUnit,
    VIDEO_OUTPUT_EXTENSION, sort_by_name_case_insensitive,
};
use crate::utils::display_name;

/// What discovery made of one subfolder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FolderOutcome {
    /// A video and at least one audio file were found.
    Ready(RenderUnit),
    /// Audio was found but no video; the caller decides what to do with it.
    NoVideo(Vec<MediaAsset>),
    /// No audio was found; the folder is always skipped.
    NoAudio,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredFolder {
    pub name: String,
    pub path: PathBuf,
    pub outcome: FolderOutcome,
}

impl DiscoveredFolder {
    /// Builds the audio-only unit for a folder without video, written to
    /// `<output_root>/<folder>.m4a`. Returns `None` for any other outcome.
    #[must_use]
    pub fn audio_only_unit(&self, output_root: &Path) -> Option<RenderUnit> {
        match &self.outcome {
            FolderOutcome::NoVideo(audio) => Some(RenderUnit {
                name: self.name.clone(),
                video: None,
                audio: audio.clone(),
                target: OutputTarget::File(
                    output_root.join(format!("{}.{AUDIO_OUTPUT_EXTENSION}", self.name)),
                ),
            }),
            _ => None,
        }
    }
}

/// Result of scanning a batch root, in case-insensitive folder-name order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryReport {
    folders: Vec<DiscoveredFolder>,
}

impl DiscoveryReport {
    /// Every scanned subfolder, skipped ones included.
    #[must_use]
    pub fn folders(&self) -> &[DiscoveredFolder] {
        &self.folders
    }

    /// Number of scanned subfolders.
    #[must_use]
    pub fn total(&self) -> usize {
        self.folders.len()
    }

    /// Units that have both a video and a playlist.
    pub fn units(&self) -> impl Iterator<Item = &RenderUnit> {
        self.folders.iter().filter_map(|folder| match &folder.outcome {
            FolderOutcome::Ready(unit) => Some(unit),
            _ => None,
        })
    }

    /// Folders with audio but no video.
    #[must_use]
    pub fn folders_without_video(&self) -> Vec<&DiscoveredFolder> {
        self.folders
            .iter()
            .filter(|folder| matches!(folder.outcome, FolderOutcome::NoVideo(_)))
            .collect()
    }

    /// Folders without any audio.
    #[must_use]
    pub fn skipped(&self) -> Vec<&DiscoveredFolder> {
        self.folders
            .iter()
            .filter(|folder| folder.outcome == FolderOutcome::NoAudio)
            .collect()
    }
}

/// Scans the immediate subfolders of `batch_root`.
///
/// In combined mode a ready folder renders to `<output_root>/<folder>.mp4`;
/// in separate mode its tracks go to `<output_root>/<folder>/`.
///
/// # Errors
///
/// * `CoreError::ConfigValidation` if `batch_root` is not a directory
/// * `CoreError::DiscoveryEmpty` if it has no subfolders
/// * `CoreError::Io` if it cannot be listed
pub fn discover_batch(
    batch_root: &Path,
    output_root: &Path,
    separate_files: bool,
) -> CoreResult<DiscoveryReport> {
    if !batch_root.is_dir() {
        return Err(CoreError::ConfigValidation(format!(
            "batch root {} is not an existing directory",
            batch_root.display()
        )));
    }

    let mut subfolders = Vec::new();
    for entry in fs::read_dir(batch_root)? {
        let path = entry?.path();
        if path.is_dir() {
            subfolders.push(path);
        }
    }
    subfolders.sort_by_cached_key(|path| display_name(path).to_lowercase());

    if subfolders.is_empty() {
        return Err(CoreError::DiscoveryEmpty(format!(
            "no subfolders found in {}",
            batch_root.display()
        )));
    }

    let folders = subfolders
        .into_iter()
        .map(|path| scan_folder(path, output_root, separate_files))
        .collect();

    Ok(DiscoveryReport { folders })
}

fn scan_folder(path: PathBuf, output_root: &Path, separate_files: bool) -> DiscoveredFolder {
    let name = display_name(&path);
    let mut video: Option<MediaAsset> = None;
    let mut audio: Vec<MediaAsset> = Vec::new();

    for entry in WalkDir::new(&path).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry in {name}: {e}");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(asset) = MediaAsset::classify(entry.into_path()) else {
            continue;
        };
        match asset.kind() {
            MediaKind::Video if video.is_none() => video = Some(asset),
            MediaKind::Video => debug!(
                "Ignoring additional video {} in {name}",
                asset.path().display()
            ),
            MediaKind::Audio => audio.push(asset),
        }
    }

    sort_by_name_case_insensitive(&mut audio);

    let outcome = match (video, audio.is_empty()) {
        (_, true) => {
            warn!("Skipping {name}: no audio files found");
            FolderOutcome::NoAudio
        }
        (None, false) => FolderOutcome::NoVideo(audio),
        (Some(video), false) => {
            let target = if separate_files {
                OutputTarget::Folder(output_root.join(&name))
            } else {
                OutputTarget::File(output_root.join(format!("{name}.{VIDEO_OUTPUT_EXTENSION}")))
            };
            debug!(
                "Discovered {name}: video {}, {} audio file(s)",
                video.display_name(),
                audio.len()
            );
            FolderOutcome::Ready(RenderUnit {
                name: name.clone(),
                video: Some(video),
                audio,
                target,
            })
        }
    };

    DiscoveredFolder {
        name,
        path,
        outcome,
    }
}
