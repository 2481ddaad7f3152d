// SPDX-License-Identifier: GPL-3.0-or-later

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("path does not exist: {0}")]
    PathNotFound(String),
    #[error("I/O error: {0}")]
    Io(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedAudioFile {
    pub path: PathBuf,
    pub extension: String,
    pub size_bytes: u64,
}

/// Collect supported audio files under `root`, sorted by path.
///
/// `root` may also be a single audio file, which is returned on its own when
/// its extension is supported.
pub fn scan_audio_files(root: impl AsRef<Path>) -> Result<Vec<ScannedAudioFile>, ScanError> {
    let root = root.as_ref();
    if !root.exists() {
        return Err(ScanError::PathNotFound(root.display().to_string()));
    }

    let mut scanned = Vec::new();
    if root.is_file() {
        if let Some(file) = scanned_file(root)? {
            scanned.push(file);
        }
    } else {
        visit_directory(root, &mut scanned)?;
    }

    scanned.sort_by(|left, right| left.path.cmp(&right.path));
    debug!(target: "library", root = %root.display(), count = scanned.len(), "scan complete");
    Ok(scanned)
}

fn visit_directory(directory: &Path, scanned: &mut Vec<ScannedAudioFile>) -> Result<(), ScanError> {
    let entries = fs::read_dir(directory).map_err(|err| ScanError::Io(err.to_string()))?;

    for entry in entries {
        let entry = entry.map_err(|err| ScanError::Io(err.to_string()))?;
        let path = entry.path();

        let file_type = entry
            .file_type()
            .map_err(|err| ScanError::Io(err.to_string()))?;

        if file_type.is_symlink() {
            continue;
        }

        if file_type.is_dir() {
            visit_directory(&path, scanned)?;
            continue;
        }

        if let Some(file) = scanned_file(&path)? {
            scanned.push(file);
        }
    }

    Ok(())
}

fn scanned_file(path: &Path) -> Result<Option<ScannedAudioFile>, ScanError> {
    let Some(extension) = path.extension().and_then(|ext| ext.to_str()) else {
        return Ok(None);
    };

    let normalized_extension = extension.to_ascii_lowercase();
    if !is_audio_extension(&normalized_extension) {
        return Ok(None);
    }

    let metadata = fs::metadata(path).map_err(|err| ScanError::Io(err.to_string()))?;
    Ok(Some(ScannedAudioFile {
        path: path.to_path_buf(),
        extension: normalized_extension,
        size_bytes: metadata.len(),
    }))
}

pub fn is_audio_extension(extension: &str) -> bool {
    matches!(
        extension,
        "mp3" | "flac" | "m4a" | "aac" | "ogg" | "opus" | "wav" | "wv" | "ape" | "dsf"
    )
}
