// SPDX-License-Identifier: GPL-3.0-or-later

//! Writes resolved lyrics next to the audio file.
//!
//! | content           | file           | body                  |
//! |-------------------|----------------|-----------------------|
//! | synced lyrics     | `<stem>.lrc`   | synced text           |
//! | plain lyrics only | `<stem>.txt`   | plain text            |
//! | instrumental only | `<stem>.lrc`   | `[au: instrumental]`  |

use lyrebird_domain::{LyricKind, LyricResult};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

pub const SYNCED_EXTENSION: &str = "lrc";
pub const PLAIN_EXTENSION: &str = "txt";
pub const INSTRUMENTAL_PLACEHOLDER: &str = "[au: instrumental]";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to write lyrics to {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("lyrics for {0} carry no content")]
    NoContent(String),
}

#[derive(Debug, Clone, Default)]
pub struct LyricsFileStore;

impl LyricsFileStore {
    pub fn new() -> Self {
        Self
    }

    pub fn lyrics_path(audio_path: &Path, kind: LyricKind) -> PathBuf {
        let extension = match kind {
            LyricKind::Synced | LyricKind::Instrumental => SYNCED_EXTENSION,
            LyricKind::Plain => PLAIN_EXTENSION,
        };
        audio_path.with_extension(extension)
    }

    /// An existing `.lrc` or `.txt` sibling, `.lrc` first.
    pub fn existing_lyrics(&self, audio_path: &Path) -> Option<PathBuf> {
        [SYNCED_EXTENSION, PLAIN_EXTENSION]
            .into_iter()
            .map(|extension| audio_path.with_extension(extension))
            .find(|candidate| candidate.is_file())
    }

    /// Write `result` next to `audio_path` and return the written path.
    ///
    /// A sibling of the other extension left by an earlier run is removed so
    /// a track never carries both.
    pub fn write(&self, audio_path: &Path, result: &LyricResult) -> Result<PathBuf, StoreError> {
        let kind = result
            .kind()
            .ok_or_else(|| StoreError::NoContent(audio_path.display().to_string()))?;

        let contents = match kind {
            LyricKind::Synced => result.synced_lyrics.as_deref().unwrap_or_default(),
            LyricKind::Plain => result.plain_lyrics.as_deref().unwrap_or_default(),
            LyricKind::Instrumental => INSTRUMENTAL_PLACEHOLDER,
        };

        let target = Self::lyrics_path(audio_path, kind);
        write_atomically(&target, contents)?;

        let stale = match kind {
            LyricKind::Plain => audio_path.with_extension(SYNCED_EXTENSION),
            LyricKind::Synced | LyricKind::Instrumental => audio_path.with_extension(PLAIN_EXTENSION),
        };
        if stale.is_file() {
            fs::remove_file(&stale).map_err(|source| StoreError::Io {
                path: stale.display().to_string(),
                source,
            })?;
            debug!(target: "library", path = %stale.display(), "removed stale lyrics file");
        }

        debug!(target: "library", path = %target.display(), %kind, "lyrics written");
        Ok(target)
    }
}

/// Write to a `.part` sibling and rename it over `target`. An interrupted
/// run leaves at most a stale `.part` file, never a truncated lyrics file.
fn write_atomically(target: &Path, contents: &str) -> Result<(), StoreError> {
    let mut partial = target.as_os_str().to_owned();
    partial.push(".part");
    let partial = PathBuf::from(partial);

    let io_error = |path: &Path| {
        let path = path.display().to_string();
        move |source: io::Error| StoreError::Io { path, source }
    };

    fs::write(&partial, contents).map_err(io_error(&partial))?;
    if let Err(err) = fs::rename(&partial, target) {
        let _ = fs::remove_file(&partial);
        return Err(io_error(target)(err));
    }
    Ok(())
}
