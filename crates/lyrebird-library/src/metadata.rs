// SPDX-License-Identifier: GPL-3.0-or-later

//! Track metadata for lyric lookups.
//!
//! Embedded tags are preferred. Missing artist or title is filled from
//! filename heuristics, and a file with neither tags nor a parseable name
//! yields `None`.

use lyrebird_domain::TrackMetadata;
use std::path::Path;
use tracing::debug;

use crate::filename_heuristics::FilenameHeuristicsService;
use crate::tags::{normalize_optional, EmbeddedTagReader, EmbeddedTags};

/// Supplies search metadata for an audio file. `None` means the file
/// cannot be searched.
pub trait MetadataSource: Send + Sync {
    fn read(&self, path: &Path) -> Option<TrackMetadata>;
}

#[derive(Default, Clone)]
pub struct TagMetadataSource {
    tags: EmbeddedTagReader,
    filenames: FilenameHeuristicsService,
}

impl TagMetadataSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge tag values with filename heuristics, tags taking priority.
    fn merge(&self, path: &Path, tags: EmbeddedTags) -> Option<TrackMetadata> {
        let EmbeddedTags {
            mut artist,
            mut title,
            mut album,
            duration_secs,
        } = tags;

        if artist.is_none() || title.is_none() {
            match self.filenames.parse_with_folders(path) {
                Ok(parsed) => {
                    artist = artist.or_else(|| normalize_optional(parsed.artist));
                    title = title.or_else(|| normalize_optional(parsed.title));
                    album = album.or_else(|| normalize_optional(parsed.album));
                }
                Err(err) => {
                    debug!(target: "library", path = %path.display(), error = %err, "filename heuristics failed");
                }
            }
        }

        let title = title?;
        Some(TrackMetadata {
            artist: artist.unwrap_or_default(),
            title,
            album,
            duration: duration_secs,
            path: path.to_path_buf(),
        })
    }
}

impl MetadataSource for TagMetadataSource {
    fn read(&self, path: &Path) -> Option<TrackMetadata> {
        let tags = self.tags.read(path).unwrap_or_else(|err| {
            debug!(target: "library", path = %path.display(), error = %err, "embedded tags unavailable");
            EmbeddedTags::default()
        });
        self.merge(path, tags)
    }
}
