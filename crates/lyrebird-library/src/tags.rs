// SPDX-License-Identifier: GPL-3.0-or-later

//! Embedded tag reading (ID3/FLAC/Vorbis/MP4) via `lofty`.

use lofty::prelude::*;
use lofty::probe::Probe;
use lofty::tag::ItemKey;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while reading embedded tags
#[derive(Debug, Error)]
pub enum TagReadError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Failed to read tags from {path}: {message}")]
    Unreadable { path: String, message: String },
}

/// Result type used throughout the embedded tag module.
pub type TagReadResult<T> = Result<T, TagReadError>;

/// Values read from a file's primary (or first) tag and audio properties.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmbeddedTags {
    pub artist: Option<String>,
    pub title: Option<String>,
    pub album: Option<String>,
    pub duration_secs: Option<f64>,
}

#[derive(Default, Clone)]
pub struct EmbeddedTagReader;

impl EmbeddedTagReader {
    pub fn read(&self, path: impl AsRef<Path>) -> TagReadResult<EmbeddedTags> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(TagReadError::FileNotFound(path.display().to_string()));
        }

        let unreadable = |err: lofty::error::LoftyError| TagReadError::Unreadable {
            path: path.display().to_string(),
            message: err.to_string(),
        };

        let tagged_file = Probe::open(path).map_err(unreadable)?.read().map_err(unreadable)?;

        let duration = tagged_file.properties().duration();
        let duration_secs = (!duration.is_zero()).then(|| duration.as_secs_f64());

        let Some(tag) = tagged_file.primary_tag().or_else(|| tagged_file.first_tag()) else {
            debug!(target: "library", path = %path.display(), "file has no tags");
            return Ok(EmbeddedTags {
                duration_secs,
                ..EmbeddedTags::default()
            });
        };

        let artist = tag
            .artist()
            .map(|value| value.to_string())
            .or_else(|| tag.get_string(&ItemKey::AlbumArtist).map(str::to_string));

        Ok(EmbeddedTags {
            artist: normalize_optional(artist),
            title: normalize_optional(tag.title().map(|value| value.to_string())),
            album: normalize_optional(tag.album().map(|value| value.to_string())),
            duration_secs,
        })
    }
}

pub(crate) fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
