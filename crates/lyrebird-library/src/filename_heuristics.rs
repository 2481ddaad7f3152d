// SPDX-License-Identifier: GPL-3.0-or-later

//! Filename-based metadata heuristics (fallback when tags are missing).
//!
//! Patterns are tried from most to least specific:
//! 1. `Artist - Album - 01 - Title`
//! 2. `Artist - 01 - Title` (album from folder)
//! 3. `01 - Title` (artist/album from folder structure)
//! 4. `Artist - Title`
//! 5. `01 Title`
//!
//! Folder context is `<artist>/<album>/<file>`.

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors that can occur during filename heuristics parsing
#[derive(Debug, Error)]
pub enum FilenameHeuristicsError {
    #[error("Could not parse filename: {0}")]
    ParsingFailed(String),

    #[error("Insufficient information to search")]
    InsufficientMetadata,
}

/// Result type for filename heuristics operations
pub type FilenameHeuristicsResult<T> = Result<T, FilenameHeuristicsError>;

/// Metadata extracted from filename
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedFilename {
    /// Artist name extracted from filename
    pub artist: Option<String>,
    /// Album title extracted from filename
    pub album: Option<String>,
    /// Track title extracted from filename
    pub title: Option<String>,
    /// Track number if present
    pub track_number: Option<u32>,
}

lazy_static! {
    // Pattern: Artist - Album - TrackNum - Title
    static ref PATTERN_DETAILED: Regex = Regex::new(
        r"^(?P<artist>[^-]+?)\s*-\s*(?P<album>[^-]+?)\s*-\s*(?P<track>\d+)\s*-\s*(?P<title>.+)$"
    ).expect("detailed pattern is valid");

    // Pattern: Artist - TrackNum - Title (album implicit from folder)
    static ref PATTERN_ARTIST_TRACK_TITLE: Regex = Regex::new(
        r"^(?P<artist>[^-]+?)\s*-\s*(?P<track>\d+)\s*-\s*(?P<title>.+)$"
    ).expect("artist/track/title pattern is valid");

    // Pattern: TrackNum - Title (artist/album from folder structure)
    static ref PATTERN_TRACK_TITLE: Regex = Regex::new(
        r"^(?P<track>\d+)\s*[-.]\s*(?P<title>.+)$"
    ).expect("track/title pattern is valid");

    // Pattern: Artist - Title
    static ref PATTERN_ARTIST_TITLE: Regex = Regex::new(
        r"^(?P<artist>.+?)\s+-\s+(?P<title>.+)$"
    ).expect("artist/title pattern is valid");

    // Pattern: TrackNum Title (no separator between track and title)
    static ref PATTERN_TRACK_TITLE_SPACE: Regex = Regex::new(
        r"^(?P<track>\d+)\s+(?P<title>.+)$"
    ).expect("track/title space pattern is valid");
}

/// Parent and grandparent directory names, read as `(artist, album)`.
pub fn folder_context(path: &Path) -> (Option<String>, Option<String>) {
    let album = path
        .parent()
        .and_then(|dir| dir.file_name())
        .and_then(|segment| segment.to_str())
        .map(str::to_owned);
    let artist = path
        .parent()
        .and_then(Path::parent)
        .and_then(|dir| dir.file_name())
        .and_then(|segment| segment.to_str())
        .map(str::to_owned);
    (artist, album)
}

fn capture(caps: &Captures<'_>, name: &str) -> Option<String> {
    caps.name(name)
        .map(|m| m.as_str().trim().to_string())
        .filter(|value| !value.is_empty())
}

fn track_number(caps: &Captures<'_>) -> Option<u32> {
    caps.name("track").and_then(|m| m.as_str().parse::<u32>().ok())
}

/// Filename-based heuristics service.
#[derive(Default, Clone)]
pub struct FilenameHeuristicsService;

impl FilenameHeuristicsService {
    /// Parse a filename to extract artist/album/track/title information.
    ///
    /// Only the file stem is inspected; the file itself is never opened.
    /// `folder_artist` and `folder_album` fill in what the pattern leaves out.
    pub fn parse_filename(
        &self,
        path: impl AsRef<Path>,
        folder_artist: Option<&str>,
        folder_album: Option<&str>,
    ) -> FilenameHeuristicsResult<ParsedFilename> {
        let path = path.as_ref();

        let filename = path.file_stem().and_then(|s| s.to_str()).ok_or_else(|| {
            FilenameHeuristicsError::ParsingFailed("Invalid filename".to_string())
        })?;
        let filename = filename.replace('_', " ");
        let filename = filename.trim();

        debug!(
            target: "library",
            filename = %filename,
            folder_artist = ?folder_artist,
            folder_album = ?folder_album,
            "attempting to parse filename"
        );

        let folder_artist = folder_artist.map(str::to_string);
        let folder_album = folder_album.map(str::to_string);

        if let Some(caps) = PATTERN_DETAILED.captures(filename) {
            return Ok(ParsedFilename {
                artist: capture(&caps, "artist"),
                album: capture(&caps, "album"),
                title: capture(&caps, "title"),
                track_number: track_number(&caps),
            });
        }

        if let Some(caps) = PATTERN_ARTIST_TRACK_TITLE.captures(filename) {
            return Ok(ParsedFilename {
                artist: capture(&caps, "artist"),
                album: folder_album,
                title: capture(&caps, "title"),
                track_number: track_number(&caps),
            });
        }

        if let Some(caps) = PATTERN_TRACK_TITLE.captures(filename) {
            return Ok(ParsedFilename {
                artist: folder_artist,
                album: folder_album,
                title: capture(&caps, "title"),
                track_number: track_number(&caps),
            });
        }

        if let Some(caps) = PATTERN_ARTIST_TITLE.captures(filename) {
            return Ok(ParsedFilename {
                artist: capture(&caps, "artist"),
                album: folder_album,
                title: capture(&caps, "title"),
                track_number: None,
            });
        }

        if let Some(caps) = PATTERN_TRACK_TITLE_SPACE.captures(filename) {
            return Ok(ParsedFilename {
                artist: folder_artist,
                album: folder_album,
                title: capture(&caps, "title"),
                track_number: track_number(&caps),
            });
        }

        warn!(
            target: "library",
            filename = %filename,
            "no filename patterns matched"
        );
        Err(FilenameHeuristicsError::ParsingFailed(format!(
            "No matching filename patterns for '{}'",
            filename
        )))
    }

    /// Parse `path` using its own folders as context. Fails with
    /// [`FilenameHeuristicsError::InsufficientMetadata`] when no title
    /// could be recovered.
    pub fn parse_with_folders(&self, path: impl AsRef<Path>) -> FilenameHeuristicsResult<ParsedFilename> {
        let path = path.as_ref();
        let (folder_artist, folder_album) = folder_context(path);
        let parsed = self.parse_filename(path, folder_artist.as_deref(), folder_album.as_deref())?;

        if parsed.title.is_none() {
            return Err(FilenameHeuristicsError::InsufficientMetadata);
        }
        Ok(parsed)
    }
}
