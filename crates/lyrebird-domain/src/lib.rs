// SPDX-License-Identifier: GPL-3.0-or-later
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ============================================================================
// Track Metadata
// ============================================================================

/// Artist/title/album/duration describing one audio file, as read from its
/// tags or guessed from its filename.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackMetadata {
    pub artist: String,
    pub title: String,
    pub album: Option<String>,
    /// Duration in seconds.
    pub duration: Option<f64>,
    pub path: PathBuf,
}

impl TrackMetadata {
    pub fn new(
        artist: impl Into<String>,
        title: impl Into<String>,
        path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            artist: artist.into(),
            title: title.into(),
            album: None,
            duration: None,
            path: path.into(),
        }
    }

    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        self.album = Some(album.into());
        self
    }

    pub fn with_duration(mut self, seconds: f64) -> Self {
        self.duration = Some(seconds);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A track without a title cannot be looked up.
    pub fn is_searchable(&self) -> bool {
        !self.title.trim().is_empty()
    }

    /// Album name, if present and not blank.
    pub fn album_name(&self) -> Option<&str> {
        self.album
            .as_deref()
            .map(str::trim)
            .filter(|album| !album.is_empty())
    }

    /// Duration rounded to whole seconds, ignoring non-finite or non-positive values.
    pub fn duration_secs(&self) -> Option<u64> {
        self.duration
            .filter(|secs| secs.is_finite() && *secs > 0.0)
            .map(|secs| secs.round() as u64)
    }
}

// ============================================================================
// Search Options
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LyricSearchOptions {
    /// Enables the last, title-only search tier.
    pub allow_title_only_search: bool,
    /// Keep searching looser tiers when a match only has plain lyrics.
    pub prefer_synced: bool,
}

impl Default for LyricSearchOptions {
    fn default() -> Self {
        Self {
            allow_title_only_search: false,
            prefer_synced: true,
        }
    }
}

// ============================================================================
// Lyric Result
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LyricSource {
    Lrclib,
}

impl std::fmt::Display for LyricSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lrclib => write!(f, "lrclib"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LyricKind {
    Synced,
    Plain,
    Instrumental,
}

impl std::fmt::Display for LyricKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Synced => write!(f, "synced"),
            Self::Plain => write!(f, "plain"),
            Self::Instrumental => write!(f, "instrumental"),
        }
    }
}

/// Lyrics chosen for a track. At least one of synced lyrics, plain lyrics
/// or the instrumental flag is always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LyricResult {
    pub artist: String,
    pub title: String,
    pub album: Option<String>,
    pub synced_lyrics: Option<String>,
    pub plain_lyrics: Option<String>,
    pub source: LyricSource,
    pub instrumental: bool,
}

impl LyricResult {
    pub fn has_content(&self) -> bool {
        self.synced_lyrics.is_some() || self.plain_lyrics.is_some() || self.instrumental
    }

    /// Synced lyrics or an instrumental flag end the search immediately.
    pub fn is_preferred(&self) -> bool {
        self.synced_lyrics.is_some() || self.instrumental
    }

    pub fn kind(&self) -> Option<LyricKind> {
        if self.synced_lyrics.is_some() {
            Some(LyricKind::Synced)
        } else if self.plain_lyrics.is_some() {
            Some(LyricKind::Plain)
        } else if self.instrumental {
            Some(LyricKind::Instrumental)
        } else {
            None
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
