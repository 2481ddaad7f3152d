// SPDX-License-Identifier: GPL-3.0-or-later

use reqwest::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, LyricsError>;

/// Failure talking to the lyrics lookup service.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("HTTP status {status}: {body}")]
    HttpStatus { status: StatusCode, body: String },
    #[error("Deserialization error: {0}")]
    Deserialization(#[from] serde_json::Error),
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),
}

#[derive(Debug, Error)]
pub enum LyricsError {
    #[error("failed to fetch lyrics for {artist} - {title}: {source}")]
    Fetch {
        artist: String,
        title: String,
        #[source]
        source: TransportError,
    },
}

impl LyricsError {
    pub fn fetch(artist: &str, title: &str, source: TransportError) -> Self {
        Self::Fetch {
            artist: artist.to_string(),
            title: title.to_string(),
            source,
        }
    }
}
