// SPDX-License-Identifier: GPL-3.0-or-later

//! Maps raw candidate records into [`LyricResult`]s.
//!
//! Field names are not guaranteed by the service, so each logical field has
//! an ordered list of accepted keys. The first key holding a non-empty value
//! wins. New spellings only need to be appended to the relevant list.

use lyrebird_domain::{LyricResult, LyricSource, TrackMetadata};
use serde_json::Value;

use crate::response::RawCandidate;

pub const ARTIST_KEYS: &[&str] = &["artistName", "artist_name", "artist"];
pub const TRACK_KEYS: &[&str] = &["trackName", "track_name", "name", "title"];
pub const ALBUM_KEYS: &[&str] = &["albumName", "album_name", "album"];
pub const SYNCED_KEYS: &[&str] = &["syncedLyrics", "synced_lyrics"];
pub const PLAIN_KEYS: &[&str] = &["plainLyrics", "plain_lyrics"];
pub const INSTRUMENTAL_KEYS: &[&str] = &["instrumental", "isInstrumental", "is_instrumental"];

/// First non-blank string under any of `keys`. Numbers are accepted and stringified.
pub fn first_text(candidate: &RawCandidate, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match candidate.get(*key)? {
        Value::String(text) if !text.trim().is_empty() => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    })
}

/// First boolean-like value under any of `keys`; absent means `false`.
pub fn first_flag(candidate: &RawCandidate, keys: &[&str]) -> bool {
    keys.iter()
        .find_map(|key| match candidate.get(*key)? {
            Value::Bool(flag) => Some(*flag),
            Value::Number(number) => number.as_i64().map(|n| n != 0),
            Value::String(text) => match text.trim().to_ascii_lowercase().as_str() {
                "true" | "1" => Some(true),
                "false" | "0" => Some(false),
                _ => None,
            },
            _ => None,
        })
        .unwrap_or(false)
}

/// Build a result from a raw record, falling back to the query metadata for
/// names. Returns `None` when the record carries no lyrics and is not
/// instrumental.
pub fn map_candidate(candidate: &RawCandidate, metadata: &TrackMetadata) -> Option<LyricResult> {
    let result = LyricResult {
        artist: first_text(candidate, ARTIST_KEYS).unwrap_or_else(|| metadata.artist.clone()),
        title: first_text(candidate, TRACK_KEYS).unwrap_or_else(|| metadata.title.clone()),
        album: first_text(candidate, ALBUM_KEYS).or_else(|| metadata.album.clone()),
        synced_lyrics: first_text(candidate, SYNCED_KEYS),
        plain_lyrics: first_text(candidate, PLAIN_KEYS),
        source: LyricSource::Lrclib,
        instrumental: first_flag(candidate, INSTRUMENTAL_KEYS),
    };

    result.has_content().then_some(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> RawCandidate {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    fn metadata() -> TrackMetadata {
        TrackMetadata::new("Query Artist", "Query Title", "/music/song.flac").with_album("Query Album")
    }

    #[test]
    fn camel_case_fields_are_mapped() {
        let candidate = raw(json!({
            "artistName": "Portishead",
            "trackName": "Roads",
            "albumName": "Dummy",
            "syncedLyrics": "[00:12.00]Oh, can't anybody see",
            "plainLyrics": "Oh, can't anybody see",
            "instrumental": false
        }));

        let result = map_candidate(&candidate, &metadata()).unwrap();
        assert_eq!(result.artist, "Portishead");
        assert_eq!(result.title, "Roads");
        assert_eq!(result.album.as_deref(), Some("Dummy"));
        assert!(result.synced_lyrics.is_some());
        assert!(result.plain_lyrics.is_some());
        assert!(!result.instrumental);
        assert_eq!(result.source, LyricSource::Lrclib);
    }

    #[test]
    fn snake_case_fields_are_mapped() {
        let candidate = raw(json!({
            "artist_name": "Massive Attack",
            "track_name": "Teardrop",
            "album_name": "Mezzanine",
            "plain_lyrics": "Love, love is a verb"
        }));

        let result = map_candidate(&candidate, &metadata()).unwrap();
        assert_eq!(result.artist, "Massive Attack");
        assert_eq!(result.title, "Teardrop");
        assert_eq!(result.album.as_deref(), Some("Mezzanine"));
        assert_eq!(result.plain_lyrics.as_deref(), Some("Love, love is a verb"));
        assert_eq!(result.synced_lyrics, None);
    }

    #[test]
    fn earlier_alias_wins_and_blank_values_are_skipped() {
        let candidate = raw(json!({
            "artistName": "  ",
            "artist_name": "Second Spelling",
            "artist": "Third Spelling",
            "plainLyrics": "words"
        }));
        assert_eq!(first_text(&candidate, ARTIST_KEYS).as_deref(), Some("Second Spelling"));
    }

    #[test]
    fn query_metadata_fills_missing_names() {
        let candidate = raw(json!({ "syncedLyrics": "[00:01.00]la" }));
        let result = map_candidate(&candidate, &metadata()).unwrap();
        assert_eq!(result.artist, "Query Artist");
        assert_eq!(result.title, "Query Title");
        assert_eq!(result.album.as_deref(), Some("Query Album"));
    }

    #[test]
    fn contentless_candidate_is_discarded() {
        let candidate = raw(json!({
            "artistName": "Someone",
            "trackName": "Something",
            "syncedLyrics": null,
            "plainLyrics": "",
            "instrumental": false
        }));
        assert_eq!(map_candidate(&candidate, &metadata()), None);
    }

    #[test]
    fn instrumental_only_candidate_is_kept() {
        let candidate = raw(json!({ "trackName": "Intro", "instrumental": true }));
        let result = map_candidate(&candidate, &metadata()).unwrap();
        assert!(result.instrumental);
        assert!(result.is_preferred());
    }

    #[test]
    fn flag_accepts_numeric_and_string_forms() {
        assert!(first_flag(&raw(json!({ "instrumental": 1 })), INSTRUMENTAL_KEYS));
        assert!(first_flag(&raw(json!({ "is_instrumental": "true" })), INSTRUMENTAL_KEYS));
        assert!(!first_flag(&raw(json!({ "instrumental": "nope" })), INSTRUMENTAL_KEYS));
        assert!(!first_flag(&raw(json!({})), INSTRUMENTAL_KEYS));
    }
}
