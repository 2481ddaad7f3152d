// SPDX-License-Identifier: GPL-3.0-or-later

//! Tiered lyrics resolution.
//!
//! Each call walks up to three successively looser search tiers:
//! 1. **Exact signature**: artist, title, album and duration
//! 2. **Artist + title**: artist and title only
//! 3. **Title only**: title alone, opt-in via
//!    [`LyricSearchOptions::allow_title_only_search`]
//!
//! Tiers 1 and 2 trust the service ordering and take the first candidate.
//! Tier 3 picks the first candidate whose artist contains, or is contained
//! in, the queried artist (case-insensitive), else the first candidate.
//!
//! With `prefer_synced`, a plain-only match is kept as that tier's fallback
//! while later tiers are tried for synced lyrics. When every tier is
//! exhausted the earliest fallback is returned.
//!
//! Transport failures abort the call. An empty answer is not an error.

use lyrebird_domain::{LyricResult, LyricSearchOptions, TrackMetadata};
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::client::{LyricsQuery, LyricsTransport};
use crate::error::{LyricsError, Result};
use crate::fields::{first_text, map_candidate, ARTIST_KEYS};
use crate::response::{CandidateSet, RawCandidate};

/// Search strategy, in the order they are attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SearchTier {
    ExactSignature,
    ArtistTitle,
    TitleOnly,
}

impl std::fmt::Display for SearchTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchTier::ExactSignature => write!(f, "Exact Signature"),
            SearchTier::ArtistTitle => write!(f, "Artist + Title"),
            SearchTier::TitleOnly => write!(f, "Title Only"),
        }
    }
}

impl SearchTier {
    /// Tiers permitted by `options`, in attempt order.
    pub fn enabled(options: LyricSearchOptions) -> Vec<SearchTier> {
        let mut tiers = vec![SearchTier::ExactSignature, SearchTier::ArtistTitle];
        if options.allow_title_only_search {
            tiers.push(SearchTier::TitleOnly);
        }
        tiers
    }

    pub fn query(&self, metadata: &TrackMetadata) -> LyricsQuery {
        let query = LyricsQuery::new(metadata.title.clone());
        match self {
            SearchTier::ExactSignature => query
                .artist(metadata.artist.clone())
                .album(metadata.album_name())
                .duration(metadata.duration_secs()),
            SearchTier::ArtistTitle => query.artist(metadata.artist.clone()),
            SearchTier::TitleOnly => query,
        }
    }

    fn select<'a>(&self, candidates: &'a CandidateSet, artist: &str) -> Option<&'a RawCandidate> {
        match self {
            SearchTier::ExactSignature | SearchTier::ArtistTitle => candidates.first(),
            SearchTier::TitleOnly => select_by_artist(candidates, artist),
        }
    }
}

/// First candidate whose artist overlaps the queried artist by
/// case-insensitive substring containment in either direction, else the
/// first candidate. Candidates without an artist never count as overlapping.
pub fn select_by_artist<'a>(candidates: &'a CandidateSet, artist: &str) -> Option<&'a RawCandidate> {
    let wanted = artist.to_lowercase();
    candidates
        .iter()
        .find(|candidate| {
            first_text(candidate, ARTIST_KEYS)
                .map(|name| name.to_lowercase())
                .is_some_and(|name| name.contains(&wanted) || wanted.contains(&name))
        })
        .or_else(|| candidates.first())
}

/// A resolved match together with how it was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLyrics {
    pub result: LyricResult,
    pub tier: SearchTier,
    /// `true` when this is a retained plain-lyrics fallback.
    pub fallback: bool,
}

/// Plain-lyrics matches retained while looser tiers are searched for synced
/// lyrics. Holds at most one entry per tier, in tier order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TierFallbacks {
    retained: Vec<(SearchTier, LyricResult)>,
}

impl TierFallbacks {
    pub fn record(mut self, tier: SearchTier, result: LyricResult) -> Self {
        if !self.retained.iter().any(|(retained, _)| *retained == tier) {
            self.retained.push((tier, result));
            self.retained.sort_by_key(|(tier, _)| *tier);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.retained.is_empty()
    }

    /// Earliest-tier fallback.
    pub fn into_best(self) -> Option<ResolvedLyrics> {
        self.retained
            .into_iter()
            .next()
            .map(|(tier, result)| ResolvedLyrics {
                result,
                tier,
                fallback: true,
            })
    }
}

/// Resolves lyrics for a track through the tiered search policy.
///
/// Holds no per-call state; one resolver can serve many concurrent calls.
#[derive(Clone)]
pub struct LyricsResolver {
    transport: Arc<dyn LyricsTransport>,
}

impl LyricsResolver {
    pub fn new(transport: Arc<dyn LyricsTransport>) -> Self {
        Self { transport }
    }

    /// Resolve lyrics for `metadata`. `Ok(None)` means no tier produced a
    /// usable candidate.
    pub async fn resolve(
        &self,
        metadata: &TrackMetadata,
        options: LyricSearchOptions,
    ) -> Result<Option<LyricResult>> {
        Ok(self
            .resolve_detailed(metadata, options)
            .await?
            .map(|resolved| resolved.result))
    }

    /// Like [`resolve`](Self::resolve), but also reports the winning tier.
    #[instrument(
        skip(self, metadata),
        fields(artist = %metadata.artist, title = %metadata.title)
    )]
    pub async fn resolve_detailed(
        &self,
        metadata: &TrackMetadata,
        options: LyricSearchOptions,
    ) -> Result<Option<ResolvedLyrics>> {
        let mut fallbacks = TierFallbacks::default();

        for tier in SearchTier::enabled(options) {
            let Some(result) = self.search_tier(tier, metadata).await? else {
                debug!(target: "resolver", %tier, "no usable candidate");
                continue;
            };

            if !options.prefer_synced || result.is_preferred() {
                info!(
                    target: "resolver",
                    %tier,
                    kind = ?result.kind(),
                    "lyrics resolved"
                );
                return Ok(Some(ResolvedLyrics {
                    result,
                    tier,
                    fallback: false,
                }));
            }

            debug!(
                target: "resolver",
                %tier,
                "plain lyrics only, retaining as fallback and searching further"
            );
            fallbacks = fallbacks.record(tier, result);
        }

        let best = fallbacks.into_best();
        match &best {
            Some(resolved) => info!(
                target: "resolver",
                tier = %resolved.tier,
                "no synced lyrics found, using plain lyrics fallback"
            ),
            None => debug!(target: "resolver", "no lyrics found in any tier"),
        }
        Ok(best)
    }

    /// Issue one tier query and pick that tier's candidate, if any.
    async fn search_tier(
        &self,
        tier: SearchTier,
        metadata: &TrackMetadata,
    ) -> Result<Option<LyricResult>> {
        let query = tier.query(metadata);
        let body = self
            .transport
            .search(&query)
            .await
            .map_err(|source| LyricsError::fetch(&metadata.artist, &metadata.title, source))?;

        let candidates = CandidateSet::from_value(body);
        debug!(target: "resolver", %tier, count = candidates.len(), "candidates received");

        let Some(candidate) = tier.select(&candidates, &metadata.artist) else {
            return Ok(None);
        };

        let mapped = map_candidate(candidate, metadata);
        if mapped.is_none() {
            debug!(target: "resolver", %tier, "discarding candidate without lyrics");
        }
        Ok(mapped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lyrebird_domain::LyricSource;
    use serde_json::json;

    fn plain(title: &str) -> LyricResult {
        LyricResult {
            artist: "Artist".into(),
            title: title.into(),
            album: None,
            synced_lyrics: None,
            plain_lyrics: Some("words".into()),
            source: LyricSource::Lrclib,
            instrumental: false,
        }
    }

    #[test]
    fn tier_order_and_title_only_gate() {
        let default = SearchTier::enabled(LyricSearchOptions::default());
        assert_eq!(default, vec![SearchTier::ExactSignature, SearchTier::ArtistTitle]);

        let all = SearchTier::enabled(LyricSearchOptions {
            allow_title_only_search: true,
            prefer_synced: true,
        });
        assert_eq!(
            all,
            vec![SearchTier::ExactSignature, SearchTier::ArtistTitle, SearchTier::TitleOnly]
        );
    }

    #[test]
    fn tier_queries_narrow_parameters() {
        let metadata = TrackMetadata::new("Björk", "Hyperballad", "/m/h.flac")
            .with_album("Post")
            .with_duration(321.4);

        let exact = SearchTier::ExactSignature.query(&metadata);
        assert_eq!(exact.artist_name.as_deref(), Some("Björk"));
        assert_eq!(exact.album_name.as_deref(), Some("Post"));
        assert_eq!(exact.duration, Some(321));

        let artist_title = SearchTier::ArtistTitle.query(&metadata);
        assert_eq!(artist_title.artist_name.as_deref(), Some("Björk"));
        assert_eq!(artist_title.album_name, None);
        assert_eq!(artist_title.duration, None);

        let title_only = SearchTier::TitleOnly.query(&metadata);
        assert_eq!(title_only.artist_name, None);
        assert_eq!(title_only.track_name, "Hyperballad");
    }

    #[test]
    fn select_by_artist_uses_bidirectional_containment() {
        let candidates = CandidateSet::from_value(json!([
            { "artistName": "The Beatles" },
            { "artistName": "Beatles" }
        ]));
        let picked = select_by_artist(&candidates, "Beatles").unwrap();
        assert_eq!(picked["artistName"], "The Beatles");

        let candidates = CandidateSet::from_value(json!([
            { "artistName": "Someone Else" },
            { "artistName": "Art" }
        ]));
        let picked = select_by_artist(&candidates, "arthur").unwrap();
        assert_eq!(picked["artistName"], "Art");
    }

    #[test]
    fn select_by_artist_falls_back_to_first() {
        let candidates = CandidateSet::from_value(json!([
            { "artistName": "Nobody" },
            { "artist_name": "Somebody" }
        ]));
        let picked = select_by_artist(&candidates, "Radiohead").unwrap();
        assert_eq!(picked["artistName"], "Nobody");
        assert!(select_by_artist(&CandidateSet::default(), "Radiohead").is_none());
    }

    #[test]
    fn select_by_artist_skips_candidates_without_artist() {
        let candidates = CandidateSet::from_value(json!([
            { "trackName": "No artist here" },
            { "artist_name": "radiohead" }
        ]));
        let picked = select_by_artist(&candidates, "Radiohead").unwrap();
        assert_eq!(picked["artist_name"], "radiohead");
    }

    #[test]
    fn fallbacks_keep_one_per_tier_and_return_earliest() {
        let fallbacks = TierFallbacks::default()
            .record(SearchTier::ArtistTitle, plain("second"))
            .record(SearchTier::ExactSignature, plain("first"))
            .record(SearchTier::ExactSignature, plain("ignored"));

        let best = fallbacks.into_best().unwrap();
        assert_eq!(best.tier, SearchTier::ExactSignature);
        assert_eq!(best.result.title, "first");
        assert!(best.fallback);
        assert!(TierFallbacks::default().into_best().is_none());
    }

    #[test]
    fn tier_display_formatting() {
        assert_eq!(SearchTier::ExactSignature.to_string(), "Exact Signature");
        assert_eq!(SearchTier::ArtistTitle.to_string(), "Artist + Title");
        assert_eq!(SearchTier::TitleOnly.to_string(), "Title Only");
    }
}
