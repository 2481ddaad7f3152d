// SPDX-License-Identifier: GPL-3.0-or-later

//! LRCLIB lyrics lookup and tiered match resolution.
//!
//! [`LrclibClient`] is the HTTP transport; [`LyricsResolver`] decides which
//! of the returned candidates, if any, best fits a track.

pub mod client;
pub mod error;
pub mod fields;
pub mod resolver;
pub mod response;

pub use client::{LrclibClient, LrclibClientBuilder, LyricsQuery, LyricsTransport, USER_AGENT};
pub use error::{LyricsError, Result, TransportError};
pub use resolver::{LyricsResolver, ResolvedLyrics, SearchTier, TierFallbacks};
pub use response::{CandidateSet, RawCandidate};
