// SPDX-License-Identifier: GPL-3.0-or-later

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, trace};

use crate::error::TransportError;

const LRCLIB_API_BASE: &str = "https://lrclib.net/api";
pub const USER_AGENT: &str = concat!(
    "Lyrebird/",
    env!("CARGO_PKG_VERSION"),
    " ( https://github.com/SvetaKrava/lyrebird )"
);

/// Structured parameters for one lookup against the search endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LyricsQuery {
    pub artist_name: Option<String>,
    pub track_name: String,
    pub album_name: Option<String>,
    pub duration: Option<u64>,
}

impl LyricsQuery {
    pub fn new(track_name: impl Into<String>) -> Self {
        Self {
            track_name: track_name.into(),
            ..Self::default()
        }
    }

    pub fn artist(mut self, artist_name: impl Into<String>) -> Self {
        self.artist_name = Some(artist_name.into());
        self
    }

    pub fn album(mut self, album_name: Option<&str>) -> Self {
        self.album_name = album_name.map(str::to_string);
        self
    }

    pub fn duration(mut self, seconds: Option<u64>) -> Self {
        self.duration = seconds;
        self
    }

    /// Query-string pairs in a stable order, omitting absent values.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::with_capacity(4);
        if let Some(artist) = &self.artist_name {
            params.push(("artist_name", artist.clone()));
        }
        params.push(("track_name", self.track_name.clone()));
        if let Some(album) = &self.album_name {
            params.push(("album_name", album.clone()));
        }
        if let Some(duration) = self.duration {
            params.push(("duration", duration.to_string()));
        }
        params
    }
}

/// Read-only access to a lyrics lookup service.
///
/// Implementations return the decoded response body untouched: an array, a
/// single object or `Value::Null`. Shape handling belongs to the caller.
#[async_trait]
pub trait LyricsTransport: Send + Sync {
    async fn search(&self, query: &LyricsQuery) -> Result<Value, TransportError>;
}

/// HTTP client for the LRCLIB search endpoint.
#[derive(Debug, Clone)]
pub struct LrclibClient {
    client: Client,
    base_url: String,
}

impl LrclibClient {
    pub fn new() -> Result<Self, TransportError> {
        Self::builder().build()
    }

    pub fn builder() -> LrclibClientBuilder {
        LrclibClientBuilder::default()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn search_url(&self) -> Result<Url, TransportError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|source| TransportError::InvalidBaseUrl(source.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| TransportError::InvalidBaseUrl(self.base_url.clone()))?
            .pop_if_empty()
            .push("search");
        Ok(url)
    }
}

#[async_trait]
impl LyricsTransport for LrclibClient {
    async fn search(&self, query: &LyricsQuery) -> Result<Value, TransportError> {
        let url = self.search_url()?;
        let params = query.to_params();

        debug!(target: "lyrics", url = %url, ?params, "querying lyrics service");

        let response = self.client.get(url).query(&params).send().await?;
        let status = response.status();
        let body = response.text().await?;
        trace!(target: "lyrics", %status, body_len = body.len(), "lyrics service responded");

        parse_search_body(status, &body)
    }
}

fn parse_search_body(status: StatusCode, body: &str) -> Result<Value, TransportError> {
    if !status.is_success() {
        return Err(TransportError::HttpStatus {
            status,
            body: body.to_string(),
        });
    }

    if body.trim().is_empty() {
        return Ok(Value::Null);
    }

    Ok(serde_json::from_str(body)?)
}

/// Builder for configuring an LRCLIB client.
#[derive(Debug)]
pub struct LrclibClientBuilder {
    base_url: String,
    user_agent: String,
    timeout: Duration,
}

impl Default for LrclibClientBuilder {
    fn default() -> Self {
        Self {
            base_url: LRCLIB_API_BASE.to_string(),
            user_agent: USER_AGENT.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl LrclibClientBuilder {
    /// Set a custom base URL (useful for testing with mock servers).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> Result<LrclibClient, TransportError> {
        Url::parse(&self.base_url)
            .map_err(|source| TransportError::InvalidBaseUrl(source.to_string()))?;

        let client = Client::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent)
            .build()?;

        Ok(LrclibClient {
            client,
            base_url: self.base_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_omit_missing_fields() {
        let query = LyricsQuery::new("Yesterday");
        assert_eq!(query.to_params(), vec![("track_name", "Yesterday".to_string())]);

        let query = LyricsQuery::new("Yesterday")
            .artist("The Beatles")
            .album(Some("Help!"))
            .duration(Some(125));
        assert_eq!(
            query.to_params(),
            vec![
                ("artist_name", "The Beatles".to_string()),
                ("track_name", "Yesterday".to_string()),
                ("album_name", "Help!".to_string()),
                ("duration", "125".to_string()),
            ]
        );
    }

    #[test]
    fn search_url_appends_segment() {
        let client = LrclibClient::builder()
            .base_url("http://localhost:8080/api/")
            .build()
            .unwrap();
        assert_eq!(
            client.search_url().unwrap().as_str(),
            "http://localhost:8080/api/search"
        );
    }

    #[test]
    fn builder_rejects_invalid_base_url() {
        let result = LrclibClient::builder().base_url("not a url").build();
        assert!(matches!(result, Err(TransportError::InvalidBaseUrl(_))));
    }

    #[test]
    fn empty_body_is_null() {
        assert_eq!(parse_search_body(StatusCode::OK, "  ").unwrap(), Value::Null);
        assert_eq!(parse_search_body(StatusCode::OK, "null").unwrap(), Value::Null);
    }

    #[test]
    fn non_success_status_is_error() {
        let err = parse_search_body(StatusCode::INTERNAL_SERVER_ERROR, "boom").unwrap_err();
        assert!(matches!(
            err,
            TransportError::HttpStatus { status, ref body }
                if status == StatusCode::INTERNAL_SERVER_ERROR && body == "boom"
        ));
    }

    #[test]
    fn default_user_agent_names_application() {
        assert!(USER_AGENT.starts_with("Lyrebird/"));
        assert!(USER_AGENT.contains("https://"));
    }
}
