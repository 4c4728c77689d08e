use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::config::Config;
use crate::error::{DetailError, SearchError};

pub const OMDB_BASE: &str = "https://www.omdbapi.com/";
/// OMDb's marker for a field it has no value for.
pub const NOT_AVAILABLE: &str = "N/A";
pub const POSTER_PLACEHOLDER: &str = "https://via.placeholder.com/300x450";
const MISSING_TEXT: &str = "Not available";

#[async_trait]
pub trait OmdbApi: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<MovieSummary>, SearchError>;
    async fn fetch_detail(&self, imdb_id: &str) -> Result<MovieDetail, DetailError>;
}

/// One entry of a title search. Field names follow the OMDb wire format, which
/// is also the on-disk format of the favorites file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieSummary {
    #[serde(rename = "imdbID")]
    pub imdb_id: String,
    #[serde(rename = "Title", default = "not_available")]
    pub title: String,
    #[serde(rename = "Year", default = "not_available")]
    pub year: String,
    #[serde(rename = "Poster", default = "not_available")]
    pub poster: String,
}

impl MovieSummary {
    pub fn poster_url(&self) -> &str {
        poster_or_placeholder(&self.poster)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieDetail {
    #[serde(flatten)]
    pub summary: MovieSummary,
    #[serde(rename = "Genre", default = "not_available")]
    pub genre: String,
    #[serde(rename = "Director", default = "not_available")]
    pub director: String,
    #[serde(rename = "Actors", default = "not_available")]
    pub actors: String,
    #[serde(rename = "Plot", default = "not_available")]
    pub plot: String,
}

impl MovieDetail {
    pub fn imdb_id(&self) -> &str {
        &self.summary.imdb_id
    }

    pub fn summary(&self) -> MovieSummary {
        self.summary.clone()
    }
}

fn not_available() -> String {
    NOT_AVAILABLE.to_string()
}

pub fn is_available(value: &str) -> bool {
    let v = value.trim();
    !v.is_empty() && v != NOT_AVAILABLE
}

pub fn display_text(value: &str) -> &str {
    if is_available(value) {
        value
    } else {
        MISSING_TEXT
    }
}

pub fn poster_or_placeholder(poster: &str) -> &str {
    if is_available(poster) {
        poster
    } else {
        POSTER_PLACEHOLDER
    }
}

/// Trims the query and rejects blank input before anything goes on the wire.
pub fn normalize_query(query: &str) -> Result<&str, SearchError> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Err(SearchError::EmptyQuery);
    }
    Ok(trimmed)
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "Response")]
    response: String,
    #[serde(rename = "Error")]
    error: Option<String>,
}

impl Envelope {
    fn succeeded(&self) -> bool {
        self.response.eq_ignore_ascii_case("true")
    }

    fn error_message(self) -> String {
        self.error
            .unwrap_or_else(|| "OMDb reported failure without a message".to_string())
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(rename = "Search", default)]
    search: Vec<MovieSummary>,
}

pub fn parse_search(body: &str) -> Result<Vec<MovieSummary>, SearchError> {
    let envelope: Envelope = serde_json::from_str(body)
        .context("Failed to parse OMDb search JSON")
        .map_err(SearchError::Transport)?;
    if !envelope.succeeded() {
        return Err(SearchError::NoResults {
            message: envelope.error_message(),
        });
    }
    let parsed: SearchResponse = serde_json::from_str(body)
        .context("Failed to parse OMDb search results")
        .map_err(SearchError::Transport)?;
    if parsed.search.is_empty() {
        return Err(SearchError::NoResults {
            message: "OMDb returned no titles".to_string(),
        });
    }
    Ok(parsed.search)
}

pub fn parse_detail(body: &str) -> Result<MovieDetail, DetailError> {
    let envelope: Envelope = serde_json::from_str(body)
        .context("Failed to parse OMDb detail JSON")
        .map_err(DetailError::Transport)?;
    if !envelope.succeeded() {
        return Err(DetailError::NotFound {
            message: envelope.error_message(),
        });
    }
    serde_json::from_str(body)
        .context("Failed to parse OMDb detail record")
        .map_err(DetailError::Transport)
}

#[derive(Debug, Clone)]
pub struct OmdbClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl OmdbClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        let user_agent = format!("cinesearch/{}", env!("CARGO_PKG_VERSION"));
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(30))
            .user_agent(user_agent)
            .build()
            .context("Failed to build OMDb HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.omdb_base_url.clone(), config.omdb_api_key.clone())
    }

    /// Issues `GET {base}?{param}={value}&apikey=…` and returns the raw body.
    ///
    /// Errors never carry the request URL, since it contains the API key.
    async fn get_text(&self, param: &str, value: &str) -> Result<String> {
        let res = self
            .client
            .get(&self.base_url)
            .query(&[(param, value), ("apikey", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| e.without_url())
            .context("OMDb request failed")?;
        let status = res.status();
        let text = res
            .text()
            .await
            .map_err(|e| e.without_url())
            .context("Failed to read OMDb body")?;
        if !status.is_success() {
            return Err(anyhow!("OMDb HTTP error (status {}): {}", status, text));
        }
        Ok(text)
    }
}

#[async_trait]
impl OmdbApi for OmdbClient {
    async fn search(&self, query: &str) -> Result<Vec<MovieSummary>, SearchError> {
        let query = normalize_query(query)?;
        debug!(query = %query, "OMDb search");
        let body = self
            .get_text("s", query)
            .await
            .map_err(SearchError::Transport)?;
        parse_search(&body)
    }

    async fn fetch_detail(&self, imdb_id: &str) -> Result<MovieDetail, DetailError> {
        let imdb_id = imdb_id.trim();
        if imdb_id.is_empty() {
            return Err(DetailError::MissingId);
        }
        debug!(imdb_id = %imdb_id, "OMDb detail lookup");
        let body = self
            .get_text("i", imdb_id)
            .await
            .map_err(DetailError::Transport)?;
        parse_detail(&body)
    }
}
