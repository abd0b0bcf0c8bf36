//! YouTube Music search client.
//!
//! This module talks to the web client's search endpoint
//! (music.youtube.com/youtubei/v1/search). No authentication is required.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, error};

use crate::converters;
use crate::error::{Error, Result};
use crate::models::{SearchPage, Track};

/// Base URL for the music web client API.
const API_BASE_URL: &str = "https://music.youtube.com/youtubei/v1/";

/// Search params restricting results to songs.
const SONGS_FILTER_PARAMS: &str = "EgWKAQIIAWoMEA4QChADEAQQCRAF";

/// Client identity sent in the request context.
const CLIENT_NAME: &str = "WEB_REMIX";
const CLIENT_VERSION: &str = "1.20240918.01.00";

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/128.0.0.0 Safari/537.36";

/// YouTube Music search client.
///
/// # Example
///
/// ```rust,no_run
/// use ytm_dl::MusicApi;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let api = MusicApi::new()?;
///     let page = api.search_songs("Daft Punk").await?;
///     for track in &page.tracks {
///         println!("{} - {}", track.primary_artist(), track.title);
///     }
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct MusicApi {
    client: Client,
    base_url: String,
}

impl MusicApi {
    /// Create a client for the public endpoint.
    pub fn new() -> Result<Self> {
        Self::with_base_url(API_BASE_URL)
    }

    /// Create a client for another base URL (a mirror or a mock server).
    pub fn with_base_url<S: Into<String>>(base_url: S) -> Result<Self> {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        let client = Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Self { client, base_url })
    }

    /// Request context identifying the web client.
    fn context() -> Value {
        json!({
            "client": {
                "clientName": CLIENT_NAME,
                "clientVersion": CLIENT_VERSION,
                "hl": "en",
                "gl": "US"
            }
        })
    }

    /// Make a POST request to the API.
    async fn post_api(&self, endpoint: &str, params: &[(&str, &str)], body: Value) -> Result<Value> {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!("POST {} with params: {:?}", url, params);

        let response = self
            .client
            .post(&url)
            .query(&[("prettyPrint", "false")])
            .query(params)
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;
        let data: Value = match serde_json::from_str(&text) {
            Ok(data) => data,
            Err(_) if !status.is_success() => {
                error!("Music API returned {} with a non-JSON body", status);
                return Err(Error::ApiError(format!("HTTP {}", status)));
            }
            Err(e) => return Err(e.into()),
        };

        if let Some(error) = data.get("error") {
            let error_msg = error
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("Unknown error");
            error!("Music API error ({}): {}", status, error_msg);
            return Err(Error::ApiError(error_msg.to_string()));
        }
        if !status.is_success() {
            return Err(Error::ApiError(format!("HTTP {}", status)));
        }

        Ok(data)
    }

    /// Fetch the first page of song results for a query.
    pub async fn search_songs(&self, query: &str) -> Result<SearchPage> {
        let body = json!({
            "context": Self::context(),
            "query": query,
            "params": SONGS_FILTER_PARAMS,
        });
        let response = self.post_api("search", &[], body).await?;
        converters::parse_search_page(&response)
    }

    /// Fetch the page following a continuation token.
    pub async fn search_continuation(&self, token: &str) -> Result<SearchPage> {
        let body = json!({ "context": Self::context() });
        let response = self
            .post_api(
                "search",
                &[("ctoken", token), ("continuation", token), ("type", "next")],
                body,
            )
            .await?;
        Ok(converters::parse_continuation_page(&response))
    }

    /// Start a paginated song search.
    pub fn search_tracks(&self, query: &str) -> TrackSearch {
        TrackSearch {
            api: self.clone(),
            query: query.to_string(),
            cursor: Cursor::Start,
        }
    }
}

/// Where a [`TrackSearch`] is in the result stream.
#[derive(Debug, Clone, PartialEq)]
enum Cursor {
    Start,
    Next(String),
    Done,
}

/// A running song search that yields one page at a time.
#[derive(Debug, Clone)]
pub struct TrackSearch {
    api: MusicApi,
    query: String,
    cursor: Cursor,
}

impl TrackSearch {
    /// The query this search was started with.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Fetch the next page.
    ///
    /// Returns `Ok(None)` once the catalog has no more pages. After an
    /// error the search is finished as well.
    pub async fn next_page(&mut self) -> Result<Option<Vec<Track>>> {
        let result = match &self.cursor {
            Cursor::Done => return Ok(None),
            Cursor::Start => self.api.search_songs(&self.query).await,
            Cursor::Next(token) => self.api.search_continuation(token).await,
        };

        match result {
            Ok(page) => {
                self.cursor = match page.continuation {
                    Some(token) => Cursor::Next(token),
                    None => Cursor::Done,
                };
                Ok(Some(page.tracks))
            }
            Err(e) => {
                self.cursor = Cursor::Done;
                Err(e)
            }
        }
    }
}

/// A paginated supply of tracks.
#[async_trait]
pub trait TrackSource: Send {
    /// Next page of tracks, or `None` when exhausted.
    async fn next_page(&mut self) -> Result<Option<Vec<Track>>>;
}

#[async_trait]
impl TrackSource for TrackSearch {
    async fn next_page(&mut self) -> Result<Option<Vec<Track>>> {
        TrackSearch::next_page(self).await
    }
}
