//! Hacker News API client
//!
//! This module fetches the ranked top-story identifiers and individual item
//! records from the Hacker News Firebase API. Transport and decoding failures
//! are logged and absorbed here: the rest of the crate only ever sees an empty
//! identifier list or an absent item.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use super::{Item, ItemId};

/// Base URL for the Hacker News API
pub const DEFAULT_BASE_URL: &str = "https://hacker-news.firebaseio.com/v0";

/// Default per-request timeout
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Errors that can occur when fetching from the feed
#[derive(Debug, Error)]
pub enum FeedError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Failed to parse JSON response
    #[error("Failed to parse JSON response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// A failure the client did not handle itself
    #[error("Unexpected feed failure: {0}")]
    Unexpected(String),
}

/// Source of ranked identifiers and item details.
///
/// Implementations are expected to absorb their own transport failures,
/// returning `Ok(vec![])` or `Ok(None)`. An `Err` is treated by callers as an
/// unexpected fault.
#[async_trait]
pub trait FeedClient: Send + Sync {
    /// Returns the current top identifiers in ranked order
    async fn fetch_top_ids(&self) -> Result<Vec<ItemId>, FeedError>;

    /// Returns the item with the given id, or `None` if upstream has none
    async fn fetch_item(&self, id: ItemId) -> Result<Option<Item>, FeedError>;
}

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API root, without a trailing slash
    pub base_url: String,
    /// Timeout applied to every request
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Client for fetching stories from the Hacker News API
#[derive(Debug, Clone)]
pub struct HackerNewsClient {
    client: Client,
    base_url: String,
}

impl HackerNewsClient {
    /// Create a new HackerNewsClient from the given configuration
    pub fn new(config: &ClientConfig) -> Result<Self, FeedError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self::with_client(client, config.base_url.clone()))
    }

    /// Create a new HackerNewsClient with a custom HTTP client
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    /// Returns the API root this client talks to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn top_stories_url(&self) -> String {
        format!("{}/topstories.json", self.base_url)
    }

    fn item_url(&self, id: ItemId) -> String {
        format!("{}/item/{}.json", self.base_url, id)
    }

    /// Fetch the ranked top-story identifiers, reporting any failure
    pub async fn request_top_ids(&self) -> Result<Vec<ItemId>, FeedError> {
        let response = self
            .client
            .get(self.top_stories_url())
            .send()
            .await?
            .error_for_status()?;
        let text = response.text().await?;
        let ids: Option<Vec<ItemId>> = serde_json::from_str(&text)?;

        Ok(ids.unwrap_or_default())
    }

    /// Fetch a single item, reporting any failure
    ///
    /// The API answers `null` for ids it does not know, which maps to `Ok(None)`.
    pub async fn request_item(&self, id: ItemId) -> Result<Option<Item>, FeedError> {
        let response = self
            .client
            .get(self.item_url(id))
            .send()
            .await?
            .error_for_status()?;
        let text = response.text().await?;

        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl FeedClient for HackerNewsClient {
    async fn fetch_top_ids(&self) -> Result<Vec<ItemId>, FeedError> {
        match self.request_top_ids().await {
            Ok(ids) => {
                debug!(count = ids.len(), "fetched top story ids");
                Ok(ids)
            }
            Err(e) => {
                warn!(error = %e, "error fetching top story ids");
                Ok(Vec::new())
            }
        }
    }

    async fn fetch_item(&self, id: ItemId) -> Result<Option<Item>, FeedError> {
        match self.request_item(id).await {
            Ok(item) => {
                if item.is_none() {
                    debug!(story_id = id, "upstream has no data for story");
                }
                Ok(item)
            }
            Err(e) => {
                warn!(story_id = id, error = %e, "error fetching story");
                Ok(None)
            }
        }
    }
}
