//! Cache-aside aggregation of the top stories feed
//!
//! `TopStories` answers "give me the current top items, fully resolved" by
//! reading the ranked id list and each item through the expiring stores,
//! falling back to the feed on a miss and writing what it fetched back into
//! the store. Item lookups run as concurrent tokio tasks and are fully joined
//! before the result is assembled.

use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::{debug, error, warn};

use crate::cache::{CacheError, ExpiringStore};
use crate::data::{FeedClient, FeedError, Item, ItemId};

/// Time-to-live for the cached id list in seconds
pub const IDS_CACHE_TTL_SECS: u64 = 60;

/// Time-to-live for cached items in seconds
pub const ITEM_CACHE_TTL_SECS: u64 = 5 * 60;

/// Number of ranked ids resolved per call
pub const MAX_TOP_ITEMS: usize = 200;

/// Key under which the ranked id list is cached
///
/// Items are keyed by `ItemId` in a separate store, so the two namespaces
/// cannot collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TopStoriesKey;

/// Store holding the ranked id list
pub type IdListStore = dyn ExpiringStore<TopStoriesKey, Vec<ItemId>>;

/// Store holding individual items
pub type ItemStore = dyn ExpiringStore<ItemId, Item>;

/// Failures that escape the collaborators' own error handling
#[derive(Debug, Error)]
pub enum AggregateError {
    /// A store refused a read or write
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    /// The feed reported a failure instead of absorbing it
    #[error("Feed error: {0}")]
    Feed(#[from] FeedError),

    /// A resolution task panicked or was cancelled
    #[error("Item resolution task failed: {0}")]
    TaskFailed(String),

    /// The fetch limiter was closed
    #[error("Fetch limiter closed")]
    LimiterClosed,
}

/// Tuning for the aggregation layer
#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    /// How long a fetched id list is served from cache
    pub ids_ttl: Duration,
    /// How long a fetched item is served from cache
    pub item_ttl: Duration,
    /// How many ranked ids are resolved per call, capped at `MAX_TOP_ITEMS`
    pub max_items: usize,
    /// Upper bound on simultaneous upstream item fetches within one call
    pub max_concurrency: usize,
    /// Whether an empty id list from upstream is cached like any other
    pub cache_empty_ids: bool,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            ids_ttl: Duration::from_secs(IDS_CACHE_TTL_SECS),
            item_ttl: Duration::from_secs(ITEM_CACHE_TTL_SECS),
            max_items: MAX_TOP_ITEMS,
            max_concurrency: MAX_TOP_ITEMS,
            cache_empty_ids: true,
        }
    }
}

/// Resolves one id through the item store, fetching on a miss
#[derive(Clone)]
struct ItemResolver {
    feed: Arc<dyn FeedClient>,
    store: Arc<ItemStore>,
    limiter: Arc<Semaphore>,
    ttl: Duration,
}

impl ItemResolver {
    async fn resolve(self, id: ItemId) -> Result<Option<Item>, AggregateError> {
        if let Some(item) = self.store.try_get(&id)? {
            return Ok(Some(item));
        }

        let fetched = {
            let _permit = self
                .limiter
                .acquire()
                .await
                .map_err(|_| AggregateError::LimiterClosed)?;
            self.feed.fetch_item(id).await?
        };

        if let Some(ref item) = fetched {
            self.store.set(id, item.clone(), self.ttl)?;
        }

        Ok(fetched)
    }
}

/// Cached, best-effort view of the top stories feed
pub struct TopStories {
    feed: Arc<dyn FeedClient>,
    id_store: Arc<IdListStore>,
    item_store: Arc<ItemStore>,
    config: AggregatorConfig,
}

impl TopStories {
    /// Creates an aggregator over the given feed and stores
    ///
    /// `max_items` above `MAX_TOP_ITEMS` is lowered to it.
    pub fn new(
        feed: Arc<dyn FeedClient>,
        id_store: Arc<IdListStore>,
        item_store: Arc<ItemStore>,
        mut config: AggregatorConfig,
    ) -> Self {
        if config.max_items > MAX_TOP_ITEMS {
            warn!(
                requested = config.max_items,
                cap = MAX_TOP_ITEMS,
                "max_items above cap, clamping"
            );
            config.max_items = MAX_TOP_ITEMS;
        }
        Self {
            feed,
            id_store,
            item_store,
            config,
        }
    }

    /// Returns the active configuration
    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    /// Returns the current top items, fully resolved, best effort.
    ///
    /// Items that could not be resolved are left out. Any failure not
    /// absorbed by the feed client is logged and yields an empty list, so an
    /// empty result does not by itself mean the feed is empty.
    pub async fn top_items(&self) -> Vec<Item> {
        match self.try_top_items().await {
            Ok(items) => items,
            Err(e) => {
                error!(error = %e, "failed to get top stories with caching");
                Vec::new()
            }
        }
    }

    /// Same as [`TopStories::top_items`], but reports aggregation failures
    pub async fn try_top_items(&self) -> Result<Vec<Item>, AggregateError> {
        let ids = self.top_ids().await?;
        let selected: Vec<ItemId> = ids.into_iter().take(self.config.max_items).collect();

        // Each call gets its own permits so overlapping calls do not throttle each other
        let permits = self.config.max_concurrency.clamp(1, Semaphore::MAX_PERMITS);
        let resolver = ItemResolver {
            feed: Arc::clone(&self.feed),
            store: Arc::clone(&self.item_store),
            limiter: Arc::new(Semaphore::new(permits)),
            ttl: self.config.item_ttl,
        };
        let handles: Vec<_> = selected
            .iter()
            .map(|&id| tokio::spawn(resolver.clone().resolve(id)))
            .collect();

        // join_all keeps the handles' order, which is the ranking order
        let results = join_all(handles).await;

        let mut items = Vec::with_capacity(results.len());
        for result in results {
            let resolved = result.map_err(|e| AggregateError::TaskFailed(e.to_string()))??;
            if let Some(item) = resolved {
                items.push(item);
            }
        }

        debug!(
            requested = selected.len(),
            resolved = items.len(),
            "resolved top stories"
        );
        Ok(items)
    }

    /// Drops expired entries from both stores, returning how many went
    pub fn purge_expired(&self) -> usize {
        self.id_store.purge_expired() + self.item_store.purge_expired()
    }

    /// Resolves the ranked id list through the id store
    async fn top_ids(&self) -> Result<Vec<ItemId>, AggregateError> {
        if let Some(ids) = self.id_store.try_get(&TopStoriesKey)? {
            debug!(count = ids.len(), "top story ids served from cache");
            return Ok(ids);
        }

        let ids = self.feed.fetch_top_ids().await?;

        if ids.is_empty() {
            if !self.config.cache_empty_ids {
                warn!("feed returned no top story ids, not caching");
                return Ok(ids);
            }
            warn!(
                ttl_secs = self.config.ids_ttl.as_secs(),
                "feed returned no top story ids, caching empty list"
            );
        }

        self.id_store
            .set(TopStoriesKey, ids.clone(), self.config.ids_ttl)?;
        Ok(ids)
    }
}
