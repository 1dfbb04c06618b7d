//! Test doubles shared by the unit tests

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::cache::{CacheError, ExpiringStore};
use crate::data::{FeedClient, FeedError, Item, ItemId};

type DelayFn = Box<dyn Fn(ItemId) -> Duration + Send + Sync>;

/// In-memory feed that records every call made to it
pub struct StubFeed {
    ids: Vec<ItemId>,
    items: HashMap<ItemId, Item>,
    fail_top_ids: bool,
    failing_item: Option<ItemId>,
    panicking_item: Option<ItemId>,
    delay: Option<DelayFn>,
    top_id_calls: AtomicUsize,
    fetched: Mutex<Vec<ItemId>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl StubFeed {
    pub fn new(ids: Vec<ItemId>) -> Self {
        Self {
            ids,
            items: HashMap::new(),
            fail_top_ids: false,
            failing_item: None,
            panicking_item: None,
            delay: None,
            top_id_calls: AtomicUsize::new(0),
            fetched: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
        }
    }

    /// Makes the given ids resolvable, titled "Story {id}"
    pub fn with_items(mut self, ids: impl IntoIterator<Item = ItemId>) -> Self {
        for id in ids {
            self.items.insert(id, Item::new(id, format!("Story {}", id)));
        }
        self
    }

    pub fn failing_top_ids(mut self) -> Self {
        self.fail_top_ids = true;
        self
    }

    pub fn failing_item(mut self, id: ItemId) -> Self {
        self.failing_item = Some(id);
        self
    }

    pub fn panicking_item(mut self, id: ItemId) -> Self {
        self.panicking_item = Some(id);
        self
    }

    pub fn with_delay_fn(mut self, delay: impl Fn(ItemId) -> Duration + Send + Sync + 'static) -> Self {
        self.delay = Some(Box::new(delay));
        self
    }

    pub fn top_id_calls(&self) -> usize {
        self.top_id_calls.load(Ordering::SeqCst)
    }

    /// Ids passed to `fetch_item`, in call order
    pub fn fetched_items(&self) -> Vec<ItemId> {
        self.fetched.lock().clone()
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FeedClient for StubFeed {
    async fn fetch_top_ids(&self) -> Result<Vec<ItemId>, FeedError> {
        self.top_id_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_top_ids {
            return Err(FeedError::Unexpected("top ids unavailable".to_string()));
        }
        Ok(self.ids.clone())
    }

    async fn fetch_item(&self, id: ItemId) -> Result<Option<Item>, FeedError> {
        self.fetched.lock().push(id);
        if self.panicking_item == Some(id) {
            panic!("stub feed panicked on {}", id);
        }

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = &self.delay {
            tokio::time::sleep(delay(id)).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing_item == Some(id) {
            return Err(FeedError::Unexpected(format!("item {} unavailable", id)));
        }
        Ok(self.items.get(&id).cloned())
    }
}

/// Store that rejects every operation
pub struct FailingStore;

impl<K, V> ExpiringStore<K, V> for FailingStore {
    fn try_get(&self, _key: &K) -> Result<Option<V>, CacheError> {
        Err(CacheError::Unavailable("store offline".to_string()))
    }

    fn set(&self, _key: K, _value: V, _ttl: Duration) -> Result<(), CacheError> {
        Err(CacheError::Unavailable("store offline".to_string()))
    }
}
