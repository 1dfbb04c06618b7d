//! In-memory store with absolute per-entry expiry
//!
//! Provides the `ExpiringStore` trait the aggregation layer talks to, and
//! `MemoryStore`, a thread-safe `HashMap` backed implementation.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Errors that can occur when talking to a store
#[derive(Debug, Error)]
pub enum CacheError {
    /// The store cannot serve requests
    #[error("Cache unavailable: {0}")]
    Unavailable(String),
}

/// A key/value store where every entry carries an absolute expiration.
///
/// Implementations must be safe to share between concurrently running
/// tasks. A read racing a write for the same key returns either the old or
/// the new value, never a partial one.
pub trait ExpiringStore<K, V>: Send + Sync {
    /// Returns the stored value, or `None` if the key was never set or has
    /// expired as of this call.
    fn try_get(&self, key: &K) -> Result<Option<V>, CacheError>;

    /// Stores `value` under `key`, expiring `ttl` from now. Overwrites any
    /// prior entry for the key.
    fn set(&self, key: K, value: V, ttl: Duration) -> Result<(), CacheError>;

    /// Drops expired entries, returning how many were removed.
    fn purge_expired(&self) -> usize {
        0
    }
}

/// Wrapper struct for a stored value
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    /// The cached value
    value: V,
    /// When the entry stops being served
    expires_at: Instant,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Thread-safe in-memory expiring store
///
/// Lookups clone the value out under a read lock, so callers never hold a
/// lock across an await point.
#[derive(Debug)]
pub struct MemoryStore<K, V> {
    entries: RwLock<HashMap<K, CacheEntry<V>>>,
}

impl<K, V> MemoryStore<K, V>
where
    K: Eq + Hash,
{
    /// Creates an empty store
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Returns when the entry for `key` expires, if it is present and fresh
    pub fn expires_at(&self, key: &K) -> Option<Instant> {
        let now = Instant::now();
        self.entries
            .read()
            .get(key)
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| entry.expires_at)
    }

    /// Returns whether a fresh entry exists for `key`
    pub fn contains(&self, key: &K) -> bool {
        self.expires_at(key).is_some()
    }

    /// Returns the number of entries held, expired or not
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if the store holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl<K, V> Default for MemoryStore<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> ExpiringStore<K, V> for MemoryStore<K, V>
where
    K: Eq + Hash + Send + Sync,
    V: Clone + Send + Sync,
{
    fn try_get(&self, key: &K) -> Result<Option<V>, CacheError> {
        let now = Instant::now();
        let entries = self.entries.read();
        Ok(entries
            .get(key)
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| entry.value.clone()))
    }

    fn set(&self, key: K, value: V, ttl: Duration) -> Result<(), CacheError> {
        let expires_at = Instant::now() + ttl;
        self.entries
            .write()
            .insert(key, CacheEntry { value, expires_at });
        Ok(())
    }

    fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        before - entries.len()
    }
}
