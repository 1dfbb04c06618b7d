//! Cache module for holding feed responses in memory
//!
//! This module provides an expiring key/value store with per-entry TTL
//! (time-to-live) values. Entries past their expiry behave exactly like
//! entries that were never written. Nothing is persisted; the cache lives
//! and dies with the process.

mod store;

pub use store::{CacheError, ExpiringStore, MemoryStore};
