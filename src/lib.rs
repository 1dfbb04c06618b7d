//! hnfeed library
//!
//! A cache-aside view over the Hacker News top stories feed: ranked ids and
//! item details are served from an in-memory expiring store and refetched
//! from upstream when they expire.

pub mod aggregate;
pub mod cache;
pub mod cli;
pub mod data;
pub mod page;
pub mod refresh;

#[cfg(test)]
mod testing;

pub use aggregate::{AggregateError, AggregatorConfig, TopStories};
pub use data::{Item, ItemId};
