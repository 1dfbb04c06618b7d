//! Core data models for hnfeed
//!
//! This module contains the item record produced by the feed, along with the
//! client used to fetch ranked identifiers and item details from upstream.

pub mod client;

pub use client::{ClientConfig, FeedClient, FeedError, HackerNewsClient, DEFAULT_BASE_URL};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of an upstream item
pub type ItemId = u64;

/// A story (or other item) from the upstream feed
///
/// Only `id` is guaranteed by the upstream API; every other attribute is
/// defaulted when missing so that sparse records (jobs, polls, dead items)
/// still decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Unique identifier of the item
    pub id: ItemId,
    /// Headline of the item
    #[serde(default)]
    pub title: String,
    /// Link the item points at, absent for text posts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Username of the submitter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub by: Option<String>,
    /// Points the item has collected
    #[serde(default)]
    pub score: i64,
    /// Creation time in Unix seconds
    #[serde(default)]
    pub time: i64,
    /// Total comment count
    #[serde(default)]
    pub descendants: u64,
    /// Item type ("story", "job", "poll", ...)
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Ids of direct child comments, in ranked order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub kids: Vec<ItemId>,
}

impl Item {
    /// Creates an item with only an id and title set
    pub fn new(id: ItemId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            url: None,
            by: None,
            score: 0,
            time: 0,
            descendants: 0,
            kind: None,
            kids: Vec::new(),
        }
    }

    /// Returns the creation time, if the upstream supplied one
    pub fn posted_at(&self) -> Option<DateTime<Utc>> {
        if self.time <= 0 {
            return None;
        }
        DateTime::from_timestamp(self.time, 0)
    }

    /// Returns the host of the item's link, without a leading "www."
    pub fn domain(&self) -> Option<String> {
        let url = reqwest::Url::parse(self.url.as_deref()?).ok()?;
        let host = url.host_str()?;
        Some(host.strip_prefix("www.").unwrap_or(host).to_string())
    }
}

/// Renders the age of a timestamp relative to `now` ("3 hours ago")
pub fn format_age(posted_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(posted_at);
    let (amount, unit) = if elapsed.num_days() > 0 {
        (elapsed.num_days(), "day")
    } else if elapsed.num_hours() > 0 {
        (elapsed.num_hours(), "hour")
    } else if elapsed.num_minutes() > 0 {
        (elapsed.num_minutes(), "minute")
    } else {
        return "just now".to_string();
    };

    if amount == 1 {
        format!("1 {} ago", unit)
    } else {
        format!("{} {}s ago", amount, unit)
    }
}
