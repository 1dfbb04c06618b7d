//! Pagination of the aggregated top stories

use serde::Serialize;

use crate::data::Item;

/// Default number of items per page
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// A zero-based page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// Index of the page, starting at 0
    pub page: usize,
    /// Number of items per page
    pub page_size: usize,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Index of the first item on this page
    pub fn offset(&self) -> usize {
        self.page.saturating_mul(self.page_size)
    }
}

/// One page of items plus the size of the whole result
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    /// Items on this page, in ranking order
    pub items: Vec<Item>,
    /// Number of items across all pages
    pub total_count: usize,
}

impl Page {
    /// Rank (1-based) of the first item on this page within the whole result
    pub fn first_rank(&self, request: &PageRequest) -> usize {
        request.offset().saturating_add(1)
    }
}

/// Slices `items` down to the requested page
///
/// Pages past the end are empty but still report the full `total_count`.
pub fn paginate(items: Vec<Item>, request: &PageRequest) -> Page {
    let total_count = items.len();
    let items = items
        .into_iter()
        .skip(request.offset())
        .take(request.page_size)
        .collect();

    Page { items, total_count }
}
