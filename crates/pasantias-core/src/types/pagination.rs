//! Pagination types shared by every list view.

use serde::{Deserialize, Serialize};

/// Smallest accepted page size.
pub const MIN_LIMIT: u32 = 5;
/// Largest accepted page size.
pub const MAX_LIMIT: u32 = 100;
/// Page size used when a view does not configure one.
pub const DEFAULT_LIMIT: u32 = 10;

/// Requested page position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Page number (1-based).
    #[serde(default = "default_page")]
    pub page: u32,
    /// Number of items per page.
    #[serde(default = "default_limit")]
    pub limit: u32,
}

impl PageRequest {
    /// Create a new page request, clamped into the accepted range.
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.clamp(MIN_LIMIT, MAX_LIMIT),
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// Normalized paginated list, independent of the server's envelope shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResponse<T> {
    /// The items on this page.
    pub items: Vec<T>,
    /// Total number of items across all pages.
    pub total: u64,
    /// Current page number (1-based).
    pub page: u32,
    /// Total number of pages (never below 1).
    pub total_pages: u32,
    /// Number of items per page.
    pub limit: u32,
}

impl<T> PageResponse<T> {
    /// Create a new paginated response, deriving `total_pages`.
    pub fn new(items: Vec<T>, page: u32, limit: u32, total: u64) -> Self {
        let limit = limit.max(1);
        let total_pages = total.div_ceil(u64::from(limit)).max(1);
        Self {
            items,
            total,
            page: page.max(1),
            total_pages: u32::try_from(total_pages).unwrap_or(u32::MAX),
            limit,
        }
    }

    /// Wrap a bare, unpaginated list: everything fits on one page.
    pub fn single_page(items: Vec<T>, limit: u32) -> Self {
        let total = items.len() as u64;
        Self {
            items,
            total,
            page: 1,
            total_pages: 1,
            limit: limit.max(1),
        }
    }

    /// Create an empty response for the given request.
    pub fn empty(request: &PageRequest) -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            page: request.page,
            total_pages: 1,
            limit: request.limit,
        }
    }

    /// Whether there is a next page.
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    /// Whether there is a previous page.
    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    /// Convert the items while keeping the pagination fields.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PageResponse<U> {
        PageResponse {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            total_pages: self.total_pages,
            limit: self.limit,
        }
    }
}

/// Whether navigating from `current` to `target` should issue a request.
///
/// Out-of-range targets and the current page are no-ops.
pub fn can_go_to_page(target: u32, current: u32, total_pages: u32) -> bool {
    target >= 1 && target <= total_pages && target != current
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    DEFAULT_LIMIT
}
