//! Observable state of a list view.

use serde::Serialize;

use pasantias_core::types::{ListFilter, PageResponse};
use pasantias_entity::lifecycle::LifecycleEntity;

/// Items, pagination cursor and status flags of one list view.
#[derive(Debug, Clone, Serialize)]
#[serde(bound(serialize = "E: Serialize"))]
pub struct ListState<E: LifecycleEntity> {
    /// Entities of the current page, in server order.
    pub items: Vec<E>,
    /// Total matching entities across all pages.
    pub total: u64,
    /// Current page (1-based).
    pub page: u32,
    /// Number of pages, never below 1.
    pub total_pages: u32,
    /// Page size.
    pub limit: u32,
    /// A list request is in flight.
    pub loading: bool,
    /// Message of the last failed request, cleared by the next successful load.
    pub error: Option<String>,
    /// The filters the current items were loaded with.
    pub filters: ListFilter<E::Status>,
    /// The backend reported an item missing; the next load replaces everything.
    pub stale: bool,
}

impl<E: LifecycleEntity> ListState<E> {
    /// An empty, never-loaded view.
    pub fn new(limit: u32) -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            page: 1,
            total_pages: 1,
            limit,
            loading: false,
            error: None,
            filters: ListFilter::new(limit),
            stale: false,
        }
    }

    /// Replace items and cursor with a successful page.
    pub(crate) fn commit(&mut self, page: PageResponse<E>, filters: ListFilter<E::Status>) {
        self.items = page.items;
        self.total = page.total;
        self.page = page.page;
        self.total_pages = page.total_pages.max(1);
        self.limit = page.limit;
        self.filters = filters;
        self.loading = false;
        self.error = None;
        self.stale = false;
    }

    /// Position of `id` in the current page.
    pub fn position(&self, id: E::Id) -> Option<usize> {
        self.items.iter().position(|item| item.id() == id)
    }

    /// The item with `id`, if it is on the current page.
    pub fn get(&self, id: E::Id) -> Option<&E> {
        self.items.iter().find(|item| item.id() == id)
    }
}

/// A read-only copy of a view, including the ids being updated.
#[derive(Debug, Clone, Serialize)]
#[serde(bound(serialize = "E: Serialize, E::Id: Serialize"))]
pub struct ListSnapshot<E: LifecycleEntity> {
    /// The state at the time of the snapshot.
    #[serde(flatten)]
    pub state: ListState<E>,
    /// Ids with a transition or cancellation in flight.
    pub updating_ids: Vec<E::Id>,
}

impl<E: LifecycleEntity> std::ops::Deref for ListSnapshot<E> {
    type Target = ListState<E>;

    fn deref(&self) -> &Self::Target {
        &self.state
    }
}
