//! Typed filter state and filter patches shared by every list view.
//!
//! A [`ListFilter`] is only ever changed through [`FilterPatch`] values.
//! Every change other than a page change sends the view back to page 1,
//! and every candidate filter is validated before it replaces the current
//! one.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::id::{DurationId, LocationId, ModalityId, PositionId, TechnologyId};
use super::pagination::{DEFAULT_LIMIT, PageRequest};
use super::shift::Shift;
use crate::result::AppResult;

/// Minimum number of characters a trimmed search term needs to be sent.
pub const MIN_SEARCH_CHARS: usize = 2;

/// Catalog-backed filters. All ids reference shared reference data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogFilter {
    /// Technology the offer must require.
    pub technology_id: Option<TechnologyId>,
    /// Work modality (on-site, remote, ...).
    pub modality_id: Option<ModalityId>,
    /// Location of the internship.
    pub location_id: Option<LocationId>,
    /// Position offered.
    pub position_id: Option<PositionId>,
    /// Duration of the internship.
    pub duration_id: Option<DurationId>,
    /// Work shift.
    pub shift: Option<Shift>,
}

impl CatalogFilter {
    /// Whether no catalog filter is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// The canonical filter of a list view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListFilter<S> {
    /// Page number (1-based).
    pub page: u32,
    /// Page size.
    pub limit: u32,
    /// Normalized search term: trimmed, at least [`MIN_SEARCH_CHARS`] long.
    pub search: Option<String>,
    /// Status to restrict the list to.
    pub status: Option<S>,
    /// Inclusive lower date bound.
    pub date_from: Option<NaiveDate>,
    /// Inclusive upper date bound.
    pub date_to: Option<NaiveDate>,
    /// Catalog filters.
    pub catalog: CatalogFilter,
}

/// A single typed change to a [`ListFilter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterPatch<S> {
    /// Navigate to another page. The only patch that keeps the page.
    Page(u32),
    /// Change the page size.
    Limit(u32),
    /// Set or clear the search term.
    Search(Option<String>),
    /// Set or clear the status filter.
    Status(Option<S>),
    /// Set or clear the lower date bound.
    DateFrom(Option<NaiveDate>),
    /// Set or clear the upper date bound.
    DateTo(Option<NaiveDate>),
    /// Set or clear the technology filter.
    Technology(Option<TechnologyId>),
    /// Set or clear the modality filter.
    Modality(Option<ModalityId>),
    /// Set or clear the location filter.
    Location(Option<LocationId>),
    /// Set or clear the position filter.
    Position(Option<PositionId>),
    /// Set or clear the duration filter.
    Duration(Option<DurationId>),
    /// Set or clear the shift filter.
    Shift(Option<Shift>),
}

impl<S> FilterPatch<S> {
    /// Whether this patch only moves the page cursor.
    pub fn is_page_change(&self) -> bool {
        matches!(self, Self::Page(_))
    }
}

/// Outgoing query parameters, validated before any request is built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Validate)]
#[validate(schema(function = "validate_date_range"))]
pub struct QueryParams {
    /// Page number.
    #[validate(range(min = 1, message = "page must be at least 1"))]
    pub page: u32,
    /// Page size.
    #[validate(range(min = 5, max = 100, message = "limit must be between 5 and 100"))]
    pub limit: u32,
    /// Search term.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 2, message = "search needs at least 2 characters"))]
    pub search: Option<String>,
    /// Status filter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Lower date bound (`YYYY-MM-DD`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_from: Option<NaiveDate>,
    /// Upper date bound (`YYYY-MM-DD`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_to: Option<NaiveDate>,
    /// Technology id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub technology: Option<i64>,
    /// Modality id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modality: Option<i64>,
    /// Location id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<i64>,
    /// Position id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<i64>,
    /// Duration id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<i64>,
    /// Shift.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shift: Option<String>,
}

impl QueryParams {
    /// Render the parameters as ordered key/value pairs.
    pub fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("page", self.page.to_string()), ("limit", self.limit.to_string())];
        let optional = [
            ("search", self.search.clone()),
            ("status", self.status.clone()),
            ("date_from", self.date_from.map(|d| d.to_string())),
            ("date_to", self.date_to.map(|d| d.to_string())),
            ("technology", self.technology.map(|v| v.to_string())),
            ("modality", self.modality.map(|v| v.to_string())),
            ("location", self.location.map(|v| v.to_string())),
            ("position", self.position.map(|v| v.to_string())),
            ("duration", self.duration.map(|v| v.to_string())),
            ("shift", self.shift.clone()),
        ];
        pairs.extend(
            optional
                .into_iter()
                .filter_map(|(key, value)| value.map(|v| (key, v))),
        );
        pairs
    }
}

fn validate_date_range(params: &QueryParams) -> Result<(), ValidationError> {
    match (params.date_from, params.date_to) {
        (Some(from), Some(to)) if from > to => {
            let mut err = ValidationError::new("date_range");
            err.message = Some("date_from must not be after date_to".into());
            Err(err)
        }
        _ => Ok(()),
    }
}

/// Trim a search term and drop it when it is too short to be sent.
pub fn normalize_search(term: Option<&str>) -> Option<String> {
    let trimmed = term?.trim();
    if trimmed.chars().count() < MIN_SEARCH_CHARS {
        None
    } else {
        Some(trimmed.to_string())
    }
}

impl<S> ListFilter<S> {
    /// An unfiltered first page with the given page size.
    pub fn new(limit: u32) -> Self {
        Self {
            page: 1,
            limit,
            search: None,
            status: None,
            date_from: None,
            date_to: None,
            catalog: CatalogFilter::default(),
        }
    }

    /// Whether any filter besides pagination is set.
    pub fn is_filtered(&self) -> bool {
        self.search.is_some()
            || self.status.is_some()
            || self.date_from.is_some()
            || self.date_to.is_some()
            || !self.catalog.is_empty()
    }

    /// The page position of this filter.
    pub fn page_request(&self) -> PageRequest {
        PageRequest {
            page: self.page,
            limit: self.limit,
        }
    }
}

impl<S> Default for ListFilter<S> {
    fn default() -> Self {
        Self::new(DEFAULT_LIMIT)
    }
}

impl<S: Clone + fmt::Display> ListFilter<S> {
    /// Merge a single patch. See [`ListFilter::apply_all`].
    pub fn apply(&self, patch: FilterPatch<S>) -> AppResult<Self> {
        self.apply_all([patch])
    }

    /// Merge patches onto a copy of this filter and validate the result.
    ///
    /// The page is reset to 1 unless every patch is a page change. An
    /// empty patch list returns an identical filter. On error `self` is
    /// left as it was.
    pub fn apply_all(&self, patches: impl IntoIterator<Item = FilterPatch<S>>) -> AppResult<Self> {
        let mut next = self.clone();
        let mut only_paging = true;
        let mut any = false;

        for patch in patches {
            any = true;
            only_paging &= patch.is_page_change();
            match patch {
                FilterPatch::Page(page) => next.page = page,
                FilterPatch::Limit(limit) => next.limit = limit,
                FilterPatch::Search(term) => next.search = normalize_search(term.as_deref()),
                FilterPatch::Status(status) => next.status = status,
                FilterPatch::DateFrom(date) => next.date_from = date,
                FilterPatch::DateTo(date) => next.date_to = date,
                FilterPatch::Technology(id) => next.catalog.technology_id = id,
                FilterPatch::Modality(id) => next.catalog.modality_id = id,
                FilterPatch::Location(id) => next.catalog.location_id = id,
                FilterPatch::Position(id) => next.catalog.position_id = id,
                FilterPatch::Duration(id) => next.catalog.duration_id = id,
                FilterPatch::Shift(shift) => next.catalog.shift = shift,
            }
        }

        if any && !only_paging {
            next.page = 1;
        }

        next.to_query().validate()?;
        Ok(next)
    }

    /// Drop every filter but the page size and return to page 1.
    pub fn cleared(&self) -> Self {
        Self::new(self.limit)
    }

    /// Render the outgoing query parameters.
    pub fn to_query(&self) -> QueryParams {
        QueryParams {
            page: self.page,
            limit: self.limit,
            search: self.search.clone(),
            status: self.status.as_ref().map(ToString::to_string),
            date_from: self.date_from,
            date_to: self.date_to,
            technology: self.catalog.technology_id.map(i64::from),
            modality: self.catalog.modality_id.map(i64::from),
            location: self.catalog.location_id.map(i64::from),
            position: self.catalog.position_id.map(i64::from),
            duration: self.catalog.duration_id.map(i64::from),
            shift: self.catalog.shift.map(|s| s.as_str().to_string()),
        }
    }
}

/// Merge `patch` onto `current`. Free-function form of [`ListFilter::apply`].
pub fn apply_filters<S: Clone + fmt::Display>(
    current: &ListFilter<S>,
    patch: FilterPatch<S>,
) -> AppResult<ListFilter<S>> {
    current.apply(patch)
}

/// Keep only the page size. Free-function form of [`ListFilter::cleared`].
pub fn clear_filters<S>(current: &ListFilter<S>) -> ListFilter<S> {
    ListFilter::new(current.limit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn on_page_three() -> ListFilter<String> {
        ListFilter {
            page: 3,
            ..ListFilter::new(10)
        }
    }

    #[test]
    fn test_filter_change_resets_page() {
        let base = on_page_three();
        let patches = vec![
            FilterPatch::Status(Some("pending".to_string())),
            FilterPatch::Search(Some("rust".to_string())),
            FilterPatch::Limit(20),
            FilterPatch::DateFrom(NaiveDate::from_ymd_opt(2024, 1, 1)),
            FilterPatch::Technology(Some(TechnologyId(4))),
            FilterPatch::Shift(Some(Shift::Mixed)),
            FilterPatch::Search(None),
        ];
        for patch in patches {
            let next = base.apply(patch.clone()).unwrap();
            assert_eq!(next.page, 1, "patch {patch:?} kept the page");
        }
    }

    #[test]
    fn test_page_change_keeps_page() {
        let next = on_page_three().apply(FilterPatch::Page(5)).unwrap();
        assert_eq!(next.page, 5);
    }

    #[test]
    fn test_mixed_patches_reset_page() {
        let next = on_page_three()
            .apply_all([
                FilterPatch::Page(5),
                FilterPatch::Status(Some("approved".to_string())),
            ])
            .unwrap();
        assert_eq!(next.page, 1);
    }

    #[test]
    fn test_empty_patch_list_is_noop() {
        let base = on_page_three();
        let next = base.apply_all(Vec::new()).unwrap();
        assert_eq!(next, base);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let filtered = on_page_three()
            .apply_all([
                FilterPatch::Status(Some("pending".to_string())),
                FilterPatch::Search(Some("backend".to_string())),
                FilterPatch::Limit(25),
            ])
            .unwrap();
        let once = clear_filters(&filtered);
        let twice = clear_filters(&once);
        assert_eq!(once, twice);
        assert_eq!(once.page, 1);
        assert_eq!(once.limit, 25);
        assert!(!once.is_filtered());
    }

    #[test]
    fn test_short_search_is_not_sent() {
        let next = ListFilter::<String>::new(10)
            .apply(FilterPatch::Search(Some(" a ".to_string())))
            .unwrap();
        assert_eq!(next.search, None);
        assert!(!next.to_query().pairs().iter().any(|(k, _)| *k == "search"));

        let next = next
            .apply(FilterPatch::Search(Some("  backend developer ".to_string())))
            .unwrap();
        let pairs = next.to_query().pairs();
        assert!(pairs.contains(&("search", "backend developer".to_string())));
    }

    #[test]
    fn test_invalid_limit_rejected() {
        let base = ListFilter::<String>::new(10);
        let err = base.apply(FilterPatch::Limit(4)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert!(base.apply(FilterPatch::Limit(101)).is_err());
        assert!(base.apply(FilterPatch::Limit(100)).is_ok());
    }

    #[test]
    fn test_inverted_date_range_rejected() {
        let base = ListFilter::<String>::new(10)
            .apply(FilterPatch::DateFrom(NaiveDate::from_ymd_opt(2024, 6, 1)))
            .unwrap();
        let err = base
            .apply(FilterPatch::DateTo(NaiveDate::from_ymd_opt(2024, 5, 1)))
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_query_pairs_omit_empty_keys() {
        let filter = ListFilter::<String>::new(12)
            .apply_all([
                FilterPatch::Status(Some("approved".to_string())),
                FilterPatch::Modality(Some(ModalityId(2))),
            ])
            .unwrap();
        let pairs = filter.to_query().pairs();
        assert_eq!(
            pairs,
            vec![
                ("page", "1".to_string()),
                ("limit", "12".to_string()),
                ("status", "approved".to_string()),
                ("modality", "2".to_string()),
            ]
        );
    }
}
