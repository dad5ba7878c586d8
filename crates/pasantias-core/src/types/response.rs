//! Normalization of the backend's list and entity envelopes.
//!
//! The backend answers list endpoints with several shapes: a bare array,
//! `{ data: [...] }`, `{ data: { items|offers|applications, total, page,
//! limit } }`, and occasionally a doubled `{ data: { data: ... } }`. All of
//! them are folded into a single [`PageResponse`].

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::pagination::{PageRequest, PageResponse};
use crate::error::{AppError, ErrorKind};
use crate::result::AppResult;

/// How many nested `data` wrappers are peeled before giving up.
const MAX_UNWRAP_DEPTH: usize = 3;

/// Keys that may hold the list of an enveloped page, in lookup order.
const ITEM_KEYS: [&str; 5] = ["items", "offers", "applications", "notifications", "data"];

/// Nested objects that may carry the pagination counters.
const META_KEYS: [&str; 2] = ["pagination", "meta"];

/// Peel `data` wrappers off a response body.
///
/// An object whose `data` is an array *and* that carries a `total` is a
/// paginated envelope and is returned untouched.
pub fn unwrap_data(mut value: Value) -> Value {
    for _ in 0..MAX_UNWRAP_DEPTH {
        let Value::Object(map) = &mut value else {
            break;
        };
        if !map.contains_key("data") || is_list_envelope(map) {
            break;
        }
        let inner = map.remove("data").unwrap_or(Value::Null);
        value = inner;
    }
    value
}

/// Fold any supported list response into a [`PageResponse`].
///
/// `fallback` supplies `page` and `limit` when the server omits them.
pub fn normalize_response<T: DeserializeOwned>(
    raw: Value,
    fallback: PageRequest,
) -> AppResult<PageResponse<T>> {
    match unwrap_data(raw) {
        Value::Array(items) => Ok(PageResponse::single_page(parse_items(items)?, fallback.limit)),
        Value::Object(mut map) => {
            let list = ITEM_KEYS
                .iter()
                .find_map(|key| map.remove(*key))
                .ok_or_else(|| {
                    AppError::new(
                        ErrorKind::Serialization,
                        "List response carries no items, offers, applications or data field",
                    )
                })?;
            let Value::Array(items) = unwrap_data(list) else {
                return Err(AppError::new(
                    ErrorKind::Serialization,
                    "List response field is not an array",
                ));
            };
            let items: Vec<T> = parse_items(items)?;

            let total = read_counter(&map, &["total", "count", "total_items"])
                .unwrap_or(items.len() as u64);
            let page = read_counter(&map, &["page", "current_page"])
                .map(saturate)
                .unwrap_or(fallback.page);
            let limit = read_counter(&map, &["limit", "per_page", "page_size"])
                .map(saturate)
                .unwrap_or(fallback.limit);

            let mut response = PageResponse::new(items, page, limit, total);
            if let Some(pages) = read_counter(&map, &["totalPages", "total_pages", "pages"]) {
                response.total_pages = saturate(pages).max(1);
            }
            Ok(response)
        }
        other => Err(AppError::new(
            ErrorKind::Serialization,
            format!("Unexpected list response shape: {}", shape_name(&other)),
        )),
    }
}

/// Decode a single-entity response, peeling `data` wrappers first.
pub fn normalize_entity<T: DeserializeOwned>(raw: Value) -> AppResult<T> {
    Ok(serde_json::from_value(unwrap_data(raw))?)
}

fn is_list_envelope(map: &Map<String, Value>) -> bool {
    matches!(map.get("data"), Some(Value::Array(_))) && map.contains_key("total")
}

fn parse_items<T: DeserializeOwned>(items: Vec<Value>) -> AppResult<Vec<T>> {
    items
        .into_iter()
        .map(|item| serde_json::from_value(item).map_err(AppError::from))
        .collect()
}

fn read_counter(map: &Map<String, Value>, keys: &[&str]) -> Option<u64> {
    let nested = META_KEYS
        .iter()
        .filter_map(|meta| map.get(*meta).and_then(Value::as_object));
    std::iter::once(map)
        .chain(nested)
        .find_map(|source| keys.iter().find_map(|key| source.get(*key).and_then(as_counter)))
}

fn as_counter(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn saturate(value: u64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

fn shape_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
