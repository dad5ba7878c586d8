//! Core type definitions used across the PasantiasUNI workspace.

pub mod filter;
pub mod id;
pub mod pagination;
pub mod response;
pub mod shift;

pub use filter::{CatalogFilter, FilterPatch, ListFilter, QueryParams};
pub use id::*;
pub use pagination::{PageRequest, PageResponse};
pub use response::{normalize_entity, normalize_response, unwrap_data};
pub use shift::Shift;
