//! Session-scoped reference data.

pub mod cache;

pub use cache::CatalogCache;
