//! Shared reference data resolved by id.

pub mod model;

pub use model::{CatalogEntry, CatalogKind};
