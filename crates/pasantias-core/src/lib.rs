//! # pasantias-core
//!
//! Core crate for the PasantiasUNI client. Contains configuration schemas,
//! typed identifiers, lifecycle events, the filter/pagination contract,
//! response normalization, and the unified error system.
//!
//! This crate has **no** internal dependencies on other PasantiasUNI crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
