//! # pasantias-entity
//!
//! Domain entity models for PasantiasUNI. Offers and applications carry a
//! status governed by a [`status::StatusModel`] adjacency table; both
//! implement [`lifecycle::LifecycleEntity`] so that a single orchestrator
//! can drive either of them.

pub mod application;
pub mod catalog;
pub mod lifecycle;
pub mod notification;
pub mod offer;
pub mod status;
pub mod user;

pub use lifecycle::{LifecycleEntity, StatusUpdate};
pub use status::{StatusModel, is_valid_transition};
