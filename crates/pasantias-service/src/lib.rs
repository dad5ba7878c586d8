//! # pasantias-service
//!
//! Client-side business logic for PasantiasUNI. Lifecycle orchestrators
//! keep a list view consistent with the backend while transitions race
//! each other; the notification store and poller form the side-channel;
//! the catalog cache and the session tie everything to one login.
//!
//! Services follow constructor injection: backends are handed in as
//! `Arc` trait objects at construction time.

pub mod catalog;
pub mod context;
pub mod notification;
pub mod orchestrator;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

pub use catalog::CatalogCache;
pub use context::SessionContext;
pub use notification::{NotificationFeed, NotificationPoller, NotificationStore, Toast, ToastLevel};
pub use orchestrator::{
    AdminApplications, AdminOffers, ListOrchestrator, ListSnapshot, OrchestratorDeps,
    OrganizationApplications, OrganizationOffers, StudentApplications, StudentOffers,
};
pub use session::Session;
