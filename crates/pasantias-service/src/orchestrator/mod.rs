//! Lifecycle orchestrators.
//!
//! [`ListOrchestrator`] holds the shared machinery; the role views wrap it
//! and expose only the transitions their role owns.

pub mod applications;
pub mod list;
pub mod offers;
pub mod state;

pub use applications::{AdminApplications, OrganizationApplications, StudentApplications};
pub use list::{ListOrchestrator, MIN_REJECTION_REASON_CHARS, OrchestratorDeps, validate_reason};
pub use offers::{AdminOffers, OrganizationOffers, StudentOffers};
pub use state::{ListSnapshot, ListState};
