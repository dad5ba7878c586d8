//! Notification type enumeration.

use serde::{Deserialize, Serialize};

/// Lifecycle event a notification reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// An offer was approved, rejected or closed.
    OfferStatusChanged,
    /// A student applied to one of the organization's offers.
    NewApplication,
    /// An application was approved, accepted, rejected or finalized.
    ApplicationDecision,
    /// The account was created.
    AccountCreated,
    /// Any type this client does not know yet.
    #[serde(other)]
    Other,
}

impl NotificationKind {
    /// Return the kind as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OfferStatusChanged => "offer_status_changed",
            Self::NewApplication => "new_application",
            Self::ApplicationDecision => "application_decision",
            Self::AccountCreated => "account_created",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
