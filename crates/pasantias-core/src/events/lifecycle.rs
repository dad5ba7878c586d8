//! Offer and application lifecycle events.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The kind of entity a lifecycle event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// An internship offer.
    Offer,
    /// A student application.
    Application,
}

impl EntityKind {
    /// Return the kind as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Offer => "offer",
            Self::Application => "application",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What happened to the entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LifecycleAction {
    /// The entity was created.
    Created,
    /// The entity moved from one status to another.
    StatusChanged {
        /// Previous status.
        from: String,
        /// New status.
        to: String,
    },
    /// The entity was withdrawn by its owner.
    Cancelled,
}

/// A successful lifecycle mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleEvent {
    /// Kind of entity.
    pub entity: EntityKind,
    /// Server id of the entity.
    pub id: i64,
    /// What happened.
    pub action: LifecycleAction,
    /// When the client observed the confirmation.
    pub timestamp: DateTime<Utc>,
}

impl LifecycleEvent {
    /// Create a new event stamped with the current time.
    pub fn new(entity: EntityKind, id: i64, action: LifecycleAction) -> Self {
        Self {
            entity,
            id,
            action,
            timestamp: Utc::now(),
        }
    }

    /// Short human-readable summary, e.g. `"offer #7 approved"`.
    pub fn summary(&self) -> String {
        match &self.action {
            LifecycleAction::Created => format!("{} #{} created", self.entity, self.id),
            LifecycleAction::StatusChanged { to, .. } => {
                format!("{} #{} {}", self.entity, self.id, to)
            }
            LifecycleAction::Cancelled => format!("{} #{} cancelled", self.entity, self.id),
        }
    }
}
