//! Local-only ephemeral notifications.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Severity of a toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastLevel {
    /// Neutral information.
    Info,
    /// A confirmed action.
    Success,
    /// Something needs attention.
    Warning,
    /// An action failed.
    Error,
}

impl ToastLevel {
    /// Return the level as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for ToastLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A notification that never reaches the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toast {
    /// Local id, used to dismiss the toast.
    pub id: Uuid,
    /// Severity.
    pub level: ToastLevel,
    /// Short title.
    pub title: String,
    /// Body text.
    pub message: String,
    /// When the toast was raised.
    pub created_at: DateTime<Utc>,
}

impl Toast {
    /// Create a new toast stamped with the current time.
    pub fn new(level: ToastLevel, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            level,
            title: title.into(),
            message: message.into(),
            created_at: Utc::now(),
        }
    }

    /// Shorthand for an [`ToastLevel::Info`] toast.
    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ToastLevel::Info, title, message)
    }

    /// Shorthand for an [`ToastLevel::Error`] toast.
    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ToastLevel::Error, title, message)
    }
}
