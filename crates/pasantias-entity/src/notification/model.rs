//! Notification entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pasantias_core::types::{NotificationId, UserId};

use super::kind::NotificationKind;

/// A notification delivered to a user by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Unique notification identifier.
    pub id: NotificationId,
    /// The recipient user.
    #[serde(default)]
    pub user_id: UserId,
    /// Lifecycle event that produced it.
    #[serde(rename = "type", default = "default_kind")]
    pub kind: NotificationKind,
    /// Notification title.
    #[serde(default)]
    pub title: String,
    /// Notification body text.
    #[serde(default)]
    pub message: String,
    /// Whether the user has read this notification.
    #[serde(default)]
    pub is_read: bool,
    /// When the notification was created.
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Check if the notification has not been read yet.
    pub fn is_unread(&self) -> bool {
        !self.is_read
    }
}

fn default_kind() -> NotificationKind {
    NotificationKind::Other
}
