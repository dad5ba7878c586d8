//! Notification side-channel configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Notification polling and toast configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Interval between unread-count polls, in seconds.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: u64,
    /// Number of notifications fetched by a full refresh.
    #[serde(default = "default_feed_size")]
    pub feed_size: u32,
    /// Maximum number of local toasts kept before the oldest is dropped.
    #[serde(default = "default_max_toasts")]
    pub max_toasts: usize,
    /// Capacity of the lifecycle event channel.
    #[serde(default = "default_event_buffer")]
    pub event_buffer_size: usize,
}

impl NotificationConfig {
    /// Poll interval as a [`Duration`]. Never shorter than one second.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_seconds.max(1))
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            poll_interval_seconds: default_poll_interval(),
            feed_size: default_feed_size(),
            max_toasts: default_max_toasts(),
            event_buffer_size: default_event_buffer(),
        }
    }
}

fn default_poll_interval() -> u64 {
    30
}

fn default_feed_size() -> u32 {
    20
}

fn default_max_toasts() -> usize {
    5
}

fn default_event_buffer() -> usize {
    64
}
