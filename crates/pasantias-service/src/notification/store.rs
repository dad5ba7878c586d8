//! Session-owned notification feed.

use std::collections::VecDeque;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

use pasantias_core::AppError;
use pasantias_core::config::notification::NotificationConfig;
use pasantias_core::events::LifecycleEvent;
use pasantias_core::result::AppResult;
use pasantias_core::types::{NotificationId, PageRequest};
use pasantias_client::traits::NotificationBackend;
use pasantias_entity::notification::Notification;

use super::toast::Toast;

/// The observable part of the store.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NotificationFeed {
    /// Most recent notifications, newest first.
    pub items: Vec<Notification>,
    /// Unread notifications on the server, as last known. May exceed the
    /// unread items held when the feed is a partial page.
    pub unread_count: u64,
    /// A full refresh is in flight.
    pub loading: bool,
    /// Message of the last failed request.
    pub error: Option<String>,
    /// When the last full refresh completed.
    pub refreshed_at: Option<DateTime<Utc>>,
}

impl NotificationFeed {
    /// Unread items among those held.
    pub fn held_unread(&self) -> u64 {
        self.items.iter().filter(|n| n.is_unread()).count() as u64
    }
}

/// Notification feed and local toasts of one session.
pub struct NotificationStore {
    backend: Arc<dyn NotificationBackend>,
    feed: RwLock<NotificationFeed>,
    toasts: Mutex<VecDeque<Toast>>,
    feed_size: u32,
    max_toasts: usize,
}

impl std::fmt::Debug for NotificationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationStore")
            .field("feed_size", &self.feed_size)
            .field("max_toasts", &self.max_toasts)
            .finish()
    }
}

impl NotificationStore {
    /// Creates an empty store. Nothing is fetched until [`Self::refresh`].
    pub fn new<B: NotificationBackend>(backend: Arc<B>, config: &NotificationConfig) -> Self {
        Self {
            backend,
            feed: RwLock::new(NotificationFeed::default()),
            toasts: Mutex::new(VecDeque::new()),
            feed_size: config.feed_size,
            max_toasts: config.max_toasts.max(1),
        }
    }

    /// A copy of the feed.
    pub async fn feed(&self) -> NotificationFeed {
        self.feed.read().await.clone()
    }

    /// The notifications currently held.
    pub async fn items(&self) -> Vec<Notification> {
        self.feed.read().await.items.clone()
    }

    /// The unread count as last known.
    pub async fn unread_count(&self) -> u64 {
        self.feed.read().await.unread_count
    }

    /// Replace the feed with the newest page from the server.
    ///
    /// Afterwards the unread count equals the server's counter, which may
    /// exceed the unread items held.
    pub async fn refresh(&self) -> AppResult<()> {
        self.feed.write().await.loading = true;
        let result = tokio::try_join!(
            self.backend.list(PageRequest::new(1, self.feed_size)),
            self.backend.unread_count(),
        );

        let mut feed = self.feed.write().await;
        feed.loading = false;
        match result {
            Ok((page, remote_unread)) => {
                feed.items = page.items;
                let held = feed.held_unread();
                if remote_unread < held {
                    debug!(remote_unread, held, "Server unread count behind the feed");
                }
                feed.unread_count = remote_unread;
                feed.error = None;
                feed.refreshed_at = Some(Utc::now());
                debug!(items = feed.items.len(), unread = feed.unread_count, "Notifications refreshed");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Notification refresh failed");
                feed.error = Some(e.message.clone());
                Err(e)
            }
        }
    }

    /// Compare the server's unread count with the one stored at the last
    /// refresh and run a full refresh when they differ. Returns whether a refresh ran.
    pub async fn sync_unread_count(&self) -> AppResult<bool> {
        let remote = self.backend.unread_count().await?;
        let local = self.unread_count().await;
        if remote == local {
            return Ok(false);
        }
        debug!(local, remote, "Unread count changed");
        self.refresh().await?;
        Ok(true)
    }

    /// Mark one notification read.
    ///
    /// The item flips immediately and the count drops by one if it was
    /// unread. If the server refuses, both are restored.
    pub async fn mark_as_read(&self, id: NotificationId) -> AppResult<()> {
        let was_unread = {
            let mut feed = self.feed.write().await;
            let item = feed
                .items
                .iter_mut()
                .find(|n| n.id == id)
                .ok_or_else(|| AppError::not_found(format!("notification #{id} is not in the feed")))?;
            let was_unread = item.is_unread();
            item.is_read = true;
            if was_unread {
                feed.unread_count = feed.unread_count.saturating_sub(1);
            }
            was_unread
        };

        if let Err(e) = self.backend.mark_read(id).await {
            warn!(id = %id, error = %e, "Mark as read failed, restoring");
            let mut feed = self.feed.write().await;
            let restored = match feed.items.iter_mut().find(|n| n.id == id) {
                Some(item) if was_unread && item.is_read => {
                    item.is_read = false;
                    true
                }
                _ => false,
            };
            if restored {
                feed.unread_count += 1;
            }
            feed.error = Some(e.message.clone());
            return Err(e.context(format!("could not mark notification #{id} as read")));
        }
        Ok(())
    }

    /// Mark every notification read once the server confirms.
    pub async fn mark_all_as_read(&self) -> AppResult<()> {
        if let Err(e) = self.backend.mark_all_read().await {
            warn!(error = %e, "Mark all as read failed");
            self.feed.write().await.error = Some(e.message.clone());
            return Err(e.context("could not mark all notifications as read"));
        }

        let mut feed = self.feed.write().await;
        for item in &mut feed.items {
            item.is_read = true;
        }
        feed.unread_count = 0;
        info!("All notifications marked as read");
        Ok(())
    }

    /// React to a confirmed lifecycle mutation: raise a toast and
    /// resynchronise the unread count.
    pub async fn handle_event(&self, event: &LifecycleEvent) -> AppResult<()> {
        debug!(entity = %event.entity, id = event.id, "Lifecycle event received");
        self.push_toast(Toast::info("Status updated", event.summary()))
            .await;
        self.sync_unread_count().await.map(|_| ())
    }

    /// Raise a local toast. The oldest one goes when the limit is reached.
    pub async fn push_toast(&self, toast: Toast) {
        let mut toasts = self.toasts.lock().await;
        while toasts.len() >= self.max_toasts {
            toasts.pop_front();
        }
        toasts.push_back(toast);
    }

    /// Dismiss a toast. Returns whether it was present.
    pub async fn dismiss_toast(&self, id: Uuid) -> bool {
        let mut toasts = self.toasts.lock().await;
        let before = toasts.len();
        toasts.retain(|t| t.id != id);
        toasts.len() != before
    }

    /// Toasts currently shown, oldest first.
    pub async fn toasts(&self) -> Vec<Toast> {
        self.toasts.lock().await.iter().cloned().collect()
    }

    /// Forget everything. Used at logout.
    pub async fn clear(&self) {
        *self.feed.write().await = NotificationFeed::default();
        self.toasts.lock().await.clear();
    }
}
