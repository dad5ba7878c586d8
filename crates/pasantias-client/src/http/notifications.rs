//! `/notifications` endpoints.

use async_trait::async_trait;

use pasantias_core::result::AppResult;
use pasantias_core::types::{NotificationId, PageRequest, PageResponse, normalize_response};
use pasantias_entity::notification::Notification;

use super::ApiClient;
use crate::dto::UnreadCount;
use crate::traits::NotificationBackend;

/// Notification endpoints of the REST backend.
#[derive(Debug, Clone)]
pub struct NotificationsApi {
    client: ApiClient,
}

impl NotificationsApi {
    /// Wrap a shared client.
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl NotificationBackend for NotificationsApi {
    async fn list(&self, page: PageRequest) -> AppResult<PageResponse<Notification>> {
        let query = [("page", page.page.to_string()), ("limit", page.limit.to_string())];
        let raw = self.client.get("notifications", &query).await?;
        normalize_response(raw, page)
    }

    async fn unread_count(&self) -> AppResult<u64> {
        UnreadCount::parse(self.client.get("notifications/unread-count", &[]).await?)
    }

    async fn mark_read(&self, id: NotificationId) -> AppResult<()> {
        self.client
            .put(&format!("notifications/{id}/read"))
            .await
            .map(|_| ())
    }

    async fn mark_all_read(&self) -> AppResult<()> {
        self.client.put("notifications/read-all").await.map(|_| ())
    }
}
