//! Backend traits for the lifecycle services.
//!
//! The services only talk to these traits. [`crate::http`] implements
//! them against the REST backend; tests implement them in memory.

use async_trait::async_trait;

use pasantias_core::result::AppResult;
use pasantias_core::types::{ApplicationId, NotificationId, PageRequest, PageResponse, QueryParams};
use pasantias_entity::application::{Application, CreateApplication};
use pasantias_entity::catalog::{CatalogEntry, CatalogKind};
use pasantias_entity::lifecycle::{LifecycleEntity, StatusUpdate};
use pasantias_entity::notification::Notification;
use pasantias_entity::offer::{CreateOffer, Offer};

/// List, fetch and transition one kind of lifecycle entity.
#[async_trait]
pub trait LifecycleBackend<E: LifecycleEntity>: Send + Sync + 'static {
    /// Fetch one page of entities matching `query`.
    async fn list(&self, query: &QueryParams) -> AppResult<PageResponse<E>>;

    /// Fetch a single entity.
    async fn get(&self, id: E::Id) -> AppResult<E>;

    /// Ask the backend to move `id` from `from` to `to`.
    ///
    /// `from` selects the endpoint; it is never trusted as the server's
    /// view of the entity.
    async fn transition(
        &self,
        id: E::Id,
        from: E::Status,
        to: E::Status,
        reason: Option<&str>,
    ) -> AppResult<StatusUpdate<E::Status>>;
}

/// Offer-specific operations.
#[async_trait]
pub trait OfferBackend: LifecycleBackend<Offer> {
    /// Create a draft offer owned by the caller's organization.
    async fn create(&self, input: &CreateOffer) -> AppResult<Offer>;
}

/// Application-specific operations.
#[async_trait]
pub trait ApplicationBackend: LifecycleBackend<Application> {
    /// Submit a new application as the current student.
    async fn apply(&self, input: &CreateApplication) -> AppResult<Application>;

    /// Withdraw an application.
    async fn cancel(&self, id: ApplicationId) -> AppResult<()>;
}

/// Notification feed of the current user.
#[async_trait]
pub trait NotificationBackend: Send + Sync + 'static {
    /// Fetch one page of notifications, newest first.
    async fn list(&self, page: PageRequest) -> AppResult<PageResponse<Notification>>;

    /// Server-side unread counter.
    async fn unread_count(&self) -> AppResult<u64>;

    /// Mark one notification as read.
    async fn mark_read(&self, id: NotificationId) -> AppResult<()>;

    /// Mark every notification as read.
    async fn mark_all_read(&self) -> AppResult<()>;
}

/// Read-only reference catalogs.
#[async_trait]
pub trait CatalogBackend: Send + Sync + 'static {
    /// Fetch every entry of a catalog.
    async fn fetch(&self, kind: CatalogKind) -> AppResult<Vec<CatalogEntry>>;
}
