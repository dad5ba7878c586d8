//! In-memory backends and fixtures shared by the unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use pasantias_core::AppError;
use pasantias_core::config::pagination::PaginationConfig;
use pasantias_core::result::AppResult;
use pasantias_core::types::{
    ApplicationId, NotificationId, OfferId, OrganizationId, PageRequest, PageResponse,
    QueryParams, UserId,
};
use pasantias_client::traits::{
    ApplicationBackend, CatalogBackend, LifecycleBackend, NotificationBackend, OfferBackend,
};
use pasantias_entity::application::{Application, ApplicationStatus, CreateApplication};
use pasantias_entity::catalog::{CatalogEntry, CatalogKind};
use pasantias_entity::lifecycle::{LifecycleEntity, StatusUpdate};
use pasantias_entity::notification::{Notification, NotificationKind};
use pasantias_entity::offer::{CreateOffer, Offer, OfferStatus};
use pasantias_entity::user::UserRole;

use crate::context::SessionContext;
use crate::orchestrator::OrchestratorDeps;

pub(crate) fn deps(role: UserRole) -> OrchestratorDeps {
    OrchestratorDeps::new(
        SessionContext::new(UserId(1), role),
        broadcast::channel(16).0,
        CancellationToken::new(),
    )
}

pub(crate) fn pagination() -> PaginationConfig {
    PaginationConfig::default()
}

fn in_a_month() -> NaiveDate {
    Utc::now().date_naive() + chrono::Duration::days(30)
}

pub(crate) fn offer(id: i64, status: OfferStatus) -> Offer {
    let mut offer = Offer::draft(
        OfferId(id),
        OrganizationId(1),
        format!("Offer {id}"),
        in_a_month(),
    );
    offer.status = status;
    offer
}

pub(crate) fn application(id: i64, status: ApplicationStatus) -> Application {
    let mut application = Application::submitted(ApplicationId(id), UserId(1), OfferId(100 + id));
    application.status = status;
    application
}

pub(crate) fn notification(id: i64, is_read: bool) -> Notification {
    Notification {
        id: NotificationId(id),
        user_id: UserId(1),
        kind: NotificationKind::ApplicationDecision,
        title: format!("Notification {id}"),
        message: "Your application was reviewed".to_string(),
        is_read,
        created_at: Utc::now(),
    }
}

/// A lifecycle backend keeping its "server" rows in memory.
pub(crate) struct FakeBackend<E: LifecycleEntity> {
    items: Mutex<Vec<E>>,
    next_id: AtomicI64,
    list_calls: AtomicUsize,
    transition_calls: AtomicUsize,
    apply_calls: AtomicUsize,
    cancel_calls: AtomicUsize,
    last_reason: Mutex<Option<String>>,
    last_query: Mutex<Option<QueryParams>>,
    fail_list: Mutex<Option<AppError>>,
    fail_transition: Mutex<Option<AppError>>,
    fail_cancel: Mutex<Option<AppError>>,
    list_delays: Mutex<VecDeque<Duration>>,
    transition_delay: Mutex<Option<Duration>>,
}

pub(crate) type FakeOffers = FakeBackend<Offer>;
pub(crate) type FakeApplications = FakeBackend<Application>;

impl<E: LifecycleEntity> FakeBackend<E> {
    pub(crate) fn with(items: Vec<E>) -> Arc<Self> {
        Arc::new(Self {
            items: Mutex::new(items),
            next_id: AtomicI64::new(1000),
            list_calls: AtomicUsize::new(0),
            transition_calls: AtomicUsize::new(0),
            apply_calls: AtomicUsize::new(0),
            cancel_calls: AtomicUsize::new(0),
            last_reason: Mutex::new(None),
            last_query: Mutex::new(None),
            fail_list: Mutex::new(None),
            fail_transition: Mutex::new(None),
            fail_cancel: Mutex::new(None),
            list_delays: Mutex::new(VecDeque::new()),
            transition_delay: Mutex::new(None),
        })
    }

    pub(crate) fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn transition_calls(&self) -> usize {
        self.transition_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn apply_calls(&self) -> usize {
        self.apply_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn cancel_calls(&self) -> usize {
        self.cancel_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn last_reason(&self) -> Option<String> {
        self.last_reason.lock().unwrap().clone()
    }

    pub(crate) fn last_query(&self) -> Option<QueryParams> {
        self.last_query.lock().unwrap().clone()
    }

    pub(crate) fn fail_next_list(&self, err: AppError) {
        *self.fail_list.lock().unwrap() = Some(err);
    }

    pub(crate) fn fail_next_transition(&self, err: AppError) {
        *self.fail_transition.lock().unwrap() = Some(err);
    }

    pub(crate) fn fail_next_cancel(&self, err: AppError) {
        *self.fail_cancel.lock().unwrap() = Some(err);
    }

    /// Delay the next list calls, one entry per call.
    pub(crate) fn delay_lists(&self, delays: impl IntoIterator<Item = Duration>) {
        self.list_delays.lock().unwrap().extend(delays);
    }

    pub(crate) fn delay_transitions(&self, delay: Duration) {
        *self.transition_delay.lock().unwrap() = Some(delay);
    }

    pub(crate) fn remove(&self, id: E::Id) {
        self.items.lock().unwrap().retain(|item| item.id() != id);
    }

    fn matches(item: &E, query: &QueryParams) -> bool {
        let value = serde_json::to_value(item).unwrap();
        let status_ok = query
            .status
            .as_deref()
            .is_none_or(|status| value["status"].as_str() == Some(status));
        let search_ok = query.search.as_deref().is_none_or(|term| {
            value["title"]
                .as_str()
                .is_some_and(|title| title.to_lowercase().contains(&term.to_lowercase()))
        });
        status_ok && search_ok
    }
}

#[async_trait]
impl<E: LifecycleEntity> LifecycleBackend<E> for FakeBackend<E> {
    async fn list(&self, query: &QueryParams) -> AppResult<PageResponse<E>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_query.lock().unwrap() = Some(query.clone());
        let delay = self.list_delays.lock().unwrap().pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(err) = self.fail_list.lock().unwrap().take() {
            return Err(err);
        }

        let matching: Vec<E> = self
            .items
            .lock()
            .unwrap()
            .iter()
            .filter(|item| Self::matches(item, query))
            .cloned()
            .collect();
        let total = matching.len() as u64;
        let request = PageRequest::new(query.page, query.limit);
        let start = ((request.page - 1) * request.limit) as usize;
        let page: Vec<E> = matching
            .into_iter()
            .skip(start)
            .take(request.limit as usize)
            .collect();
        Ok(PageResponse::new(page, request.page, request.limit, total))
    }

    async fn get(&self, id: E::Id) -> AppResult<E> {
        self.items
            .lock()
            .unwrap()
            .iter()
            .find(|item| item.id() == id)
            .cloned()
            .ok_or_else(|| AppError::not_found("Not found"))
    }

    async fn transition(
        &self,
        id: E::Id,
        _from: E::Status,
        to: E::Status,
        reason: Option<&str>,
    ) -> AppResult<StatusUpdate<E::Status>> {
        self.transition_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_reason.lock().unwrap() = reason.map(str::to_string);
        let delay = *self.transition_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(err) = self.fail_transition.lock().unwrap().take() {
            return Err(err);
        }

        let now = Utc::now();
        let update = StatusUpdate {
            id: Some(id.into()),
            rejection_reason: reason.map(str::to_string),
            admin_reviewed_at: Some(now),
            org_evaluated_at: Some(now),
            updated_at: Some(now),
            ..StatusUpdate::status_only(to)
        };
        let mut items = self.items.lock().unwrap();
        let item = items
            .iter_mut()
            .find(|item| item.id() == id)
            .ok_or_else(|| AppError::not_found("Not found"))?;
        item.apply_update(&update, reason);
        Ok(update)
    }
}

#[async_trait]
impl OfferBackend for FakeOffers {
    async fn create(&self, input: &CreateOffer) -> AppResult<Offer> {
        let id = OfferId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let offer = Offer::draft(
            id,
            OrganizationId(1),
            input.title.clone(),
            input.application_deadline,
        );
        self.items.lock().unwrap().push(offer.clone());
        Ok(offer)
    }
}

#[async_trait]
impl ApplicationBackend for FakeApplications {
    async fn apply(&self, input: &CreateApplication) -> AppResult<Application> {
        self.apply_calls.fetch_add(1, Ordering::SeqCst);
        let id = ApplicationId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let mut application = Application::submitted(id, UserId(1), input.offer_id);
        application.cover_letter = input.cover_letter.clone();
        self.items.lock().unwrap().push(application.clone());
        Ok(application)
    }

    async fn cancel(&self, id: ApplicationId) -> AppResult<()> {
        self.cancel_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.fail_cancel.lock().unwrap().take() {
            return Err(err);
        }
        self.remove(id);
        Ok(())
    }
}

/// Notification feed kept in memory.
#[derive(Default)]
pub(crate) struct FakeNotifications {
    items: Mutex<Vec<Notification>>,
    server_unread: Mutex<Option<u64>>,
    list_calls: AtomicUsize,
    mark_read_calls: AtomicUsize,
    fail_mark_read: Mutex<Option<AppError>>,
    fail_mark_all: Mutex<Option<AppError>>,
}

impl FakeNotifications {
    pub(crate) fn with(items: Vec<Notification>) -> Arc<Self> {
        Arc::new(Self {
            items: Mutex::new(items),
            ..Self::default()
        })
    }

    pub(crate) fn push(&self, notification: Notification) {
        self.items.lock().unwrap().insert(0, notification);
    }

    pub(crate) fn report_unread(&self, count: u64) {
        *self.server_unread.lock().unwrap() = Some(count);
    }

    pub(crate) fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn mark_read_calls(&self) -> usize {
        self.mark_read_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn fail_next_mark_read(&self, err: AppError) {
        *self.fail_mark_read.lock().unwrap() = Some(err);
    }

    pub(crate) fn fail_next_mark_all(&self, err: AppError) {
        *self.fail_mark_all.lock().unwrap() = Some(err);
    }
}

#[async_trait]
impl NotificationBackend for FakeNotifications {
    async fn list(&self, page: PageRequest) -> AppResult<PageResponse<Notification>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let items = self.items.lock().unwrap().clone();
        let total = items.len() as u64;
        let items = items.into_iter().take(page.limit as usize).collect();
        Ok(PageResponse::new(items, page.page, page.limit, total))
    }

    async fn unread_count(&self) -> AppResult<u64> {
        if let Some(count) = *self.server_unread.lock().unwrap() {
            return Ok(count);
        }
        Ok(self
            .items
            .lock()
            .unwrap()
            .iter()
            .filter(|n| n.is_unread())
            .count() as u64)
    }

    async fn mark_read(&self, id: NotificationId) -> AppResult<()> {
        self.mark_read_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.fail_mark_read.lock().unwrap().take() {
            return Err(err);
        }
        if let Some(n) = self.items.lock().unwrap().iter_mut().find(|n| n.id == id) {
            n.is_read = true;
        }
        Ok(())
    }

    async fn mark_all_read(&self) -> AppResult<()> {
        if let Some(err) = self.fail_mark_all.lock().unwrap().take() {
            return Err(err);
        }
        for n in self.items.lock().unwrap().iter_mut() {
            n.is_read = true;
        }
        Ok(())
    }
}

/// Catalogs served from memory, counting fetches.
#[derive(Default)]
pub(crate) struct FakeCatalogs {
    fetch_calls: AtomicUsize,
}

impl FakeCatalogs {
    pub(crate) fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CatalogBackend for FakeCatalogs {
    async fn fetch(&self, kind: CatalogKind) -> AppResult<Vec<CatalogEntry>> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(20)).await;
        Ok(match kind {
            CatalogKind::Technology => vec![
                CatalogEntry {
                    id: 1,
                    name: "Rust".to_string(),
                },
                CatalogEntry {
                    id: 2,
                    name: "PostgreSQL".to_string(),
                },
            ],
            _ => vec![CatalogEntry {
                id: 1,
                name: format!("{kind} one"),
            }],
        })
    }
}
