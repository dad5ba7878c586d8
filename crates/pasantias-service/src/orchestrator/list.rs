//! Generic list orchestrator shared by every role view.
//!
//! One orchestrator owns one list view: its items, its filters, its
//! pagination cursor and the set of ids with a mutation in flight. Loads
//! are sequence-numbered so that only the newest response is committed;
//! mutations on the same id are serialised; mutations on different ids run
//! concurrently and only ever touch their own item.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::{DashMap, DashSet};
use tokio::sync::{Mutex, RwLock, broadcast};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use pasantias_core::AppError;
use pasantias_core::error::ErrorKind;
use pasantias_core::events::{LifecycleAction, LifecycleEvent};
use pasantias_core::result::AppResult;
use pasantias_core::types::pagination::can_go_to_page;
use pasantias_core::types::{FilterPatch, ListFilter, QueryParams};
use pasantias_client::traits::LifecycleBackend;
use pasantias_entity::lifecycle::LifecycleEntity;
use pasantias_entity::status::StatusModel;

use super::state::{ListSnapshot, ListState};
use crate::context::SessionContext;

/// Minimum number of characters of a trimmed rejection reason.
pub const MIN_REJECTION_REASON_CHARS: usize = 10;

/// Collaborators every orchestrator is built with.
#[derive(Debug, Clone)]
pub struct OrchestratorDeps {
    /// Who is acting.
    pub ctx: SessionContext,
    /// Sink of successful lifecycle mutations.
    pub events: broadcast::Sender<LifecycleEvent>,
    /// Session token; each orchestrator runs on a child of it.
    pub cancel: CancellationToken,
}

impl OrchestratorDeps {
    /// Bundle the collaborators.
    pub fn new(
        ctx: SessionContext,
        events: broadcast::Sender<LifecycleEvent>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            ctx,
            events,
            cancel,
        }
    }
}

/// Drives one list of lifecycle entities against its backend.
pub struct ListOrchestrator<E: LifecycleEntity> {
    backend: Arc<dyn LifecycleBackend<E>>,
    ctx: SessionContext,
    state: RwLock<ListState<E>>,
    updating: DashSet<E::Id>,
    locks: DashMap<E::Id, Arc<Mutex<()>>>,
    load_seq: AtomicU64,
    pinned_status: Option<E::Status>,
    events: broadcast::Sender<LifecycleEvent>,
    cancel: CancellationToken,
}

impl<E: LifecycleEntity> std::fmt::Debug for ListOrchestrator<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListOrchestrator")
            .field("kind", &E::KIND)
            .field("role", &self.ctx.role)
            .field("updating", &self.updating.len())
            .finish()
    }
}

impl<E: LifecycleEntity> ListOrchestrator<E> {
    /// Creates a new orchestrator with the given default page size.
    pub fn new(backend: Arc<dyn LifecycleBackend<E>>, deps: &OrchestratorDeps, limit: u32) -> Self {
        Self {
            backend,
            ctx: deps.ctx,
            state: RwLock::new(ListState::new(limit)),
            updating: DashSet::new(),
            locks: DashMap::new(),
            load_seq: AtomicU64::new(0),
            pinned_status: None,
            events: deps.events.clone(),
            cancel: deps.cancel.child_token(),
        }
    }

    /// Always send `status` as the status filter, whatever the user picks.
    pub fn with_pinned_status(mut self, status: E::Status) -> Self {
        self.pinned_status = Some(status);
        self
    }

    /// The acting session.
    pub fn context(&self) -> SessionContext {
        self.ctx
    }

    /// A read-only copy of the current state.
    pub async fn snapshot(&self) -> ListSnapshot<E> {
        let state = self.state.read().await.clone();
        ListSnapshot {
            state,
            updating_ids: self.updating.iter().map(|id| *id).collect(),
        }
    }

    /// The current filters.
    pub async fn filters(&self) -> ListFilter<E::Status> {
        self.state.read().await.filters.clone()
    }

    /// The item with `id`, if it is on the current page.
    pub async fn find(&self, id: E::Id) -> Option<E> {
        self.state.read().await.get(id).cloned()
    }

    /// Whether a mutation of `id` is in flight.
    pub fn is_updating(&self, id: E::Id) -> bool {
        self.updating.contains(&id)
    }

    /// Subscribe to the lifecycle events this orchestrator emits.
    pub fn subscribe(&self) -> broadcast::Receiver<LifecycleEvent> {
        self.events.subscribe()
    }

    /// Whether [`ListOrchestrator::shutdown`] was called (or the session ended).
    pub fn is_shut_down(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Abort in-flight requests. No state changes afterwards.
    pub fn shutdown(&self) {
        if !self.cancel.is_cancelled() {
            debug!(kind = %E::KIND, "Shutting down list orchestrator");
            self.cancel.cancel();
        }
    }

    /// Merge `patches` into the filters and load the resulting page.
    ///
    /// An invalid candidate filter fails before anything else happens.
    /// On a failed request the previous items stay visible and `error`
    /// is set. A response that is not the newest is dropped.
    pub async fn load(&self, patches: Vec<FilterPatch<E::Status>>) -> AppResult<()> {
        self.ensure_active()?;
        let next = self.state.read().await.filters.apply_all(patches)?;
        self.fetch(next).await
    }

    /// Reload the current page with the current filters.
    pub async fn reload(&self) -> AppResult<()> {
        self.load(Vec::new()).await
    }

    /// Alias of [`ListOrchestrator::load`] for filter changes.
    pub async fn set_filters(&self, patches: Vec<FilterPatch<E::Status>>) -> AppResult<()> {
        self.load(patches).await
    }

    /// Drop every filter except the page size and load page 1.
    pub async fn clear_filters(&self) -> AppResult<()> {
        self.ensure_active()?;
        let next = self.state.read().await.filters.cleared();
        self.fetch(next).await
    }

    /// Navigate to `target`. Returns `false` without I/O when out of range
    /// or already there.
    pub async fn go_to_page(&self, target: u32) -> AppResult<bool> {
        let (page, total_pages) = {
            let state = self.state.read().await;
            (state.page, state.total_pages)
        };
        if !can_go_to_page(target, page, total_pages) {
            debug!(kind = %E::KIND, target, page, total_pages, "Ignoring page change");
            return Ok(false);
        }
        self.load(vec![FilterPatch::Page(target)]).await?;
        Ok(true)
    }

    /// Fetch a single entity and upsert it into the current page.
    ///
    /// An entity not already on the page is only added when its status
    /// matches the view's pinned or filtered status.
    pub async fn refresh_item(&self, id: E::Id) -> AppResult<E> {
        self.ensure_active()?;
        let fresh = self.guarded(self.backend.get(id)).await?;
        self.ensure_active()?;

        let mut state = self.state.write().await;
        match state.position(id) {
            Some(index) => state.items[index] = fresh.clone(),
            None => {
                let wanted = self.pinned_status.or(state.filters.status);
                if wanted.is_none_or(|status| fresh.status() == status) {
                    state.items.push(fresh.clone());
                    state.total += 1;
                    let pages = state.total.div_ceil(u64::from(state.limit.max(1))).max(1);
                    state.total_pages = u32::try_from(pages).unwrap_or(u32::MAX);
                } else {
                    debug!(kind = %E::KIND, id = %id, status = %fresh.status(), "Fetched item outside the view");
                }
            }
        }
        Ok(fresh)
    }

    /// Move `id` to `to`.
    ///
    /// Illegal edges and edges owned by another role fail before any
    /// request. On success only status, reason and timestamps of the item
    /// change. On failure the item is untouched; a 404 marks the view
    /// stale and reloads it.
    pub async fn transition(&self, id: E::Id, to: E::Status, reason: Option<&str>) -> AppResult<E> {
        self.ensure_active()?;
        let lock = self.id_lock(id);
        let result = {
            let _guard = lock.lock().await;
            self.transition_locked(id, to, reason).await
        };
        drop(lock);
        self.release_lock(id);
        result
    }

    /// Reject `id` with a reason of at least
    /// [`MIN_REJECTION_REASON_CHARS`] characters once trimmed.
    pub async fn reject_with_reason(&self, id: E::Id, reason: &str) -> AppResult<E> {
        validate_reason(reason)?;
        let rejected = E::Status::all()
            .iter()
            .copied()
            .find(<E::Status as StatusModel>::requires_reason)
            .ok_or_else(|| AppError::internal(format!("{} has no rejected status", E::KIND)))?;
        self.transition(id, rejected, Some(reason.trim())).await
    }

    /// Remove `id` locally, run `call`, and put it back at its original
    /// index if `call` fails.
    ///
    /// `check` sees the item before removal and may refuse the operation.
    pub(crate) async fn optimistic_remove<C, F, Fut>(
        &self,
        id: E::Id,
        verb: &str,
        check: C,
        call: F,
    ) -> AppResult<E>
    where
        C: FnOnce(&E) -> AppResult<()>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = AppResult<()>>,
    {
        self.ensure_active()?;
        let lock = self.id_lock(id);
        let result = {
            let _guard = lock.lock().await;
            self.remove_locked(id, verb, check, call).await
        };
        drop(lock);
        self.release_lock(id);
        result
    }

    /// Insert a freshly created item at the top of the current page.
    pub(crate) async fn prepend_local(&self, item: E) {
        if self.cancel.is_cancelled() {
            return;
        }
        let mut state = self.state.write().await;
        if state.position(item.id()).is_none() {
            state.items.insert(0, item);
            state.total += 1;
        }
    }

    async fn transition_locked(
        &self,
        id: E::Id,
        to: E::Status,
        reason: Option<&str>,
    ) -> AppResult<E> {
        let label = E::label(id);
        let verb = to.action_verb();

        let current = self.find(id).await.ok_or_else(|| {
            AppError::not_found(format!("{label} is not in the current list"))
        })?;
        let from = current.status();

        if !from.can_transition_to(to) {
            return Err(AppError::invalid_transition(format!(
                "cannot {verb} {label}: {from} -> {to} is not allowed"
            )));
        }
        match from.actor_for(to) {
            Some(role) if role == self.ctx.role => {}
            Some(role) => {
                return Err(AppError::authorization(format!(
                    "cannot {verb} {label}: only the {role} role may do this"
                )));
            }
            None => {
                return Err(AppError::invalid_transition(format!(
                    "cannot {verb} {label}: no role owns {from} -> {to}"
                )));
            }
        }
        if to.requires_reason() {
            validate_reason(reason.unwrap_or_default())?;
        }

        self.updating.insert(id);
        debug!(kind = %E::KIND, id = %id, %from, %to, "Sending transition");
        let result = self
            .guarded(self.backend.transition(id, from, to, reason))
            .await;
        self.updating.remove(&id);

        let update = match result {
            Ok(update) => update,
            Err(e) => return Err(self.transition_failed(id, verb, e).await),
        };
        self.ensure_active()?;

        let updated = {
            let mut state = self.state.write().await;
            match state.position(id) {
                Some(index) => {
                    state.items[index].apply_update(&update, reason);
                    state.items[index].clone()
                }
                None => {
                    let mut detached = current;
                    detached.apply_update(&update, reason);
                    detached
                }
            }
        };

        info!(kind = %E::KIND, id = %id, %from, to = %updated.status(), "Transition confirmed");
        self.emit(
            id,
            LifecycleAction::StatusChanged {
                from: from.to_string(),
                to: updated.status().to_string(),
            },
        );
        Ok(updated)
    }

    async fn transition_failed(&self, id: E::Id, verb: &str, err: AppError) -> AppError {
        let err = err.context(format!("could not {verb} {}", E::label(id)));
        if err.kind == ErrorKind::Cancelled {
            return err;
        }
        warn!(kind = %E::KIND, id = %id, error = %err, "Transition failed");

        if err.kind == ErrorKind::NotFound {
            self.state.write().await.stale = true;
            if let Err(reload) = self.reload().await {
                warn!(kind = %E::KIND, error = %reload, "Reload after missing item failed");
            }
        }
        if !self.cancel.is_cancelled() {
            self.state.write().await.error = Some(err.message.clone());
        }
        err
    }

    async fn remove_locked<C, F, Fut>(
        &self,
        id: E::Id,
        verb: &str,
        check: C,
        call: F,
    ) -> AppResult<E>
    where
        C: FnOnce(&E) -> AppResult<()>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = AppResult<()>>,
    {
        let label = E::label(id);
        let (index, item) = {
            let mut state = self.state.write().await;
            let index = state.position(id).ok_or_else(|| {
                AppError::not_found(format!("{label} is not in the current list"))
            })?;
            check(&state.items[index])?;
            let item = state.items.remove(index);
            state.total = state.total.saturating_sub(1);
            (index, item)
        };

        self.updating.insert(id);
        let result = self.guarded(call()).await;
        self.updating.remove(&id);

        match result {
            Ok(()) => {
                info!(kind = %E::KIND, id = %id, "Removal confirmed");
                self.emit(id, LifecycleAction::Cancelled);
                Ok(item)
            }
            Err(e) => {
                let err = e.context(format!("could not {verb} {label}"));
                if self.cancel.is_cancelled() {
                    return Err(err);
                }
                warn!(kind = %E::KIND, id = %id, error = %err, "Removal failed, restoring item");
                let mut state = self.state.write().await;
                let index = index.min(state.items.len());
                state.items.insert(index, item);
                state.total += 1;
                state.error = Some(err.message.clone());
                Err(err)
            }
        }
    }

    async fn fetch(&self, filters: ListFilter<E::Status>) -> AppResult<()> {
        let seq = self.load_seq.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.write().await.loading = true;

        let query = self.query_for(&filters);
        debug!(kind = %E::KIND, seq, page = query.page, limit = query.limit, "Loading list");
        let result = self.guarded(self.backend.list(&query)).await;

        self.ensure_active()?;
        let mut state = self.state.write().await;
        if self.load_seq.load(Ordering::SeqCst) != seq {
            debug!(kind = %E::KIND, seq, "Discarding stale list response");
            return Ok(());
        }

        match result {
            Ok(page) => {
                debug!(kind = %E::KIND, seq, items = page.items.len(), total = page.total, "List loaded");
                let mut filters = filters;
                filters.page = page.page;
                state.commit(page, filters);
                Ok(())
            }
            Err(e) => {
                warn!(kind = %E::KIND, seq, error = %e, "List load failed");
                state.loading = false;
                state.error = Some(e.message.clone());
                Err(e)
            }
        }
    }

    fn query_for(&self, filters: &ListFilter<E::Status>) -> QueryParams {
        let mut query = filters.to_query();
        if let Some(status) = self.pinned_status {
            query.status = Some(status.to_string());
        }
        query
    }

    pub(crate) fn emit(&self, id: E::Id, action: LifecycleAction) {
        // No receivers is fine.
        let _ = self
            .events
            .send(LifecycleEvent::new(E::KIND, id.into(), action));
    }

    fn id_lock(&self, id: E::Id) -> Arc<Mutex<()>> {
        self.locks.entry(id).or_default().clone()
    }

    fn release_lock(&self, id: E::Id) {
        self.locks
            .remove_if(&id, |_, lock| Arc::strong_count(lock) == 1);
    }

    fn ensure_active(&self) -> AppResult<()> {
        if self.cancel.is_cancelled() {
            Err(AppError::cancelled(format!(
                "the {} list has been shut down",
                E::KIND
            )))
        } else {
            Ok(())
        }
    }

    /// Race `fut` against shutdown.
    pub(crate) async fn guarded<T>(&self, fut: impl Future<Output = AppResult<T>>) -> AppResult<T> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(AppError::cancelled(format!(
                "the {} list has been shut down",
                E::KIND
            ))),
            result = fut => result,
        }
    }
}

/// Local check of a rejection reason.
pub fn validate_reason(reason: &str) -> AppResult<()> {
    if reason.trim().chars().count() < MIN_REJECTION_REASON_CHARS {
        Err(AppError::validation(format!(
            "a rejection reason needs at least {MIN_REJECTION_REASON_CHARS} characters"
        )))
    } else {
        Ok(())
    }
}
