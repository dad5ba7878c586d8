//! Role views over offers.

use std::ops::Deref;
use std::sync::Arc;

use chrono::Utc;
use dashmap::DashSet;
use tokio::sync::broadcast;
use tracing::{info, warn};
use validator::Validate;

use pasantias_core::AppError;
use pasantias_core::config::pagination::PaginationConfig;
use pasantias_core::error::ErrorKind;
use pasantias_core::events::{EntityKind, LifecycleAction, LifecycleEvent};
use pasantias_core::result::AppResult;
use pasantias_core::types::pagination::MAX_LIMIT;
use pasantias_core::types::{OfferId, QueryParams};
use pasantias_client::traits::{ApplicationBackend, OfferBackend};
use pasantias_entity::application::{Application, CreateApplication};
use pasantias_entity::offer::{CreateOffer, Offer, OfferStatus};
use pasantias_entity::user::UserRole;

use super::list::{ListOrchestrator, OrchestratorDeps};

/// Admin review queue of offers.
#[derive(Debug)]
pub struct AdminOffers {
    list: ListOrchestrator<Offer>,
}

impl AdminOffers {
    /// Creates the view. Fails unless the session is an admin.
    pub fn new<B: OfferBackend>(
        backend: Arc<B>,
        deps: &OrchestratorDeps,
        pagination: &PaginationConfig,
    ) -> AppResult<Self> {
        deps.ctx.require_role(UserRole::Admin)?;
        Ok(Self {
            list: ListOrchestrator::new(backend, deps, pagination.admin_offers),
        })
    }

    /// Publish a pending offer.
    pub async fn approve(&self, id: OfferId) -> AppResult<Offer> {
        self.list.transition(id, OfferStatus::Approved, None).await
    }

    /// Send a pending offer back to its organization.
    pub async fn reject(&self, id: OfferId, reason: &str) -> AppResult<Offer> {
        self.list.reject_with_reason(id, reason).await
    }
}

impl Deref for AdminOffers {
    type Target = ListOrchestrator<Offer>;

    fn deref(&self) -> &Self::Target {
        &self.list
    }
}

/// An organization's own offers.
pub struct OrganizationOffers {
    list: ListOrchestrator<Offer>,
    backend: Arc<dyn OfferBackend>,
}

impl std::fmt::Debug for OrganizationOffers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrganizationOffers")
            .field("list", &self.list)
            .finish()
    }
}

impl OrganizationOffers {
    /// Creates the view. Fails unless the session is an organization.
    pub fn new<B: OfferBackend>(
        backend: Arc<B>,
        deps: &OrchestratorDeps,
        pagination: &PaginationConfig,
    ) -> AppResult<Self> {
        deps.ctx.require_role(UserRole::Organization)?;
        let creator: Arc<dyn OfferBackend> = backend.clone();
        Ok(Self {
            list: ListOrchestrator::new(backend, deps, pagination.organization_offers),
            backend: creator,
        })
    }

    /// Create a draft and put it at the top of the list.
    pub async fn create_draft(&self, input: CreateOffer) -> AppResult<Offer> {
        input.validate()?;
        let today = Utc::now().date_naive();
        if input.application_deadline < today {
            return Err(AppError::validation(format!(
                "the application deadline {} is in the past",
                input.application_deadline
            )));
        }

        let offer = self
            .list
            .guarded(self.backend.create(&input))
            .await
            .map_err(|e| e.context("could not create offer"))?;
        info!(offer_id = %offer.id, title = %offer.title, "Draft offer created");

        self.list.prepend_local(offer.clone()).await;
        self.list.emit(offer.id, LifecycleAction::Created);
        Ok(offer)
    }

    /// Send a draft or a rejected offer to admin review.
    pub async fn submit(&self, id: OfferId) -> AppResult<Offer> {
        self.list.transition(id, OfferStatus::Pending, None).await
    }

    /// Send a rejected offer back to admin review.
    pub async fn resubmit(&self, id: OfferId) -> AppResult<Offer> {
        if let Some(offer) = self.list.find(id).await {
            if offer.status != OfferStatus::Rejected {
                return Err(AppError::invalid_transition(format!(
                    "cannot resubmit offer #{id}: it is {}, not rejected",
                    offer.status
                )));
            }
        }
        self.submit(id).await
    }

    /// Stop accepting applications for a published offer.
    pub async fn close(&self, id: OfferId) -> AppResult<Offer> {
        self.list.transition(id, OfferStatus::Closed, None).await
    }
}

impl Deref for OrganizationOffers {
    type Target = ListOrchestrator<Offer>;

    fn deref(&self) -> &Self::Target {
        &self.list
    }
}

/// Published offers browsed by a student.
pub struct StudentOffers {
    list: ListOrchestrator<Offer>,
    applications: Arc<dyn ApplicationBackend>,
    applied: DashSet<OfferId>,
    applying: DashSet<OfferId>,
    events: broadcast::Sender<LifecycleEvent>,
}

impl std::fmt::Debug for StudentOffers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StudentOffers")
            .field("list", &self.list)
            .field("applied", &self.applied.len())
            .finish()
    }
}

impl StudentOffers {
    /// Creates the view. Fails unless the session is a student.
    ///
    /// The list only ever shows approved offers.
    pub fn new<O: OfferBackend, A: ApplicationBackend>(
        offers: Arc<O>,
        applications: Arc<A>,
        deps: &OrchestratorDeps,
        pagination: &PaginationConfig,
    ) -> AppResult<Self> {
        deps.ctx.require_role(UserRole::Student)?;
        Ok(Self {
            list: ListOrchestrator::new(offers, deps, pagination.student_offers)
                .with_pinned_status(OfferStatus::Approved),
            applications,
            applied: DashSet::new(),
            applying: DashSet::new(),
            events: deps.events.clone(),
        })
    }

    /// Load the offers the student already applied to.
    pub async fn sync_applied(&self) -> AppResult<usize> {
        let query = QueryParams {
            page: 1,
            limit: MAX_LIMIT,
            ..QueryParams::default()
        };
        let page = self.list.guarded(self.applications.list(&query)).await?;
        self.applied.clear();
        for application in &page.items {
            self.applied.insert(application.offer_id);
        }
        Ok(self.applied.len())
    }

    /// Whether the student holds an application to `offer_id`.
    pub fn has_applied(&self, offer_id: OfferId) -> bool {
        self.applied.contains(&offer_id)
    }

    /// Apply to an offer on the current page.
    ///
    /// Refused locally when the offer is not approved, its deadline has
    /// passed, or the student already applied.
    pub async fn apply(
        &self,
        offer_id: OfferId,
        cover_letter: Option<String>,
    ) -> AppResult<Application> {
        let input = CreateApplication {
            offer_id,
            cover_letter: cover_letter
                .map(|text| text.trim().to_string())
                .filter(|text| !text.is_empty()),
        };
        input.validate()?;

        if self.applied.contains(&offer_id) {
            return Err(AppError::validation(format!(
                "you already applied to offer #{offer_id}"
            )));
        }
        let offer = self.list.find(offer_id).await.ok_or_else(|| {
            AppError::not_found(format!("offer #{offer_id} is not in the current list"))
        })?;
        if offer.status != OfferStatus::Approved {
            return Err(AppError::validation(format!(
                "offer #{offer_id} is not open for applications"
            )));
        }
        if !offer.accepts_applications(Utc::now().date_naive()) {
            return Err(AppError::validation(format!(
                "the application deadline of offer #{offer_id} has passed"
            )));
        }
        if !self.applying.insert(offer_id) {
            return Err(AppError::validation(format!(
                "an application to offer #{offer_id} is already being sent"
            )));
        }

        let result = self.list.guarded(self.applications.apply(&input)).await;
        self.applying.remove(&offer_id);

        match result {
            Ok(application) => {
                self.applied.insert(offer_id);
                info!(offer_id = %offer_id, application_id = %application.id, "Application submitted");
                let _ = self.events.send(LifecycleEvent::new(
                    EntityKind::Application,
                    application.id.get(),
                    LifecycleAction::Created,
                ));
                Ok(application)
            }
            Err(e) => {
                if e.kind == ErrorKind::Conflict {
                    self.applied.insert(offer_id);
                }
                warn!(offer_id = %offer_id, error = %e, "Application failed");
                Err(e.context(format!("could not apply to offer #{offer_id}")))
            }
        }
    }
}

impl Deref for StudentOffers {
    type Target = ListOrchestrator<Offer>;

    fn deref(&self) -> &Self::Target {
        &self.list
    }
}
