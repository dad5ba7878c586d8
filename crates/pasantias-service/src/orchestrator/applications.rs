//! Role views over applications.

use std::ops::Deref;
use std::sync::Arc;

use pasantias_core::AppError;
use pasantias_core::config::pagination::PaginationConfig;
use pasantias_core::result::AppResult;
use pasantias_core::types::ApplicationId;
use pasantias_client::traits::ApplicationBackend;
use pasantias_entity::application::{Application, ApplicationStatus};
use pasantias_entity::user::UserRole;

use super::list::{ListOrchestrator, OrchestratorDeps};

/// Admin pre-screen and closure of applications.
#[derive(Debug)]
pub struct AdminApplications {
    list: ListOrchestrator<Application>,
}

impl AdminApplications {
    /// Creates the view. Fails unless the session is an admin.
    pub fn new<B: ApplicationBackend>(
        backend: Arc<B>,
        deps: &OrchestratorDeps,
        pagination: &PaginationConfig,
    ) -> AppResult<Self> {
        deps.ctx.require_role(UserRole::Admin)?;
        Ok(Self {
            list: ListOrchestrator::new(backend, deps, pagination.applications),
        })
    }

    /// Forward a pending application to the organization.
    pub async fn approve(&self, id: ApplicationId) -> AppResult<Application> {
        self.list
            .transition(id, ApplicationStatus::Approved, None)
            .await
    }

    /// Turn a pending application down.
    pub async fn reject(&self, id: ApplicationId, reason: &str) -> AppResult<Application> {
        self.list.reject_with_reason(id, reason).await
    }

    /// Close an accepted application.
    pub async fn finalize(&self, id: ApplicationId) -> AppResult<Application> {
        self.list
            .transition(id, ApplicationStatus::Finalized, None)
            .await
    }
}

impl Deref for AdminApplications {
    type Target = ListOrchestrator<Application>;

    fn deref(&self) -> &Self::Target {
        &self.list
    }
}

/// Organization evaluation of pre-screened applications.
#[derive(Debug)]
pub struct OrganizationApplications {
    list: ListOrchestrator<Application>,
}

impl OrganizationApplications {
    /// Creates the view. Fails unless the session is an organization.
    pub fn new<B: ApplicationBackend>(
        backend: Arc<B>,
        deps: &OrchestratorDeps,
        pagination: &PaginationConfig,
    ) -> AppResult<Self> {
        deps.ctx.require_role(UserRole::Organization)?;
        Ok(Self {
            list: ListOrchestrator::new(backend, deps, pagination.applications),
        })
    }

    /// Accept an approved application.
    pub async fn accept(&self, id: ApplicationId) -> AppResult<Application> {
        self.list
            .transition(id, ApplicationStatus::Accepted, None)
            .await
    }

    /// Turn an approved application down.
    pub async fn reject(&self, id: ApplicationId, reason: &str) -> AppResult<Application> {
        self.list.reject_with_reason(id, reason).await
    }
}

impl Deref for OrganizationApplications {
    type Target = ListOrchestrator<Application>;

    fn deref(&self) -> &Self::Target {
        &self.list
    }
}

/// A student's own applications.
pub struct StudentApplications {
    list: ListOrchestrator<Application>,
    backend: Arc<dyn ApplicationBackend>,
}

impl std::fmt::Debug for StudentApplications {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StudentApplications")
            .field("list", &self.list)
            .finish()
    }
}

impl StudentApplications {
    /// Creates the view. Fails unless the session is a student.
    pub fn new<B: ApplicationBackend>(
        backend: Arc<B>,
        deps: &OrchestratorDeps,
        pagination: &PaginationConfig,
    ) -> AppResult<Self> {
        deps.ctx.require_role(UserRole::Student)?;
        let canceller: Arc<dyn ApplicationBackend> = backend.clone();
        Ok(Self {
            list: ListOrchestrator::new(backend, deps, pagination.applications),
            backend: canceller,
        })
    }

    /// Withdraw a pending or approved application.
    ///
    /// The item leaves the list immediately and comes back at the same
    /// index if the backend refuses.
    pub async fn cancel(&self, id: ApplicationId) -> AppResult<Application> {
        self.list
            .optimistic_remove(
                id,
                "cancel",
                |application| {
                    if application.status.is_cancellable() {
                        Ok(())
                    } else {
                        Err(AppError::invalid_transition(format!(
                            "cannot cancel application #{id}: it is already {}",
                            application.status
                        )))
                    }
                },
                || self.backend.cancel(id),
            )
            .await
    }
}

impl Deref for StudentApplications {
    type Target = ListOrchestrator<Application>;

    fn deref(&self) -> &Self::Target {
        &self.list
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeApplications, application, deps, pagination};
    use pasantias_core::error::ErrorKind;
    use pasantias_entity::status::StatusModel;

    fn ids(items: &[Application]) -> Vec<i64> {
        items.iter().map(|a| a.id.get()).collect()
    }

    #[tokio::test]
    async fn test_cancel_rollback_restores_index() {
        let backend = FakeApplications::with(vec![
            application(1, ApplicationStatus::Pending),
            application(2, ApplicationStatus::Approved),
            application(3, ApplicationStatus::Pending),
        ]);
        let view =
            StudentApplications::new(backend.clone(), &deps(UserRole::Student), &pagination())
                .unwrap();
        view.reload().await.unwrap();
        backend.fail_next_cancel(AppError::server("database unavailable"));

        let err = view.cancel(ApplicationId(2)).await.unwrap_err();

        assert_eq!(err.kind, ErrorKind::Server);
        assert!(err.message.contains("could not cancel application #2"));
        let snapshot = view.snapshot().await;
        assert_eq!(ids(&snapshot.items), vec![1, 2, 3]);
        assert_eq!(snapshot.total, 3);
        assert!(snapshot.updating_ids.is_empty());
    }

    #[tokio::test]
    async fn test_cancel_success_removes_item() {
        let backend = FakeApplications::with(vec![
            application(1, ApplicationStatus::Pending),
            application(2, ApplicationStatus::Approved),
        ]);
        let view =
            StudentApplications::new(backend.clone(), &deps(UserRole::Student), &pagination())
                .unwrap();
        view.reload().await.unwrap();
        let mut events = view.subscribe();

        view.cancel(ApplicationId(1)).await.unwrap();

        assert_eq!(ids(&view.snapshot().await.items), vec![2]);
        assert_eq!(backend.cancel_calls(), 1);
        let event = events.recv().await.unwrap();
        assert_eq!(event.summary(), "application #1 cancelled");
    }

    #[tokio::test]
    async fn test_cancel_refused_for_decided_application() {
        let backend = FakeApplications::with(vec![application(4, ApplicationStatus::Accepted)]);
        let view =
            StudentApplications::new(backend.clone(), &deps(UserRole::Student), &pagination())
                .unwrap();
        view.reload().await.unwrap();

        let err = view.cancel(ApplicationId(4)).await.unwrap_err();

        assert_eq!(err.kind, ErrorKind::InvalidTransition);
        assert_eq!(backend.cancel_calls(), 0);
        assert_eq!(view.snapshot().await.items.len(), 1);
    }

    #[tokio::test]
    async fn test_two_stage_review() {
        let backend = FakeApplications::with(vec![application(9, ApplicationStatus::Pending)]);
        let admin = AdminApplications::new(backend.clone(), &deps(UserRole::Admin), &pagination())
            .unwrap();
        let org = OrganizationApplications::new(
            backend.clone(),
            &deps(UserRole::Organization),
            &pagination(),
        )
        .unwrap();
        admin.reload().await.unwrap();
        org.reload().await.unwrap();

        // the organization cannot act before the admin pre-screen
        let err = org.accept(ApplicationId(9)).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidTransition);

        let approved = admin.approve(ApplicationId(9)).await.unwrap();
        assert!(approved.admin_reviewed_at.is_some());

        org.reload().await.unwrap();
        let accepted = org.accept(ApplicationId(9)).await.unwrap();
        assert_eq!(accepted.status, ApplicationStatus::Accepted);
        assert!(accepted.org_evaluated_at >= accepted.admin_reviewed_at);

        admin.reload().await.unwrap();
        let finalized = admin.finalize(ApplicationId(9)).await.unwrap();
        assert_eq!(finalized.status, ApplicationStatus::Finalized);
        assert!(finalized.status.is_terminal());
    }
}
