//! `/applications` endpoints.

use async_trait::async_trait;

use pasantias_core::AppError;
use pasantias_core::result::AppResult;
use pasantias_core::types::{
    ApplicationId, PageRequest, PageResponse, QueryParams, normalize_entity, normalize_response,
};
use pasantias_entity::application::{Application, ApplicationStatus, CreateApplication};
use pasantias_entity::lifecycle::StatusUpdate;

use super::ApiClient;
use crate::dto::{EvaluateApplicationRequest, ReviewApplicationRequest, parse_status_update};
use crate::traits::{ApplicationBackend, LifecycleBackend};

/// Application endpoints of the REST backend.
#[derive(Debug, Clone)]
pub struct ApplicationsApi {
    client: ApiClient,
}

impl ApplicationsApi {
    /// Wrap a shared client.
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl LifecycleBackend<Application> for ApplicationsApi {
    async fn list(&self, query: &QueryParams) -> AppResult<PageResponse<Application>> {
        let raw = self.client.get("applications", &query.pairs()).await?;
        normalize_response(raw, PageRequest::new(query.page, query.limit))
    }

    async fn get(&self, id: ApplicationId) -> AppResult<Application> {
        normalize_entity(self.client.get(&format!("applications/{id}"), &[]).await?)
    }

    async fn transition(
        &self,
        id: ApplicationId,
        from: ApplicationStatus,
        to: ApplicationStatus,
        reason: Option<&str>,
    ) -> AppResult<StatusUpdate<ApplicationStatus>> {
        use ApplicationStatus::*;

        let raw = match (from, to) {
            // admin pre-screen
            (Pending, Approved | Rejected) => {
                self.client
                    .put_json(
                        &format!("applications/{id}/review"),
                        &ReviewApplicationRequest::new(to, reason),
                    )
                    .await?
            }
            // organization evaluation
            (Approved, Accepted | Rejected) => {
                self.client
                    .put_json(
                        &format!("applications/{id}/evaluate"),
                        &EvaluateApplicationRequest::new(to, reason),
                    )
                    .await?
            }
            (Accepted, Finalized) => {
                self.client
                    .put(&format!("applications/{id}/finalize"))
                    .await?
            }
            _ => {
                return Err(AppError::invalid_transition(format!(
                    "No endpoint moves an application from {from} to {to}"
                )));
            }
        };
        parse_status_update(raw, to)
    }
}

#[async_trait]
impl ApplicationBackend for ApplicationsApi {
    async fn apply(&self, input: &CreateApplication) -> AppResult<Application> {
        normalize_entity(self.client.post("applications", input).await?)
    }

    async fn cancel(&self, id: ApplicationId) -> AppResult<()> {
        self.client.delete(&format!("applications/{id}")).await
    }
}
