//! `/offers` endpoints.

use async_trait::async_trait;

use pasantias_core::AppError;
use pasantias_core::result::AppResult;
use pasantias_core::types::{
    OfferId, PageRequest, PageResponse, QueryParams, normalize_entity, normalize_response,
};
use pasantias_entity::lifecycle::StatusUpdate;
use pasantias_entity::offer::{CreateOffer, Offer, OfferStatus};

use super::ApiClient;
use crate::dto::{OfferDecisionRequest, parse_status_update};
use crate::traits::{LifecycleBackend, OfferBackend};

/// Offer endpoints of the REST backend.
#[derive(Debug, Clone)]
pub struct OffersApi {
    client: ApiClient,
}

impl OffersApi {
    /// Wrap a shared client.
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl LifecycleBackend<Offer> for OffersApi {
    async fn list(&self, query: &QueryParams) -> AppResult<PageResponse<Offer>> {
        let raw = self.client.get("offers", &query.pairs()).await?;
        normalize_response(raw, PageRequest::new(query.page, query.limit))
    }

    async fn get(&self, id: OfferId) -> AppResult<Offer> {
        normalize_entity(self.client.get(&format!("offers/{id}"), &[]).await?)
    }

    async fn transition(
        &self,
        id: OfferId,
        from: OfferStatus,
        to: OfferStatus,
        reason: Option<&str>,
    ) -> AppResult<StatusUpdate<OfferStatus>> {
        use OfferStatus::*;

        let raw = match (from, to) {
            (Draft | Rejected, Pending) => self.client.put(&format!("offers/{id}/submit")).await?,
            (Pending, Approved | Rejected) => {
                self.client
                    .put_json(
                        &format!("offers/{id}/decision"),
                        &OfferDecisionRequest::new(to, reason),
                    )
                    .await?
            }
            (Approved, Closed) => self.client.put(&format!("offers/{id}/close")).await?,
            _ => {
                return Err(AppError::invalid_transition(format!(
                    "No endpoint moves an offer from {from} to {to}"
                )));
            }
        };
        parse_status_update(raw, to)
    }
}

#[async_trait]
impl OfferBackend for OffersApi {
    async fn create(&self, input: &CreateOffer) -> AppResult<Offer> {
        normalize_entity(self.client.post("offers", input).await?)
    }
}
