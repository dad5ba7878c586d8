//! `/catalogs` endpoints.

use async_trait::async_trait;

use pasantias_core::result::AppResult;
use pasantias_core::types::{PageRequest, normalize_response};
use pasantias_entity::catalog::{CatalogEntry, CatalogKind};

use super::ApiClient;
use crate::traits::CatalogBackend;

/// Catalog endpoints of the REST backend.
#[derive(Debug, Clone)]
pub struct CatalogsApi {
    client: ApiClient,
}

impl CatalogsApi {
    /// Wrap a shared client.
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CatalogBackend for CatalogsApi {
    async fn fetch(&self, kind: CatalogKind) -> AppResult<Vec<CatalogEntry>> {
        let raw = self
            .client
            .get(&format!("catalogs/{}", kind.path_segment()), &[])
            .await?;
        Ok(normalize_response::<CatalogEntry>(raw, PageRequest::default())?.items)
    }
}
