//! Catalog cache backed by moka.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use moka::future::Cache;
use tracing::{debug, warn};

use pasantias_core::AppError;
use pasantias_core::result::AppResult;
use pasantias_client::traits::CatalogBackend;
use pasantias_entity::catalog::{CatalogEntry, CatalogKind};

/// Loads each catalog at most once per session.
///
/// Concurrent first reads of the same kind share one request.
#[derive(Clone)]
pub struct CatalogCache {
    backend: Arc<dyn CatalogBackend>,
    cache: Cache<CatalogKind, Arc<Vec<CatalogEntry>>>,
}

impl std::fmt::Debug for CatalogCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogCache")
            .field("entries", &self.cache.entry_count())
            .finish()
    }
}

impl CatalogCache {
    /// Create an empty cache over `backend`.
    pub fn new<B: CatalogBackend>(backend: Arc<B>) -> Self {
        Self {
            backend,
            cache: Cache::builder()
                .max_capacity(CatalogKind::ALL.len() as u64)
                .build(),
        }
    }

    /// The entries of `kind`, fetched on first use.
    pub async fn get(&self, kind: CatalogKind) -> AppResult<Arc<Vec<CatalogEntry>>> {
        let backend = self.backend.clone();
        self.cache
            .try_get_with(kind, async move {
                debug!(catalog = %kind, "Loading catalog");
                backend.fetch(kind).await.map(Arc::new)
            })
            .await
            .map_err(|e: Arc<AppError>| {
                AppError::new(e.kind, e.message.clone()).context(format!("could not load {kind} catalog"))
            })
    }

    /// Display name of `id` in `kind`, if it exists.
    pub async fn resolve(&self, kind: CatalogKind, id: i64) -> AppResult<Option<String>> {
        let entries = self.get(kind).await?;
        Ok(entries
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| entry.name.clone()))
    }

    /// Id to name map of `kind`.
    pub async fn names(&self, kind: CatalogKind) -> AppResult<HashMap<i64, String>> {
        let entries = self.get(kind).await?;
        Ok(entries
            .iter()
            .map(|entry| (entry.id, entry.name.clone()))
            .collect())
    }

    /// Load every catalog concurrently. Failures are logged and skipped.
    pub async fn preload_all(&self) -> usize {
        let results = join_all(CatalogKind::ALL.into_iter().map(|kind| self.get(kind))).await;
        results
            .into_iter()
            .filter(|result| match result {
                Ok(_) => true,
                Err(e) => {
                    warn!(error = %e, "Catalog preload failed");
                    false
                }
            })
            .count()
    }

    /// Drop every cached catalog.
    pub fn invalidate(&self) {
        self.cache.invalidate_all();
    }
}
