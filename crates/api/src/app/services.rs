//! Service wiring: pick persistence and storage backends from configuration.

use std::sync::Arc;

use anyhow::Context;

use catalog_infra::storage::{HttpObjectStorage, InMemoryObjectStorage, ObjectStorage};
use catalog_infra::{AppConfig, CatalogService, InMemoryCatalogStore, PostgresCatalogStore, SharedStore, StorageService};

/// Everything a handler needs, shared behind an `Arc`.
#[derive(Clone)]
pub struct AppServices {
    pub catalog: CatalogService,
    pub storage: StorageService,
    pub admin_token: Option<String>,
}

impl AppServices {
    pub fn new(store: SharedStore, backend: Arc<dyn ObjectStorage>, config: &AppConfig) -> Self {
        Self {
            catalog: CatalogService::new(store),
            storage: StorageService::new(backend, config.storage_url.clone(), config.max_upload_mb),
            admin_token: config.admin_token.clone(),
        }
    }

    /// In-memory store and storage; used by tests and local runs without a
    /// database.
    pub fn in_memory(config: &AppConfig) -> Self {
        Self::new(
            Arc::new(InMemoryCatalogStore::new()),
            Arc::new(InMemoryObjectStorage::new()),
            config,
        )
    }
}

/// Connect the configured backends. Missing database or storage settings fall
/// back to in-memory implementations.
pub async fn build_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    let store: SharedStore = match &config.database_url {
        Some(url) => {
            let store = PostgresCatalogStore::connect(url, config.database_max_connections)
                .await
                .context("failed to connect to the catalog database")?;
            tracing::info!("using postgres catalog store");
            Arc::new(store)
        }
        None => {
            tracing::warn!("CATALOG_DATABASE_URL not set; catalog data lives in memory and is lost on restart");
            Arc::new(InMemoryCatalogStore::new())
        }
    };

    let backend: Arc<dyn ObjectStorage> = match &config.storage_key {
        Some(key) => {
            tracing::info!(storage_url = %config.storage_url, "using hosted object storage");
            Arc::new(HttpObjectStorage::new(config.storage_url.clone(), key.clone()))
        }
        None => {
            tracing::warn!("CATALOG_STORAGE_KEY not set; uploads are kept in memory");
            Arc::new(InMemoryObjectStorage::new())
        }
    };

    let services = AppServices::new(store, backend, config);
    if let Err(e) = services.storage.ensure_buckets().await {
        tracing::warn!(error = %e, "not every storage bucket could be created");
    }
    Ok(services)
}
