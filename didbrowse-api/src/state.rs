//! Shared application state.

use std::sync::Arc;
use std::time::Instant;

use didbrowse_core::Namespace;
use didbrowse_storage::{AttachedFilesStore, InMemoryAttachedFilesStore, LmdbAttachedFilesStore};

use crate::config::{ApiConfig, CacheBackendKind};
use crate::error::{ApiError, ApiResult};
use crate::remote::{HttpReplicaClientFactory, ReplicaClientFactory};

/// State handed to every handler.
///
/// The store is shared by all namespaces; entries are namespace-scoped by
/// key. Replica clients are resolved per request from the factory.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn AttachedFilesStore>,
    pub clients: Arc<dyn ReplicaClientFactory>,
    /// Instance reported as preselected by `GET /instances`.
    pub active_instance: Option<Namespace>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(store: Arc<dyn AttachedFilesStore>, clients: Arc<dyn ReplicaClientFactory>) -> Self {
        Self {
            store,
            clients,
            active_instance: None,
            start_time: Instant::now(),
        }
    }

    pub fn with_active_instance(mut self, namespace: Namespace) -> Self {
        self.active_instance = Some(namespace);
        self
    }

    /// Open the configured store and build one HTTP client per instance.
    pub fn from_config(config: &ApiConfig) -> ApiResult<Self> {
        let clients = HttpReplicaClientFactory::new(&config.instances, config.remote_timeout)
            .map_err(|e| ApiError::internal_error(format!("Failed to build replica clients: {}", e)))?;

        let state = Self::new(open_store(config)?, Arc::new(clients));
        Ok(match &config.active_instance {
            Some(namespace) => state.with_active_instance(namespace.clone()),
            None => state,
        })
    }
}

fn open_store(config: &ApiConfig) -> ApiResult<Arc<dyn AttachedFilesStore>> {
    match &config.cache_backend {
        CacheBackendKind::Memory => {
            tracing::info!("Using in-memory attached-files cache");
            Ok(Arc::new(InMemoryAttachedFilesStore::new(config.store.clone())))
        }
        CacheBackendKind::Lmdb { path } => {
            tracing::info!(path = %path.display(), "Opening LMDB attached-files cache");
            let store = LmdbAttachedFilesStore::open(path, config.store.clone()).map_err(|e| {
                ApiError::storage_error(format!("Failed to open cache at {}: {}", path.display(), e))
            })?;
            Ok(Arc::new(store))
        }
    }
}
