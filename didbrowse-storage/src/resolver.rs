//! Attached-file resolution: cache first, remote on miss or on demand.
//!
//! [`AttachedFilesResolver`] is bound to one namespace and one remote
//! [`ReplicaSource`] at construction. It never reads ambient state.
//!
//! Decision policy for `get_files(scope, name, force_fetch)`:
//!
//! 1. `force_fetch`: the cache read is skipped, replicas are fetched and
//!    normalized, the result is written back and returned.
//! 2. Otherwise the cache is read under `(namespace, scope:name)`.
//!    A present entry, even an empty one, is returned as is and the remote is
//!    not contacted. An absent entry falls through to exactly one remote
//!    fetch, which is normalized, written back and returned.
//!
//! Remote failures propagate. A failed write-back is logged and does not
//! fail the call, since the caller already holds authoritative data.

use std::sync::Arc;

use async_trait::async_trait;
use didbrowse_core::{
    normalize_replicas, AttachedFile, Did, DidBrowseResult, Namespace, ReplicaRecord,
};
use tracing::{debug, warn};

use crate::cache::{AttachedFilesStore, CacheRead};

/// Remote replica lookup for one instance.
///
/// Records come back in no particular order. Implementations enforce their
/// own timeouts; the resolver does not retry.
#[async_trait]
pub trait ReplicaSource: Send + Sync {
    async fn get_replicas(&self, scope: &str, name: &str) -> DidBrowseResult<Vec<ReplicaRecord>>;
}

/// Fetch coordinator for one namespace.
pub struct AttachedFilesResolver {
    namespace: Namespace,
    store: Arc<dyn AttachedFilesStore>,
    replicas: Arc<dyn ReplicaSource>,
}

impl AttachedFilesResolver {
    pub fn new(
        namespace: Namespace,
        store: Arc<dyn AttachedFilesStore>,
        replicas: Arc<dyn ReplicaSource>,
    ) -> Self {
        Self {
            namespace,
            store,
            replicas,
        }
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// Resolve the files attached to `scope:name`.
    pub async fn get_files(
        &self,
        scope: &str,
        name: &str,
        force_fetch: bool,
    ) -> DidBrowseResult<Vec<AttachedFile>> {
        let did = Did::new(scope, name)?;
        Ok(self.resolve(&did, force_fetch).await?.into_value())
    }

    /// Like [`get_files`](Self::get_files), but reports where the list came from.
    pub async fn resolve(
        &self,
        did: &Did,
        force_fetch: bool,
    ) -> DidBrowseResult<CacheRead<Vec<AttachedFile>>> {
        if !force_fetch {
            if let Some(files) = self.store.get_attached_files(&self.namespace, did).await? {
                debug!(namespace = %self.namespace, %did, files = files.len(), "attached files cache hit");
                return Ok(CacheRead::from_cache(files));
            }
            debug!(namespace = %self.namespace, %did, "attached files cache miss");
        }

        let files = self.fetch_and_cache(did).await?;
        Ok(CacheRead::from_remote(files, force_fetch))
    }

    async fn fetch_and_cache(&self, did: &Did) -> DidBrowseResult<Vec<AttachedFile>> {
        let replicas = self.replicas.get_replicas(did.scope(), did.name()).await?;
        let files = normalize_replicas(&replicas);
        debug!(namespace = %self.namespace, %did, files = files.len(), "fetched replicas");

        if let Err(e) = self
            .store
            .put_attached_files(&self.namespace, did, &files)
            .await
        {
            warn!(namespace = %self.namespace, %did, error = %e, "failed to cache attached files");
        }

        Ok(files)
    }
}
