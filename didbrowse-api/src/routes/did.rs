//! Attached-files lookup endpoint.
//!
//! `GET /did?namespace=<ns>&did=<scope:name>&poll=<0|1>`
//!
//! `poll=1` is sent by clients polling a container whose replication is
//! still in flight, so it bypasses the cache. Any other value, or no value,
//! allows a cached answer.

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use didbrowse_core::{AttachedFile, Did, Namespace};
use didbrowse_storage::{AttachedFilesResolver, ReplicaSource};
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::extractors::ApiQuery;
use crate::remote::InstrumentedReplicaSource;
use crate::state::AppState;
use crate::telemetry::METRICS;

const POLL_FORCE: &str = "1";

// ============================================================================
// TYPES
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DidQuery {
    pub namespace: Option<String>,
    pub did: Option<String>,
    pub poll: Option<String>,
}

impl DidQuery {
    pub fn force_fetch(&self) -> bool {
        self.poll.as_deref().map(str::trim) == Some(POLL_FORCE)
    }

    fn namespace(&self) -> ApiResult<Namespace> {
        let raw = self.namespace.as_deref().unwrap_or_default();
        Namespace::new(raw.trim()).map_err(|_| ApiError::missing_field("namespace"))
    }

    fn did(&self) -> ApiResult<Did> {
        match self.did.as_deref().map(str::trim) {
            None | Some("") => Err(ApiError::missing_field("did")),
            Some(raw) => raw.parse::<Did>().map_err(ApiError::from),
        }
    }
}

// ============================================================================
// HANDLERS
// ============================================================================

/// GET /did - list the files attached to a DID.
pub async fn get_attached_files(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<DidQuery>,
) -> ApiResult<Json<Vec<AttachedFile>>> {
    let namespace = query.namespace()?;
    let did = query.did()?;
    let force_fetch = query.force_fetch();

    let source = state
        .clients
        .for_instance(&namespace)
        .ok_or_else(|| ApiError::instance_not_found(&namespace))?;
    let source: Arc<dyn ReplicaSource> =
        Arc::new(InstrumentedReplicaSource::new(namespace.clone(), source));

    let resolver = AttachedFilesResolver::new(namespace.clone(), state.store.clone(), source);
    let read = resolver.resolve(&did, force_fetch).await?;

    if let Ok(metrics) = METRICS.as_ref() {
        metrics.record_cache_lookup(namespace.as_str(), read.source().as_str());
    }
    tracing::debug!(
        %namespace,
        %did,
        force_fetch,
        source = read.source().as_str(),
        files = read.value().len(),
        "resolved attached files"
    );

    Ok(Json(read.into_value()))
}

// ============================================================================
// ROUTER
// ============================================================================

pub fn create_router() -> Router<AppState> {
    Router::new().route("/", get(get_attached_files))
}
