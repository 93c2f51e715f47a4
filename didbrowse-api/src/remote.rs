//! Remote replica-service client.
//!
//! [`RucioReplicaClient`] implements [`ReplicaSource`] against one configured
//! instance: `GET {base_url}/replicas/{scope}/{name}`, answered with one JSON
//! object per line. [`ReplicaClientFactory`] maps a namespace to its client.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use didbrowse_core::{DidBrowseResult, InstanceConfig, Namespace, RemoteError, ReplicaRecord};
use didbrowse_storage::ReplicaSource;
use reqwest::Url;

use crate::telemetry::METRICS;

/// Resolves the replica source for a namespace.
pub trait ReplicaClientFactory: Send + Sync {
    /// `None` when no instance is configured under `namespace`.
    fn for_instance(&self, namespace: &Namespace) -> Option<Arc<dyn ReplicaSource>>;

    /// Every configured namespace, sorted.
    fn instance_names(&self) -> Vec<Namespace>;
}

// ============================================================================
// HTTP CLIENT
// ============================================================================

pub struct RucioReplicaClient {
    instance: Namespace,
    base_url: String,
    client: reqwest::Client,
}

impl RucioReplicaClient {
    /// Build a client for one instance.
    ///
    /// The timeout applies to the whole request, body included.
    pub fn new(config: &InstanceConfig, timeout: Duration) -> Result<Self, RemoteError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RemoteError::RequestFailed {
                instance: config.name.to_string(),
                reason: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self::with_client(config, client))
    }

    /// Build a client around an existing connection pool.
    pub fn with_client(config: &InstanceConfig, client: reqwest::Client) -> Self {
        Self {
            instance: config.name.clone(),
            base_url: config.base_url.clone(),
            client,
        }
    }

    pub fn instance(&self) -> &Namespace {
        &self.instance
    }

    fn replicas_url(&self, scope: &str, name: &str) -> Result<Url, RemoteError> {
        let mut url = Url::parse(&self.base_url).map_err(|e| RemoteError::RequestFailed {
            instance: self.instance.to_string(),
            reason: format!("invalid base url {}: {}", self.base_url, e),
        })?;

        url.path_segments_mut()
            .map_err(|_| RemoteError::RequestFailed {
                instance: self.instance.to_string(),
                reason: format!("base url {} cannot carry a path", self.base_url),
            })?
            .pop_if_empty()
            .extend(["replicas", scope, name]);

        Ok(url)
    }

    fn request_error(&self, e: reqwest::Error, context: &str) -> RemoteError {
        if e.is_timeout() {
            RemoteError::Timeout {
                instance: self.instance.to_string(),
            }
        } else {
            RemoteError::RequestFailed {
                instance: self.instance.to_string(),
                reason: format!("{}: {}", context, e),
            }
        }
    }
}

#[async_trait]
impl ReplicaSource for RucioReplicaClient {
    async fn get_replicas(&self, scope: &str, name: &str) -> DidBrowseResult<Vec<ReplicaRecord>> {
        let url = self.replicas_url(scope, name)?;
        tracing::debug!(instance = %self.instance, %url, "fetching replicas");

        let response = self
            .client
            .get(url)
            .header("Accept", "application/x-json-stream")
            .send()
            .await
            .map_err(|e| self.request_error(e, "request failed"))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.request_error(e, "failed to read body"))?;

        if !status.is_success() {
            return Err(RemoteError::Status {
                instance: self.instance.to_string(),
                status: status.as_u16(),
                message: body,
            }
            .into());
        }

        Ok(parse_replica_lines(self.instance.as_str(), &body)?)
    }
}

impl std::fmt::Debug for RucioReplicaClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RucioReplicaClient")
            .field("instance", &self.instance)
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Parse a newline-delimited JSON replica listing.
///
/// Blank lines are skipped. Fields other than `scope`, `name` and `bytes`
/// are ignored.
pub fn parse_replica_lines(instance: &str, body: &str) -> Result<Vec<ReplicaRecord>, RemoteError> {
    body.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .enumerate()
        .map(|(index, line)| {
            serde_json::from_str::<ReplicaRecord>(line).map_err(|e| {
                RemoteError::InvalidResponse {
                    instance: instance.to_string(),
                    reason: format!("record {}: {}", index + 1, e),
                }
            })
        })
        .collect()
}

// ============================================================================
// INSTRUMENTATION
// ============================================================================

/// Records fetch count and latency for every call to the wrapped source.
pub struct InstrumentedReplicaSource {
    namespace: Namespace,
    inner: Arc<dyn ReplicaSource>,
}

impl InstrumentedReplicaSource {
    pub fn new(namespace: Namespace, inner: Arc<dyn ReplicaSource>) -> Self {
        Self { namespace, inner }
    }
}

#[async_trait]
impl ReplicaSource for InstrumentedReplicaSource {
    async fn get_replicas(&self, scope: &str, name: &str) -> DidBrowseResult<Vec<ReplicaRecord>> {
        let start = Instant::now();
        let result = self.inner.get_replicas(scope, name).await;

        if let Ok(metrics) = METRICS.as_ref() {
            metrics.record_remote_fetch(
                self.namespace.as_str(),
                result.is_ok(),
                start.elapsed().as_secs_f64(),
            );
        }
        result
    }
}

// ============================================================================
// FACTORY
// ============================================================================

/// One [`RucioReplicaClient`] per configured instance, sharing a connection
/// pool.
pub struct HttpReplicaClientFactory {
    clients: HashMap<Namespace, Arc<dyn ReplicaSource>>,
}

impl HttpReplicaClientFactory {
    pub fn new(instances: &[InstanceConfig], timeout: Duration) -> Result<Self, RemoteError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RemoteError::RequestFailed {
                instance: "*".to_string(),
                reason: format!("failed to build HTTP client: {}", e),
            })?;

        let clients = instances
            .iter()
            .map(|instance| {
                let source: Arc<dyn ReplicaSource> =
                    Arc::new(RucioReplicaClient::with_client(instance, client.clone()));
                (instance.name.clone(), source)
            })
            .collect();

        Ok(Self { clients })
    }
}

impl ReplicaClientFactory for HttpReplicaClientFactory {
    fn for_instance(&self, namespace: &Namespace) -> Option<Arc<dyn ReplicaSource>> {
        self.clients.get(namespace).cloned()
    }

    fn instance_names(&self) -> Vec<Namespace> {
        let mut names: Vec<_> = self.clients.keys().cloned().collect();
        names.sort();
        names
    }
}
