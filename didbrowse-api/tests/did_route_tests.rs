//! HTTP tests for `GET /did` and `GET /instances`, driven through the full router with
//! `tower::ServiceExt::oneshot`.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use didbrowse_api::{create_api_router, AppState, ErrorCode, ReplicaClientFactory};
use didbrowse_test_utils::*;
use tower::ServiceExt;

// ============================================================================
// TEST SUPPORT
// ============================================================================

/// Factory over a fixed set of mock sources.
struct MockReplicaClientFactory {
    sources: HashMap<String, Arc<MockReplicaSource>>,
}

impl MockReplicaClientFactory {
    fn single(namespace: &str, source: Arc<MockReplicaSource>) -> Self {
        Self {
            sources: HashMap::from([(namespace.to_string(), source)]),
        }
    }
}

impl ReplicaClientFactory for MockReplicaClientFactory {
    fn for_instance(&self, namespace: &Namespace) -> Option<Arc<dyn ReplicaSource>> {
        self.sources
            .get(namespace.as_str())
            .map(|s| s.clone() as Arc<dyn ReplicaSource>)
    }

    fn instance_names(&self) -> Vec<Namespace> {
        let mut names: Vec<_> = self
            .sources
            .keys()
            .map(|name| Namespace::new(name.as_str()).unwrap())
            .collect();
        names.sort();
        names
    }
}

fn app(store: Arc<MockAttachedFilesStore>, source: Arc<MockReplicaSource>) -> Router {
    let factory = MockReplicaClientFactory::single("atlas", source);
    create_api_router(AppState::new(store, Arc::new(factory)))
}

async fn get(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if body.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null)
    };
    (status, json)
}

fn files_json(files: &[AttachedFile]) -> serde_json::Value {
    serde_json::to_value(files).unwrap()
}

fn error_code(body: &serde_json::Value) -> ErrorCode {
    serde_json::from_value(body["code"].clone()).unwrap()
}

// ============================================================================
// LOOKUP SCENARIOS
// ============================================================================

#[tokio::test]
async fn cached_entry_is_served_without_remote_call() {
    let store = Arc::new(MockAttachedFilesStore::new());
    store.seed(&fixtures::atlas(), &fixtures::sample_did(), fixtures::cached_files());
    let source = Arc::new(MockReplicaSource::new(vec![]));

    let (status, body) = get(
        app(store.clone(), source.clone()),
        "/did?namespace=atlas&did=scope:name",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, files_json(&fixtures::cached_files()));
    assert_eq!(source.call_count(), 0);
    assert!(store.writes().is_empty());
}

#[tokio::test]
async fn poll_forces_remote_fetch() {
    let store = Arc::new(MockAttachedFilesStore::new());
    store.seed(
        &fixtures::atlas(),
        &fixtures::sample_did(),
        vec![AttachedFile::new("stale:entry", 7)],
    );
    let source = Arc::new(MockReplicaSource::new(fixtures::remote_replicas()));

    let (status, body) = get(
        app(store.clone(), source.clone()),
        "/did?namespace=atlas&did=scope:name&poll=1",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, files_json(&fixtures::cached_files()));
    assert_eq!(source.calls(), vec![("scope".to_string(), "name".to_string())]);
    assert_eq!(store.read_count(), 0);
    assert_eq!(
        store.entry(&fixtures::atlas(), &fixtures::sample_did()),
        Some(fixtures::cached_files())
    );
}

#[tokio::test]
async fn poll_zero_allows_cached_answer() {
    let store = Arc::new(MockAttachedFilesStore::new());
    store.seed(&fixtures::atlas(), &fixtures::sample_did(), vec![]);
    let source = Arc::new(MockReplicaSource::new(fixtures::remote_replicas()));

    let (status, body) = get(
        app(store, source.clone()),
        "/did?namespace=atlas&did=scope:name&poll=0",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!([]));
    assert_eq!(source.call_count(), 0);
}

#[tokio::test]
async fn cache_miss_fetches_and_writes_back() {
    let store = Arc::new(MockAttachedFilesStore::new());
    let source = Arc::new(MockReplicaSource::new(fixtures::remote_replicas()));

    let (status, body) = get(
        app(store.clone(), source.clone()),
        "/did?namespace=atlas&did=scope:name",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, files_json(&fixtures::cached_files()));
    assert_eq!(source.call_count(), 1);
    assert_eq!(
        store.writes(),
        vec![StoreCall::Put {
            namespace: "atlas".to_string(),
            did: "scope:name".to_string(),
            files: fixtures::cached_files(),
        }]
    );
}

#[tokio::test]
async fn name_containing_separator_is_kept_whole() {
    let store = Arc::new(MockAttachedFilesStore::new());
    let source = Arc::new(MockReplicaSource::new(vec![]));

    let (status, _) = get(
        app(store, source.clone()),
        "/did?namespace=atlas&did=user.jdoe:run:2024",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        source.calls(),
        vec![("user.jdoe".to_string(), "run:2024".to_string())]
    );
}

// ============================================================================
// ERROR MAPPING
// ============================================================================

#[tokio::test]
async fn missing_did_is_bad_request() {
    let store = Arc::new(MockAttachedFilesStore::new());
    let source = Arc::new(MockReplicaSource::new(vec![]));

    let (status, body) = get(app(store.clone(), source), "/did?namespace=atlas").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), ErrorCode::MissingField);
    assert!(store.calls().is_empty());
}

#[tokio::test]
async fn malformed_did_is_bad_request() {
    let store = Arc::new(MockAttachedFilesStore::new());
    let source = Arc::new(MockReplicaSource::new(vec![]));

    let (status, body) = get(app(store, source.clone()), "/did?namespace=atlas&did=nocolon").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), ErrorCode::InvalidFormat);
    assert_eq!(source.call_count(), 0);
}

#[tokio::test]
async fn missing_namespace_is_bad_request() {
    let store = Arc::new(MockAttachedFilesStore::new());
    let source = Arc::new(MockReplicaSource::new(vec![]));

    let (status, body) = get(app(store, source), "/did?did=scope:name").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), ErrorCode::MissingField);
}

#[tokio::test]
async fn unknown_namespace_is_not_found() {
    let store = Arc::new(MockAttachedFilesStore::new());
    let source = Arc::new(MockReplicaSource::new(vec![]));

    let (status, body) = get(app(store.clone(), source), "/did?namespace=cms&did=scope:name").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&body), ErrorCode::InstanceNotFound);
    assert!(store.calls().is_empty());
}

#[tokio::test]
async fn remote_failure_is_bad_gateway() {
    let store = Arc::new(MockAttachedFilesStore::new());
    let source = Arc::new(MockReplicaSource::failing(fixtures::connection_refused("atlas")));

    let (status, body) = get(
        app(store.clone(), source),
        "/did?namespace=atlas&did=scope:name",
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(error_code(&body), ErrorCode::RemoteFetchFailed);
    assert!(store.writes().is_empty());
}

#[tokio::test]
async fn remote_timeout_is_gateway_timeout() {
    let store = Arc::new(MockAttachedFilesStore::new());
    let source = Arc::new(MockReplicaSource::failing(RemoteError::Timeout {
        instance: "atlas".to_string(),
    }));

    let (status, body) = get(app(store, source), "/did?namespace=atlas&did=scope:name").await;

    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(error_code(&body), ErrorCode::Timeout);
}

#[tokio::test]
async fn duplicate_query_parameter_is_json_bad_request() {
    let store = Arc::new(MockAttachedFilesStore::new());
    let source = Arc::new(MockReplicaSource::new(vec![]));

    let (status, body) = get(
        app(store.clone(), source.clone()),
        "/did?namespace=atlas&did=scope:a&did=scope:b",
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), ErrorCode::InvalidInput);
    assert!(store.calls().is_empty());
    assert_eq!(source.call_count(), 0);
}

#[tokio::test]
async fn store_read_failure_is_internal_error() {
    let store = Arc::new(MockAttachedFilesStore::failing_reads());
    let source = Arc::new(MockReplicaSource::new(fixtures::remote_replicas()));

    let (status, body) = get(app(store, source.clone()), "/did?namespace=atlas&did=scope:name").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(error_code(&body), ErrorCode::StorageError);
    assert_eq!(source.call_count(), 0);
}

#[tokio::test]
async fn store_write_failure_still_answers() {
    let store = Arc::new(MockAttachedFilesStore::failing_writes());
    let source = Arc::new(MockReplicaSource::new(fixtures::remote_replicas()));

    let (status, body) = get(app(store, source), "/did?namespace=atlas&did=scope:name").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, files_json(&fixtures::cached_files()));
}

// ============================================================================
// INSTANCES
// ============================================================================

#[tokio::test]
async fn instances_lists_configured_namespaces() {
    let factory = MockReplicaClientFactory {
        sources: HashMap::from([
            ("cms".to_string(), Arc::new(MockReplicaSource::new(vec![]))),
            ("atlas".to_string(), Arc::new(MockReplicaSource::new(vec![]))),
        ]),
    };
    let state = AppState::new(Arc::new(MockAttachedFilesStore::new()), Arc::new(factory))
        .with_active_instance(fixtures::atlas());

    let (status, body) = get(create_api_router(state), "/instances").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        serde_json::json!({
            "activeInstance": "atlas",
            "instances": [{ "name": "atlas" }, { "name": "cms" }],
        })
    );
}

#[tokio::test]
async fn instances_without_active_instance() {
    let store = Arc::new(MockAttachedFilesStore::new());
    let source = Arc::new(MockReplicaSource::new(vec![]));

    let (status, body) = get(app(store, source), "/instances").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.get("activeInstance").is_none());
    assert_eq!(body["instances"], serde_json::json!([{ "name": "atlas" }]));
}

// ============================================================================
// HEALTH AND METRICS
// ============================================================================

#[tokio::test]
async fn health_and_metrics_endpoints_respond() {
    let store = Arc::new(MockAttachedFilesStore::new());
    let source = Arc::new(MockReplicaSource::new(vec![]));
    let router = app(store, source);

    let (status, _) = get(router.clone(), "/health/live").await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = get(router.clone(), "/health/ready").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let response = router
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
