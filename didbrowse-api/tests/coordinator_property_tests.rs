//! Property-Based Tests for the attached-files resolver
//!
//! - Cache hit: a present entry is returned as is and the remote is not called.
//! - Force fetch: the cache is never read and the remote is called once.
//! - Cache miss: exactly one remote call with the DID's own scope and name.
//! - Normalization: every record becomes `scope:name` with `size == bytes`.
//! - Absent vs empty: a cached empty list is a hit, not a miss.

use std::sync::Arc;

use didbrowse_storage::{AttachedFilesResolver, ReadSource};
use didbrowse_test_utils::generators::*;
use didbrowse_test_utils::*;
use proptest::prelude::*;
use tokio::runtime::Runtime;

// ============================================================================
// TEST CONFIGURATION
// ============================================================================

fn test_runtime() -> Result<Runtime, TestCaseError> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| TestCaseError::fail(format!("Failed to create runtime: {}", e)))
}

fn resolver(
    namespace: &Namespace,
    store: &Arc<MockAttachedFilesStore>,
    source: &Arc<MockReplicaSource>,
) -> AttachedFilesResolver {
    AttachedFilesResolver::new(namespace.clone(), store.clone(), source.clone())
}

// ============================================================================
// PROPERTIES
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_cache_hit_short_circuits(
        namespace in arb_namespace(),
        did in arb_did(),
        cached in arb_file_list(8),
        remote in arb_replica_records(8),
    ) {
        let rt = test_runtime()?;
        let store = Arc::new(MockAttachedFilesStore::new());
        store.seed(&namespace, &did, cached.clone());
        let source = Arc::new(MockReplicaSource::new(remote));

        let result = rt
            .block_on(resolver(&namespace, &store, &source).get_files(did.scope(), did.name(), false))
            .map_err(|e| TestCaseError::fail(e.to_string()))?;

        prop_assert_eq!(result, cached);
        prop_assert_eq!(source.call_count(), 0);
        prop_assert_eq!(store.read_count(), 1);
        prop_assert!(store.writes().is_empty());
    }

    #[test]
    fn prop_force_fetch_bypasses_cache(
        namespace in arb_namespace(),
        did in arb_did(),
        cached in prop::option::of(arb_file_list(8)),
        remote in arb_replica_records(8),
    ) {
        let rt = test_runtime()?;
        let store = Arc::new(MockAttachedFilesStore::new());
        if let Some(cached) = cached {
            store.seed(&namespace, &did, cached);
        }
        let source = Arc::new(MockReplicaSource::new(remote.clone()));

        let read = rt
            .block_on(resolver(&namespace, &store, &source).resolve(&did, true))
            .map_err(|e| TestCaseError::fail(e.to_string()))?;

        prop_assert_eq!(read.source(), ReadSource::ForcedRemote);
        prop_assert_eq!(read.into_value(), normalize_replicas(&remote));
        prop_assert_eq!(store.read_count(), 0);
        prop_assert_eq!(source.call_count(), 1);
    }

    #[test]
    fn prop_cache_miss_fetches_once_with_did_parts(
        namespace in arb_namespace(),
        did in arb_did(),
        remote in arb_replica_records(8),
    ) {
        let rt = test_runtime()?;
        let store = Arc::new(MockAttachedFilesStore::new());
        let source = Arc::new(MockReplicaSource::new(remote.clone()));

        let result = rt
            .block_on(resolver(&namespace, &store, &source).get_files(did.scope(), did.name(), false))
            .map_err(|e| TestCaseError::fail(e.to_string()))?;

        prop_assert_eq!(&result, &normalize_replicas(&remote));
        prop_assert_eq!(
            source.calls(),
            vec![(did.scope().to_string(), did.name().to_string())]
        );
        prop_assert_eq!(store.entry(&namespace, &did), Some(result));
    }

    #[test]
    fn prop_normalization_preserves_identity_and_size(remote in arb_replica_records(16)) {
        let rt = test_runtime()?;
        let namespace = fixtures::atlas();
        let did = fixtures::sample_did();
        let store = Arc::new(MockAttachedFilesStore::new());
        let source = Arc::new(MockReplicaSource::new(remote.clone()));

        let result = rt
            .block_on(resolver(&namespace, &store, &source).get_files(did.scope(), did.name(), true))
            .map_err(|e| TestCaseError::fail(e.to_string()))?;

        prop_assert_eq!(result.len(), remote.len());
        for (file, record) in result.iter().zip(&remote) {
            prop_assert_eq!(&file.did, &format!("{}:{}", record.scope, record.name));
            prop_assert_eq!(file.size, record.bytes);
        }
    }

    #[test]
    fn prop_empty_cached_list_is_a_hit(
        namespace in arb_namespace(),
        did in arb_did(),
        remote in arb_replica_records(8),
    ) {
        let rt = test_runtime()?;
        let store = Arc::new(MockAttachedFilesStore::new());
        store.seed(&namespace, &did, vec![]);
        let source = Arc::new(MockReplicaSource::new(remote));

        let read = rt
            .block_on(resolver(&namespace, &store, &source).resolve(&did, false))
            .map_err(|e| TestCaseError::fail(e.to_string()))?;

        prop_assert!(read.was_cache_hit());
        prop_assert!(read.value().is_empty());
        prop_assert_eq!(source.call_count(), 0);
    }

    #[test]
    fn prop_namespaces_do_not_share_entries(
        did in arb_did(),
        cached in arb_file_list(4),
        remote in arb_replica_records(4),
    ) {
        let rt = test_runtime()?;
        let store = Arc::new(MockAttachedFilesStore::new());
        store.seed(&fixtures::atlas(), &did, cached);
        let source = Arc::new(MockReplicaSource::new(remote.clone()));
        let cms = Namespace::new("cms").map_err(|e| TestCaseError::fail(e.to_string()))?;

        let result = rt
            .block_on(resolver(&cms, &store, &source).get_files(did.scope(), did.name(), false))
            .map_err(|e| TestCaseError::fail(e.to_string()))?;

        prop_assert_eq!(result, normalize_replicas(&remote));
        prop_assert_eq!(source.call_count(), 1);
    }
}

// ============================================================================
// REFERENCE SCENARIOS
// ============================================================================

#[tokio::test]
async fn cache_exists_no_force_fetch() {
    let store = Arc::new(MockAttachedFilesStore::new());
    store.seed(&fixtures::atlas(), &fixtures::sample_did(), fixtures::cached_files());
    let source = Arc::new(MockReplicaSource::new(vec![]));

    let result = resolver(&fixtures::atlas(), &store, &source)
        .get_files("scope", "name", false)
        .await
        .unwrap();

    assert_eq!(result, fixtures::cached_files());
    assert_eq!(source.call_count(), 0);
    assert_eq!(
        store.calls(),
        vec![StoreCall::Get {
            namespace: "atlas".to_string(),
            did: "scope:name".to_string(),
        }]
    );
}

#[tokio::test]
async fn cache_exists_force_fetch() {
    let store = Arc::new(MockAttachedFilesStore::new());
    store.seed(&fixtures::atlas(), &fixtures::sample_did(), fixtures::cached_files());
    let source = Arc::new(MockReplicaSource::new(fixtures::remote_replicas()));

    let result = resolver(&fixtures::atlas(), &store, &source)
        .get_files("scope", "name", true)
        .await
        .unwrap();

    assert_eq!(result, fixtures::cached_files());
    assert_eq!(source.calls(), vec![("scope".to_string(), "name".to_string())]);
    assert_eq!(store.read_count(), 0);
}

#[tokio::test]
async fn cache_not_exist() {
    let store = Arc::new(MockAttachedFilesStore::new());
    let source = Arc::new(MockReplicaSource::new(fixtures::remote_replicas()));

    let result = resolver(&fixtures::atlas(), &store, &source)
        .get_files("scope", "name", false)
        .await
        .unwrap();

    assert_eq!(result, fixtures::cached_files());
    assert_eq!(source.calls(), vec![("scope".to_string(), "name".to_string())]);
    assert_eq!(store.read_count(), 1);
}

#[tokio::test]
async fn remote_failure_propagates() {
    let store = Arc::new(MockAttachedFilesStore::new());
    let source = Arc::new(MockReplicaSource::failing(fixtures::connection_refused("atlas")));

    let result = resolver(&fixtures::atlas(), &store, &source)
        .get_files("scope", "name", false)
        .await;

    assertions::assert_remote_error(&result);
    assert!(store.writes().is_empty());
}

#[tokio::test]
async fn empty_name_is_rejected() {
    let store = Arc::new(MockAttachedFilesStore::new());
    let source = Arc::new(MockReplicaSource::new(vec![]));

    let result = resolver(&fixtures::atlas(), &store, &source)
        .get_files("scope", "", false)
        .await;

    assertions::assert_validation_error(&result);
    assert!(store.calls().is_empty());
}
