//! didbrowse Test Utilities
//!
//! Shared test infrastructure for the didbrowse workspace:
//! - Recording mocks for the cache store and the replica source
//! - Proptest generators for identifiers, replica records and file lists
//! - Fixtures for the reference lookup scenarios
//! - Assertions on error categories

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

pub use didbrowse_core::{
    normalize_replicas, AttachedFile, Did, DidBrowseError, DidBrowseResult, Namespace,
    RemoteError, ReplicaRecord, StorageError,
};
pub use didbrowse_storage::{AttachedFilesStore, CacheStats, ReplicaSource};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ============================================================================
// MOCK STORE
// ============================================================================

/// One call observed by [`MockAttachedFilesStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Get {
        namespace: String,
        did: String,
    },
    Put {
        namespace: String,
        did: String,
        files: Vec<AttachedFile>,
    },
}

/// Map-backed store that records every read and write.
///
/// Unlike the real stores it has no TTL: whatever was seeded or written is
/// returned until invalidated.
#[derive(Debug, Default)]
pub struct MockAttachedFilesStore {
    entries: Mutex<HashMap<(String, String), Vec<AttachedFile>>>,
    calls: Mutex<Vec<StoreCall>>,
    fail_reads: bool,
    fail_writes: bool,
}

impl MockAttachedFilesStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that errors on every read.
    pub fn failing_reads() -> Self {
        Self {
            fail_reads: true,
            ..Self::default()
        }
    }

    /// Store that errors on every write.
    pub fn failing_writes() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    /// Seed an entry without recording a call.
    pub fn seed(&self, namespace: &Namespace, did: &Did, files: Vec<AttachedFile>) {
        lock(&self.entries).insert((namespace.to_string(), did.to_string()), files);
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        lock(&self.calls).clone()
    }

    pub fn read_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, StoreCall::Get { .. }))
            .count()
    }

    pub fn writes(&self) -> Vec<StoreCall> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, StoreCall::Put { .. }))
            .collect()
    }

    pub fn entry(&self, namespace: &Namespace, did: &Did) -> Option<Vec<AttachedFile>> {
        lock(&self.entries)
            .get(&(namespace.to_string(), did.to_string()))
            .cloned()
    }
}

#[async_trait]
impl AttachedFilesStore for MockAttachedFilesStore {
    async fn get_attached_files(
        &self,
        namespace: &Namespace,
        did: &Did,
    ) -> DidBrowseResult<Option<Vec<AttachedFile>>> {
        lock(&self.calls).push(StoreCall::Get {
            namespace: namespace.to_string(),
            did: did.to_string(),
        });
        if self.fail_reads {
            return Err(StorageError::TransactionFailed {
                reason: "mock read failure".to_string(),
            }
            .into());
        }
        Ok(self.entry(namespace, did))
    }

    async fn put_attached_files(
        &self,
        namespace: &Namespace,
        did: &Did,
        files: &[AttachedFile],
    ) -> DidBrowseResult<()> {
        lock(&self.calls).push(StoreCall::Put {
            namespace: namespace.to_string(),
            did: did.to_string(),
            files: files.to_vec(),
        });
        if self.fail_writes {
            return Err(StorageError::TransactionFailed {
                reason: "mock write failure".to_string(),
            }
            .into());
        }
        self.seed(namespace, did, files.to_vec());
        Ok(())
    }

    async fn invalidate(&self, namespace: &Namespace, did: &Did) -> DidBrowseResult<bool> {
        Ok(lock(&self.entries)
            .remove(&(namespace.to_string(), did.to_string()))
            .is_some())
    }

    async fn invalidate_namespace(&self, namespace: &Namespace) -> DidBrowseResult<u64> {
        let mut entries = lock(&self.entries);
        let before = entries.len();
        entries.retain(|(ns, _), _| ns != namespace.as_str());
        Ok((before - entries.len()) as u64)
    }

    async fn stats(&self) -> DidBrowseResult<CacheStats> {
        Ok(CacheStats {
            entry_count: lock(&self.entries).len() as u64,
            ..CacheStats::default()
        })
    }
}

// ============================================================================
// MOCK REPLICA SOURCE
// ============================================================================

/// Replica source returning canned records and recording `(scope, name)`
/// for every call.
#[derive(Debug, Default)]
pub struct MockReplicaSource {
    replicas: Vec<ReplicaRecord>,
    failure: Option<RemoteError>,
    calls: Mutex<Vec<(String, String)>>,
}

impl MockReplicaSource {
    pub fn new(replicas: Vec<ReplicaRecord>) -> Self {
        Self {
            replicas,
            ..Self::default()
        }
    }

    pub fn failing(error: RemoteError) -> Self {
        Self {
            failure: Some(error),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        lock(&self.calls).clone()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }
}

#[async_trait]
impl ReplicaSource for MockReplicaSource {
    async fn get_replicas(&self, scope: &str, name: &str) -> DidBrowseResult<Vec<ReplicaRecord>> {
        lock(&self.calls).push((scope.to_string(), name.to_string()));
        match &self.failure {
            Some(error) => Err(error.clone().into()),
            None => Ok(self.replicas.clone()),
        }
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for didbrowse types.

    use super::*;
    use proptest::prelude::*;

    /// Scope: dotted lowercase words, never containing `:`.
    pub fn arb_scope() -> impl Strategy<Value = String> {
        "[a-z][a-z0-9_]{0,7}(\\.[a-z0-9_]{1,8}){0,2}"
    }

    /// Name: may contain `:` and `/`, as real dataset names do.
    pub fn arb_name() -> impl Strategy<Value = String> {
        "[A-Za-z0-9_][A-Za-z0-9_.:/-]{0,31}"
    }

    pub fn arb_did() -> impl Strategy<Value = Did> {
        (arb_scope(), arb_name())
            .prop_filter_map("scope and name must be non-empty", |(scope, name)| {
                Did::new(scope, name).ok()
            })
    }

    pub fn arb_namespace() -> impl Strategy<Value = Namespace> {
        prop_oneof![
            Just("atlas".to_string()),
            Just("cms".to_string()),
            "[a-z]{2,10}",
        ]
        .prop_filter_map("namespace must be non-empty", |name| Namespace::new(name).ok())
    }

    pub fn arb_replica_record() -> impl Strategy<Value = ReplicaRecord> {
        (arb_scope(), arb_name(), any::<u64>())
            .prop_map(|(scope, name, bytes)| ReplicaRecord::new(scope, name, bytes))
    }

    pub fn arb_replica_records(max: usize) -> impl Strategy<Value = Vec<ReplicaRecord>> {
        prop::collection::vec(arb_replica_record(), 0..=max)
    }

    pub fn arb_attached_file() -> impl Strategy<Value = AttachedFile> {
        (arb_did(), any::<u64>()).prop_map(|(did, size)| AttachedFile::new(did.to_string(), size))
    }

    pub fn arb_file_list(max: usize) -> impl Strategy<Value = Vec<AttachedFile>> {
        prop::collection::vec(arb_attached_file(), 0..=max)
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built fixtures for the reference lookup scenarios.

    use super::*;

    pub fn atlas() -> Namespace {
        Namespace::new("atlas").expect("fixture namespace is valid")
    }

    pub fn sample_did() -> Did {
        Did::new("scope", "name").expect("fixture did is valid")
    }

    /// Files as cached for [`sample_did`].
    pub fn cached_files() -> Vec<AttachedFile> {
        vec![
            AttachedFile::new("scope1:name1", 123456),
            AttachedFile::new("scope2:name2", 789456),
            AttachedFile::new("scope3:name3", 1),
        ]
    }

    /// Replica records whose normalization equals [`cached_files`].
    pub fn remote_replicas() -> Vec<ReplicaRecord> {
        vec![
            ReplicaRecord::new("scope1", "name1", 123456),
            ReplicaRecord::new("scope2", "name2", 789456),
            ReplicaRecord::new("scope3", "name3", 1),
        ]
    }

    pub fn connection_refused(instance: &str) -> RemoteError {
        RemoteError::RequestFailed {
            instance: instance.to_string(),
            reason: "connection refused".to_string(),
        }
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions on didbrowse error categories.

    use super::*;

    #[track_caller]
    pub fn assert_validation_error<T: std::fmt::Debug>(result: &DidBrowseResult<T>) {
        match result {
            Err(DidBrowseError::Validation(_)) => {}
            other => panic!("Expected Validation error, got: {:?}", other),
        }
    }

    #[track_caller]
    pub fn assert_remote_error<T: std::fmt::Debug>(result: &DidBrowseResult<T>) {
        match result {
            Err(DidBrowseError::Remote(_)) => {}
            other => panic!("Expected Remote error, got: {:?}", other),
        }
    }

    #[track_caller]
    pub fn assert_storage_error<T: std::fmt::Debug>(result: &DidBrowseResult<T>) {
        match result {
            Err(DidBrowseError::Storage(_)) => {}
            other => panic!("Expected Storage error, got: {:?}", other),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
