//! Cache store trait and statistics.
//!
//! Stores hold the canonical attached-file list of a DID, partitioned by the
//! namespace of the remote instance it was fetched from.

use async_trait::async_trait;
use didbrowse_core::{AttachedFile, Did, DidBrowseResult, Namespace};

/// Persistent store for attached-file lists.
///
/// Implementations must be thread-safe; the fetch coordinator holds no locks
/// of its own.
///
/// # Absence vs. empty
///
/// `get_attached_files` returns `Ok(None)` when no live entry exists for the
/// key (never written, invalidated, or expired). A cached dataset with zero
/// files is `Ok(Some(vec![]))` and must be reported as such.
#[async_trait]
pub trait AttachedFilesStore: Send + Sync {
    /// Read the cached file list for `(namespace, did)`.
    async fn get_attached_files(
        &self,
        namespace: &Namespace,
        did: &Did,
    ) -> DidBrowseResult<Option<Vec<AttachedFile>>>;

    /// Replace the cached file list for `(namespace, did)`.
    async fn put_attached_files(
        &self,
        namespace: &Namespace,
        did: &Did,
        files: &[AttachedFile],
    ) -> DidBrowseResult<()>;

    /// Drop a single entry. Returns whether an entry existed.
    async fn invalidate(&self, namespace: &Namespace, did: &Did) -> DidBrowseResult<bool>;

    /// Drop every entry of a namespace. Returns the number of entries removed.
    async fn invalidate_namespace(&self, namespace: &Namespace) -> DidBrowseResult<u64>;

    /// Get cache statistics.
    async fn stats(&self) -> DidBrowseResult<CacheStats>;
}

/// Statistics about cache usage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Reads that found a live entry.
    pub hits: u64,
    /// Reads that found nothing, including expired entries.
    pub misses: u64,
    /// Reads that found an entry past its TTL.
    pub expired: u64,
    /// Number of entries currently stored.
    pub entry_count: u64,
    /// Number of writes.
    pub writes: u64,
}

impl CacheStats {
    /// Calculate the hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
