//! Store configuration and the persisted entry envelope.

use chrono::Utc;
use didbrowse_core::{AttachedFile, Timestamp};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration shared by the store implementations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Entries older than this are reported as absent.
    pub entry_ttl: Duration,
    /// Maximum LMDB map size in megabytes.
    pub max_size_mb: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            entry_ttl: Duration::from_secs(86_400), // 1 day
            max_size_mb: 100,
        }
    }
}

impl StoreConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.entry_ttl = ttl;
        self
    }

    pub fn with_max_size_mb(mut self, max_size_mb: usize) -> Self {
        self.max_size_mb = max_size_mb;
        self
    }
}

/// A cached file list plus the time it was written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedFileList {
    pub files: Vec<AttachedFile>,
    pub cached_at: Timestamp,
}

impl CachedFileList {
    pub fn new(files: Vec<AttachedFile>) -> Self {
        Self {
            files,
            cached_at: Utc::now(),
        }
    }

    pub fn is_expired(&self, ttl: Duration, now: Timestamp) -> bool {
        let age = now
            .signed_duration_since(self.cached_at)
            .to_std()
            .unwrap_or(Duration::ZERO);
        age > ttl
    }
}
