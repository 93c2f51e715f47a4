//! In-memory attached-file store.
//!
//! Used when no cache directory is configured and throughout the tests.
//! Entries live for the lifetime of the process.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;
use didbrowse_core::{AttachedFile, Did, DidBrowseResult, Namespace, StorageError};

use super::entry::{CachedFileList, StoreConfig};
use super::namespaced_key::NamespacedDidKey;
use super::traits::{AttachedFilesStore, CacheStats};

#[derive(Debug, Default)]
pub struct InMemoryAttachedFilesStore {
    entries: RwLock<HashMap<NamespacedDidKey, CachedFileList>>,
    stats: RwLock<CacheStats>,
    config: StoreConfig,
}

impl InMemoryAttachedFilesStore {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            stats: RwLock::new(CacheStats::default()),
            config,
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Insert an entry with an explicit envelope, bypassing the clock.
    pub fn insert_entry(
        &self,
        namespace: &Namespace,
        did: &Did,
        entry: CachedFileList,
    ) -> DidBrowseResult<()> {
        let key = NamespacedDidKey::new(namespace, did);
        let mut entries = self
            .entries
            .write()
            .map_err(|_| StorageError::LockPoisoned)?;
        entries.insert(key, entry);
        Ok(())
    }

    fn record<F: FnOnce(&mut CacheStats)>(&self, f: F) {
        if let Ok(mut stats) = self.stats.write() {
            f(&mut stats);
        }
    }
}

#[async_trait]
impl AttachedFilesStore for InMemoryAttachedFilesStore {
    async fn get_attached_files(
        &self,
        namespace: &Namespace,
        did: &Did,
    ) -> DidBrowseResult<Option<Vec<AttachedFile>>> {
        let key = NamespacedDidKey::new(namespace, did);
        let entries = self
            .entries
            .read()
            .map_err(|_| StorageError::LockPoisoned)?;

        match entries.get(&key) {
            Some(entry) if entry.is_expired(self.config.entry_ttl, Utc::now()) => {
                self.record(|s| {
                    s.expired += 1;
                    s.misses += 1;
                });
                Ok(None)
            }
            Some(entry) => {
                self.record(|s| s.hits += 1);
                Ok(Some(entry.files.clone()))
            }
            None => {
                self.record(|s| s.misses += 1);
                Ok(None)
            }
        }
    }

    async fn put_attached_files(
        &self,
        namespace: &Namespace,
        did: &Did,
        files: &[AttachedFile],
    ) -> DidBrowseResult<()> {
        self.insert_entry(namespace, did, CachedFileList::new(files.to_vec()))?;
        self.record(|s| s.writes += 1);
        Ok(())
    }

    async fn invalidate(&self, namespace: &Namespace, did: &Did) -> DidBrowseResult<bool> {
        let key = NamespacedDidKey::new(namespace, did);
        let mut entries = self
            .entries
            .write()
            .map_err(|_| StorageError::LockPoisoned)?;
        Ok(entries.remove(&key).is_some())
    }

    async fn invalidate_namespace(&self, namespace: &Namespace) -> DidBrowseResult<u64> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| StorageError::LockPoisoned)?;
        let before = entries.len();
        entries.retain(|key, _| key.namespace() != namespace.as_str());
        Ok((before - entries.len()) as u64)
    }

    async fn stats(&self) -> DidBrowseResult<CacheStats> {
        let entry_count = self
            .entries
            .read()
            .map_err(|_| StorageError::LockPoisoned)?
            .len() as u64;
        let stats = self
            .stats
            .read()
            .map_err(|_| StorageError::LockPoisoned)?
            .clone();
        Ok(CacheStats {
            entry_count,
            ..stats
        })
    }
}
