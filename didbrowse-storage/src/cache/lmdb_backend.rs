//! LMDB-backed attached-file store.
//!
//! Uses the heed crate (Rust bindings for LMDB) so cached file lists survive
//! restarts of the server.
//!
//! # Layout
//!
//! One unnamed database. Keys are [`NamespacedDidKey`] encodings; values are
//! JSON-encoded [`CachedFileList`] envelopes carrying the write timestamp
//! used for TTL checks. DIDs too long for an LMDB key are stored under
//! their digest.

use std::path::Path;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;
use didbrowse_core::{AttachedFile, Did, DidBrowseError, DidBrowseResult, Namespace, StorageError};
use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions};

use super::entry::{CachedFileList, StoreConfig};
use super::namespaced_key::NamespacedDidKey;
use super::traits::{AttachedFilesStore, CacheStats};

/// Error type for LMDB store operations.
#[derive(Debug, thiserror::Error)]
pub enum LmdbStoreError {
    /// Failed to open or create the LMDB environment.
    #[error("Failed to open LMDB environment: {0}")]
    EnvOpen(String),

    /// Failed to open the database within the environment.
    #[error("Failed to open database: {0}")]
    DbOpen(String),

    #[error("Transaction error: {0}")]
    Transaction(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<LmdbStoreError> for DidBrowseError {
    fn from(e: LmdbStoreError) -> Self {
        DidBrowseError::Storage(StorageError::TransactionFailed {
            reason: e.to_string(),
        })
    }
}

fn txn_err(e: heed::Error) -> LmdbStoreError {
    LmdbStoreError::Transaction(e.to_string())
}

pub struct LmdbAttachedFilesStore {
    env: Env,
    db: Database<Bytes, Bytes>,
    stats: RwLock<CacheStats>,
    config: StoreConfig,
}

impl LmdbAttachedFilesStore {
    /// Open (or create) a store under `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the map size overflows, the directory cannot be
    /// created, or the LMDB environment or database cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P, config: StoreConfig) -> Result<Self, LmdbStoreError> {
        let map_size = config
            .max_size_mb
            .checked_mul(1024 * 1024)
            .ok_or_else(|| {
                LmdbStoreError::EnvOpen(format!(
                    "map size of {} MB does not fit in usize",
                    config.max_size_mb
                ))
            })?;

        std::fs::create_dir_all(&path)?;

        // SAFETY: the environment is opened once per path by this process and
        // never concurrently memory-mapped with incompatible options.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(1)
                .open(path.as_ref())
        }
        .map_err(|e| LmdbStoreError::EnvOpen(e.to_string()))?;

        let mut wtxn = env.write_txn().map_err(txn_err)?;
        let db: Database<Bytes, Bytes> = env
            .create_database(&mut wtxn, None)
            .map_err(|e| LmdbStoreError::DbOpen(e.to_string()))?;
        wtxn.commit().map_err(txn_err)?;

        Ok(Self {
            env,
            db,
            stats: RwLock::new(CacheStats::default()),
            config,
        })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    fn record<F: FnOnce(&mut CacheStats)>(&self, f: F) {
        if let Ok(mut stats) = self.stats.write() {
            f(&mut stats);
        }
    }

    fn read_entry(&self, key: &NamespacedDidKey) -> DidBrowseResult<Option<CachedFileList>> {
        let rtxn = self.env.read_txn().map_err(txn_err)?;
        let Some(bytes) = self.db.get(&rtxn, &key.encode()).map_err(txn_err)? else {
            return Ok(None);
        };

        let entry = serde_json::from_slice(bytes).map_err(|e| StorageError::DecodeFailed {
            did: key.did().to_string(),
            reason: e.to_string(),
        })?;
        Ok(Some(entry))
    }

    fn write_entry(&self, key: &NamespacedDidKey, entry: &CachedFileList) -> DidBrowseResult<()> {
        let value = serde_json::to_vec(entry).map_err(|e| StorageError::EncodeFailed {
            did: key.did().to_string(),
            reason: e.to_string(),
        })?;

        let mut wtxn = self.env.write_txn().map_err(txn_err)?;
        self.db
            .put(&mut wtxn, &key.encode(), &value)
            .map_err(txn_err)?;
        wtxn.commit().map_err(txn_err)?;
        Ok(())
    }

    /// Insert an entry with an explicit envelope, bypassing the clock.
    pub fn insert_entry(
        &self,
        namespace: &Namespace,
        did: &Did,
        entry: CachedFileList,
    ) -> DidBrowseResult<()> {
        self.write_entry(&NamespacedDidKey::new(namespace, did), &entry)
    }

    fn collect_keys_with_prefix(&self, prefix: &[u8]) -> Result<Vec<Vec<u8>>, LmdbStoreError> {
        let rtxn = self.env.read_txn().map_err(txn_err)?;
        let iter = self.db.prefix_iter(&rtxn, prefix).map_err(txn_err)?;

        let mut keys = Vec::new();
        for result in iter {
            let (key, _) = result.map_err(txn_err)?;
            keys.push(key.to_vec());
        }
        Ok(keys)
    }
}

#[async_trait]
impl AttachedFilesStore for LmdbAttachedFilesStore {
    async fn get_attached_files(
        &self,
        namespace: &Namespace,
        did: &Did,
    ) -> DidBrowseResult<Option<Vec<AttachedFile>>> {
        let key = NamespacedDidKey::new(namespace, did);

        match self.read_entry(&key)? {
            Some(entry) if entry.is_expired(self.config.entry_ttl, Utc::now()) => {
                self.record(|s| {
                    s.expired += 1;
                    s.misses += 1;
                });
                Ok(None)
            }
            Some(entry) => {
                self.record(|s| s.hits += 1);
                Ok(Some(entry.files))
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
        let mut wtxn = self.env.write_txn().map_err(txn_err)?;
        let deleted = self.db.delete(&mut wtxn, &key.encode()).map_err(txn_err)?;
        wtxn.commit().map_err(txn_err)?;
        Ok(deleted)
    }

    async fn invalidate_namespace(&self, namespace: &Namespace) -> DidBrowseResult<u64> {
        let prefix = NamespacedDidKey::namespace_prefix(namespace);
        let keys_to_delete = self.collect_keys_with_prefix(&prefix)?;

        let mut wtxn = self.env.write_txn().map_err(txn_err)?;
        let mut deleted = 0u64;
        for key in &keys_to_delete {
            if self.db.delete(&mut wtxn, key).map_err(txn_err)? {
                deleted += 1;
            }
        }
        wtxn.commit().map_err(txn_err)?;

        Ok(deleted)
    }

    async fn stats(&self) -> DidBrowseResult<CacheStats> {
        let entry_count = {
            let rtxn = self.env.read_txn().map_err(txn_err)?;
            self.db.len(&rtxn).map_err(txn_err)?
        };
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
