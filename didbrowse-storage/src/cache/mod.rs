//! Attached-file cache stores.
//!
//! Every entry is keyed by `(namespace, scope:name)` through
//! [`NamespacedDidKey`], so file lists fetched from two remote instances never
//! share an entry.
//!
//! # Absence marker
//!
//! Stores answer reads with `Option<Vec<AttachedFile>>`. `None` means "no
//! live entry" and sends the resolver to the remote instance; `Some(vec![])`
//! is a cached dataset with zero files and is served like any other hit.
//!
//! # Backends
//!
//! - [`InMemoryAttachedFilesStore`]: process-local, used by default and in tests.
//! - [`LmdbAttachedFilesStore`]: persistent, memory-mapped via heed.

pub mod entry;
pub mod freshness;
pub mod lmdb_backend;
pub mod memory_backend;
pub mod namespaced_key;
pub mod traits;

pub use entry::{CachedFileList, StoreConfig};
pub use freshness::{CacheRead, ReadSource};
pub use lmdb_backend::{LmdbAttachedFilesStore, LmdbStoreError};
pub use memory_backend::InMemoryAttachedFilesStore;
pub use namespaced_key::NamespacedDidKey;
pub use traits::{AttachedFilesStore, CacheStats};
