//! didbrowse Storage - Cache Stores and Fetch Coordination
//!
//! Defines the attached-file store abstraction, its in-memory and LMDB
//! implementations, and the resolver that decides between cache and remote.

pub mod cache;
pub mod resolver;

pub use cache::{
    AttachedFilesStore, CacheRead, CacheStats, CachedFileList, InMemoryAttachedFilesStore,
    LmdbAttachedFilesStore, LmdbStoreError, NamespacedDidKey, ReadSource, StoreConfig,
};
pub use resolver::{AttachedFilesResolver, ReplicaSource};
