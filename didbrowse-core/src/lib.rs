//! didbrowse Core - Data Types
//!
//! Identifiers, attached-file records, raw replica records and the single
//! normalization between them. All other crates depend on this one.

pub mod config;
pub mod did;
pub mod error;
pub mod file;
pub mod replica;

use chrono::{DateTime, Utc};

pub use config::InstanceConfig;
pub use did::{Did, Namespace, DID_SEPARATOR};
pub use error::{
    ConfigError, DidBrowseError, DidBrowseResult, RemoteError, StorageError, ValidationError,
};
pub use file::AttachedFile;
pub use replica::{normalize_replica, normalize_replicas, ReplicaRecord};

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;
