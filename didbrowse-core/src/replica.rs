//! Raw replica records and their normalization into [`AttachedFile`].

use serde::{Deserialize, Serialize};

use crate::did::DID_SEPARATOR;
use crate::file::AttachedFile;

/// One replica record as reported by the remote replica service.
///
/// Transient: converted into [`AttachedFile`] as soon as it is received and
/// never cached in this shape. Unknown fields in the remote payload are
/// ignored on deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplicaRecord {
    pub scope: String,
    pub name: String,
    pub bytes: u64,
}

impl ReplicaRecord {
    pub fn new(scope: impl Into<String>, name: impl Into<String>, bytes: u64) -> Self {
        Self {
            scope: scope.into(),
            name: name.into(),
            bytes,
        }
    }
}

/// Map one replica record to the canonical attached-file shape.
pub fn normalize_replica(record: &ReplicaRecord) -> AttachedFile {
    AttachedFile {
        did: format!("{}{}{}", record.scope, DID_SEPARATOR, record.name),
        size: record.bytes,
    }
}

/// Normalize a batch of replica records, preserving order.
pub fn normalize_replicas(records: &[ReplicaRecord]) -> Vec<AttachedFile> {
    records.iter().map(normalize_replica).collect()
}

impl From<ReplicaRecord> for AttachedFile {
    fn from(record: ReplicaRecord) -> Self {
        normalize_replica(&record)
    }
}
