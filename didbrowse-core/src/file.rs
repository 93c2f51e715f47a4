//! Attached-file records returned to callers.

use serde::{Deserialize, Serialize};

/// A file attached to a dataset, in canonical shape.
///
/// `did` is the combined `scope:name` of the file itself and `size` is its
/// byte count. This is the only shape callers ever observe, whether the
/// record came from the cache or from a remote fetch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttachedFile {
    pub did: String,
    pub size: u64,
}

impl AttachedFile {
    pub fn new(did: impl Into<String>, size: u64) -> Self {
        Self {
            did: did.into(),
            size,
        }
    }
}
