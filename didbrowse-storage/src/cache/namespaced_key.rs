//! Namespace-scoped cache keys.
//!
//! A `NamespacedDidKey` can only be built from a namespace and a DID, so no
//! store operation can address an entry without naming the remote instance
//! it belongs to.

use didbrowse_core::{Did, Namespace};
use sha2::{Digest, Sha256};

/// Separator byte between the namespace and the DID.
///
/// 0xFF never occurs in UTF-8, so the split is unambiguous.
const SEPARATOR: u8 = 0xFF;

/// Marks a DID stored as its SHA-256 digest. Also never valid UTF-8.
const DIGEST_MARKER: u8 = 0xFE;

/// Largest key LMDB accepts with its default build options.
pub const MAX_ENCODED_KEY_LEN: usize = 511;

/// A cache key scoped to one remote instance.
///
/// # Binary Format
///
/// `[namespace utf-8][0xFF][scope:name utf-8]`
///
/// When that would exceed [`MAX_ENCODED_KEY_LEN`], the DID part is replaced
/// by `[0xFE][sha256(scope:name)]`. Keys sort by namespace first in both
/// forms, so a prefix scan over [`NamespacedDidKey::namespace_prefix`]
/// visits exactly one instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NamespacedDidKey {
    inner: KeyInner,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct KeyInner {
    namespace: String,
    did: String,
}

impl NamespacedDidKey {
    pub fn new(namespace: &Namespace, did: &Did) -> Self {
        Self {
            inner: KeyInner {
                namespace: namespace.as_str().to_string(),
                did: did.to_string(),
            },
        }
    }

    pub fn namespace(&self) -> &str {
        &self.inner.namespace
    }

    /// The combined `scope:name` identifier.
    pub fn did(&self) -> &str {
        &self.inner.did
    }

    /// Whether [`encode`](Self::encode) falls back to the digest form.
    pub fn is_digested(&self) -> bool {
        self.inner.namespace.len() + 1 + self.inner.did.len() > MAX_ENCODED_KEY_LEN
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.inner.namespace.len() + 1 + self.inner.did.len());
        bytes.extend_from_slice(self.inner.namespace.as_bytes());
        bytes.push(SEPARATOR);

        if self.is_digested() {
            bytes.push(DIGEST_MARKER);
            bytes.extend_from_slice(&Sha256::digest(self.inner.did.as_bytes()));
        } else {
            bytes.extend_from_slice(self.inner.did.as_bytes());
        }
        bytes
    }

    /// Prefix shared by every key of a namespace.
    pub fn namespace_prefix(namespace: &Namespace) -> Vec<u8> {
        let mut prefix = Vec::with_capacity(namespace.as_str().len() + 1);
        prefix.extend_from_slice(namespace.as_str().as_bytes());
        prefix.push(SEPARATOR);
        prefix
    }
}
