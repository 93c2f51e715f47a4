//! Provenance of a resolved file list.
//!
//! The coordinator hands back a [`CacheRead`] so callers that care (metrics,
//! logging) can tell a cache hit from a remote fetch without changing the
//! shape of the data itself.

/// Where a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReadSource {
    /// Served from a live cache entry.
    Cache,
    /// Cache miss, fetched from the remote instance.
    Remote,
    /// Cache skipped on request, fetched from the remote instance.
    ForcedRemote,
}

impl ReadSource {
    /// Label used for logging and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cache => "hit",
            Self::Remote => "miss",
            Self::ForcedRemote => "bypass",
        }
    }
}

/// Result of a cache-aware read, carrying provenance metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheRead<T> {
    value: T,
    source: ReadSource,
}

impl<T> CacheRead<T> {
    /// Create a read served from the cache.
    pub fn from_cache(value: T) -> Self {
        Self {
            value,
            source: ReadSource::Cache,
        }
    }

    /// Create a read fetched from the remote instance.
    pub fn from_remote(value: T, forced: bool) -> Self {
        let source = if forced {
            ReadSource::ForcedRemote
        } else {
            ReadSource::Remote
        };
        Self { value, source }
    }

    /// Consume the wrapper and return the underlying value.
    pub fn into_value(self) -> T {
        self.value
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn source(&self) -> ReadSource {
        self.source
    }

    pub fn was_cache_hit(&self) -> bool {
        self.source == ReadSource::Cache
    }
}
