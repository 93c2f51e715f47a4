//! API Configuration Module
//!
//! Configuration for the remote instances and the attached-files cache.
//! Everything is loaded from environment variables; only the instance list
//! is mandatory.

use std::path::PathBuf;
use std::time::Duration;

use didbrowse_core::{ConfigError, InstanceConfig, Namespace};
use didbrowse_storage::StoreConfig;

pub const INSTANCES_VAR: &str = "DIDBROWSE_INSTANCES";
pub const ACTIVE_INSTANCE_VAR: &str = "DIDBROWSE_ACTIVE_INSTANCE";
pub const REMOTE_TIMEOUT_VAR: &str = "DIDBROWSE_REMOTE_TIMEOUT_MS";
pub const CACHE_BACKEND_VAR: &str = "DIDBROWSE_CACHE_BACKEND";
pub const CACHE_PATH_VAR: &str = "DIDBROWSE_CACHE_PATH";
pub const CACHE_MAX_SIZE_VAR: &str = "DIDBROWSE_CACHE_MAX_SIZE_MB";
pub const CACHE_TTL_VAR: &str = "DIDBROWSE_CACHE_TTL_SECS";

const DEFAULT_REMOTE_TIMEOUT_MS: u64 = 30_000;
const DEFAULT_CACHE_PATH: &str = "./didbrowse-cache";

// ============================================================================
// CACHE BACKEND
// ============================================================================

/// Which [`AttachedFilesStore`](didbrowse_storage::AttachedFilesStore) the
/// server runs with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheBackendKind {
    /// Process-local map, lost on restart.
    Memory,
    /// LMDB environment rooted at the given directory.
    Lmdb { path: PathBuf },
}

// ============================================================================
// API CONFIGURATION
// ============================================================================

#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Remote replica-service instances, addressed by namespace.
    pub instances: Vec<InstanceConfig>,

    /// Instance clients should preselect; must be one of `instances`.
    pub active_instance: Option<Namespace>,

    /// Per-request timeout for the remote replica service.
    pub remote_timeout: Duration,

    pub cache_backend: CacheBackendKind,

    /// TTL and LMDB map size.
    pub store: StoreConfig,
}

impl ApiConfig {
    /// Create ApiConfig from environment variables.
    ///
    /// Environment variables:
    /// - `DIDBROWSE_INSTANCES`: comma-separated `name=url` list (required)
    /// - `DIDBROWSE_ACTIVE_INSTANCE`: preselected instance name (optional)
    /// - `DIDBROWSE_REMOTE_TIMEOUT_MS`: remote request timeout (default: 30000)
    /// - `DIDBROWSE_CACHE_BACKEND`: "memory" or "lmdb" (default: memory)
    /// - `DIDBROWSE_CACHE_PATH`: LMDB directory (default: ./didbrowse-cache)
    /// - `DIDBROWSE_CACHE_MAX_SIZE_MB`: LMDB map size (default: 100)
    /// - `DIDBROWSE_CACHE_TTL_SECS`: entry lifetime (default: 86400)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_instances = lookup(INSTANCES_VAR).ok_or_else(|| ConfigError::MissingRequired {
            field: INSTANCES_VAR.to_string(),
        })?;
        let instances = InstanceConfig::parse_list(INSTANCES_VAR, &raw_instances)?;
        let active_instance = parse_active_instance(&lookup, &instances)?;

        let remote_timeout = Duration::from_millis(
            parse_or(&lookup, REMOTE_TIMEOUT_VAR, DEFAULT_REMOTE_TIMEOUT_MS)?,
        );

        let defaults = StoreConfig::default();
        let max_size_mb: usize = parse_or(&lookup, CACHE_MAX_SIZE_VAR, defaults.max_size_mb)?;
        if max_size_mb.checked_mul(1024 * 1024).is_none() {
            return Err(ConfigError::InvalidValue {
                field: CACHE_MAX_SIZE_VAR.to_string(),
                value: max_size_mb.to_string(),
                reason: "map size overflows usize".to_string(),
            });
        }

        let store = StoreConfig::new()
            .with_ttl(Duration::from_secs(parse_or(
                &lookup,
                CACHE_TTL_VAR,
                defaults.entry_ttl.as_secs(),
            )?))
            .with_max_size_mb(max_size_mb);

        let cache_backend = match lookup(CACHE_BACKEND_VAR)
            .map(|s| s.trim().to_lowercase())
            .as_deref()
        {
            None | Some("") | Some("memory") => CacheBackendKind::Memory,
            Some("lmdb") => CacheBackendKind::Lmdb {
                path: lookup(CACHE_PATH_VAR)
                    .unwrap_or_else(|| DEFAULT_CACHE_PATH.to_string())
                    .into(),
            },
            Some(other) => {
                return Err(ConfigError::InvalidValue {
                    field: CACHE_BACKEND_VAR.to_string(),
                    value: other.to_string(),
                    reason: "expected memory or lmdb".to_string(),
                })
            }
        };

        Ok(Self {
            instances,
            active_instance,
            remote_timeout,
            cache_backend,
            store,
        })
    }
}

fn parse_active_instance<F>(
    lookup: &F,
    instances: &[InstanceConfig],
) -> Result<Option<Namespace>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(ACTIVE_INSTANCE_VAR) else {
        return Ok(None);
    };
    let name = raw.trim();
    if name.is_empty() {
        return Ok(None);
    }

    instances
        .iter()
        .find(|i| i.name.as_str() == name)
        .map(|i| Some(i.name.clone()))
        .ok_or_else(|| ConfigError::InvalidValue {
            field: ACTIVE_INSTANCE_VAR.to_string(),
            value: raw.clone(),
            reason: format!("not listed in {}", INSTANCES_VAR),
        })
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
            field: key.to_string(),
            value: raw.clone(),
            reason: "expected a non-negative integer".to_string(),
        }),
    }
}
