//! Configuration types

use serde::{Deserialize, Serialize};

use crate::did::Namespace;
use crate::error::ConfigError;

/// A configured remote replica-service instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceConfig {
    pub name: Namespace,
    pub base_url: String,
}

impl InstanceConfig {
    pub fn new(name: Namespace, base_url: impl Into<String>) -> Self {
        Self {
            name,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Parse a comma-separated `name=url` list, e.g.
    /// `atlas=https://rucio-atlas.example.org,cms=https://rucio-cms.example.org`.
    ///
    /// The list must contain at least one entry and names must be unique.
    pub fn parse_list(field: &str, raw: &str) -> Result<Vec<InstanceConfig>, ConfigError> {
        let mut instances: Vec<InstanceConfig> = Vec::new();

        for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (name, url) = entry
                .split_once('=')
                .ok_or_else(|| invalid(field, entry, "expected name=url"))?;

            let name = Namespace::new(name.trim())
                .map_err(|_| invalid(field, entry, "instance name is empty"))?;

            let url = url.trim();
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(invalid(field, entry, "url must start with http:// or https://"));
            }

            if instances.iter().any(|i| i.name == name) {
                return Err(invalid(field, entry, "duplicate instance name"));
            }

            instances.push(InstanceConfig::new(name, url));
        }

        if instances.is_empty() {
            return Err(ConfigError::MissingRequired {
                field: field.to_string(),
            });
        }

        Ok(instances)
    }
}

fn invalid(field: &str, value: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
