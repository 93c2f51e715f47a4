//! Dataset identifiers and instance namespaces.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Separator between scope and name in the combined identifier.
pub const DID_SEPARATOR: char = ':';

/// A dataset identifier: a `(scope, name)` pair.
///
/// Both halves are non-empty. The canonical rendering is `scope:name`, which
/// is also the form used in cache keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Did {
    scope: String,
    name: String,
}

impl Did {
    /// Build a DID from its two halves.
    pub fn new(scope: impl Into<String>, name: impl Into<String>) -> Result<Self, ValidationError> {
        let scope = scope.into();
        let name = name.into();

        if scope.is_empty() {
            return Err(ValidationError::RequiredFieldMissing {
                field: "scope".to_string(),
            });
        }
        if name.is_empty() {
            return Err(ValidationError::RequiredFieldMissing {
                field: "name".to_string(),
            });
        }

        Ok(Self { scope, name })
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Consume the DID and return `(scope, name)`.
    pub fn into_parts(self) -> (String, String) {
        (self.scope, self.name)
    }
}

impl fmt::Display for Did {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.scope, DID_SEPARATOR, self.name)
    }
}

/// Parses `scope:name`, splitting on the first separator.
///
/// Names may themselves contain `:`; scopes may not.
impl FromStr for Did {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (scope, name) =
            s.split_once(DID_SEPARATOR)
                .ok_or_else(|| ValidationError::InvalidValue {
                    field: "did".to_string(),
                    reason: format!("expected scope:name, got '{}'", s),
                })?;

        Did::new(scope, name).map_err(|_| ValidationError::InvalidValue {
            field: "did".to_string(),
            reason: format!("scope and name must be non-empty in '{}'", s),
        })
    }
}

/// Name of a configured remote instance.
///
/// Every cache key is partitioned by namespace so two instances never share
/// entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Namespace(String);

impl Namespace {
    pub fn new(name: impl Into<String>) -> Result<Self, ValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ValidationError::RequiredFieldMissing {
                field: "namespace".to_string(),
            });
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Namespace {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
