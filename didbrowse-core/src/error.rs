//! Error types for didbrowse operations

use thiserror::Error;

/// Cache store errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Transaction failed: {reason}")]
    TransactionFailed { reason: String },

    #[error("Failed to encode cache entry for {did}: {reason}")]
    EncodeFailed { did: String, reason: String },

    #[error("Failed to decode cache entry for {did}: {reason}")]
    DecodeFailed { did: String, reason: String },

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

/// Remote replica service errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RemoteError {
    #[error("Request to {instance} failed: {reason}")]
    RequestFailed { instance: String, reason: String },

    #[error("Request to {instance} failed with status {status}: {message}")]
    Status {
        instance: String,
        status: u16,
        message: String,
    },

    #[error("Request to {instance} timed out")]
    Timeout { instance: String },

    #[error("Invalid response from {instance}: {reason}")]
    InvalidResponse { instance: String, reason: String },
}

/// Validation errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field missing: {field}")]
    RequiredFieldMissing { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration field: {field}")]
    MissingRequired { field: String },

    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Master error type for all didbrowse errors.
#[derive(Debug, Clone, Error)]
pub enum DidBrowseError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Remote error: {0}")]
    Remote(#[from] RemoteError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type alias for didbrowse operations.
pub type DidBrowseResult<T> = Result<T, DidBrowseError>;

// =============================================================================
// TESTS
// =============================================================================
