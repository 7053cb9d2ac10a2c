//! Error types for COURIER operations

use crate::resource::ResourceKind;
use thiserror::Error;

/// Storage layer errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    /// Durable storage could not be updated. The previous state is retained.
    #[error("Persistence failure: {reason}")]
    PersistenceFailure { reason: String },

    /// Durable storage was empty or undecodable. Never surfaced past the store.
    #[error("Cache miss: {reason}")]
    CacheMiss { reason: String },

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

/// Asset resolution errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AssetError {
    #[error("Asset unavailable at {url}: {reason}")]
    Unavailable { url: String, reason: String },

    #[error("Resource not found: {kind} named {name:?}")]
    ResourceNotFound { kind: ResourceKind, name: String },

    #[error("Package metadata unavailable: {reason}")]
    PackageUnavailable { reason: String },

    #[error("Resource name is empty")]
    EmptyName,

    #[error("Failed to initialize HTTP client: {reason}")]
    ClientInit { reason: String },
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
    #[error("Missing configuration file path (use --config or COURIER_CONFIG)")]
    MissingConfigPath,

    #[error("Failed to read config file {path}: {reason}")]
    Unreadable { path: String, reason: String },

    #[error("Failed to parse config: {reason}")]
    Parse { reason: String },

    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Master error type for all COURIER errors.
#[derive(Debug, Clone, Error)]
pub enum CourierError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Asset error: {0}")]
    Asset(#[from] AssetError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type alias for COURIER operations.
pub type CourierResult<T> = Result<T, CourierError>;

impl CourierError {
    /// Returns true if this is a write-path persistence failure.
    pub fn is_persistence_failure(&self) -> bool {
        matches!(
            self,
            CourierError::Storage(StorageError::PersistenceFailure { .. })
        )
    }
}

// =============================================================================
// TESTS
// =============================================================================
