//! Error types for layerstack.
//!
//! Store actions never fail; these errors only surface at the persistence,
//! configuration and CLI boundaries.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for layerstack operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors raised outside the action API.
#[derive(Error, Debug)]
pub enum StoreError {
    // Storage Errors
    #[error("Failed to read storage entry: {path}: {source}")]
    StorageRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write storage entry: {path}: {source}")]
    StorageWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Directory creation failed: {path}: {source}")]
    DirectoryCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid storage key: {key}")]
    InvalidKey { key: String },

    // Serialization Errors
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unsupported autosave version: {found} (this build reads up to {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    // Configuration Errors
    #[error("Failed to read config file: {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    // Lookup Errors (CLI only; actions treat unknown ids as no-ops)
    #[error("Unknown material: {name}")]
    UnknownMaterial { name: String },
}

impl StoreError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            StoreError::StorageRead { .. } => "STORAGE_READ",
            StoreError::StorageWrite { .. } => "STORAGE_WRITE",
            StoreError::DirectoryCreate { .. } => "DIRECTORY_CREATE",
            StoreError::InvalidKey { .. } => "INVALID_KEY",
            StoreError::Serialization(_) => "SERIALIZATION_ERROR",
            StoreError::UnsupportedVersion { .. } => "UNSUPPORTED_VERSION",
            StoreError::ConfigRead { .. } => "CONFIG_READ",
            StoreError::InvalidConfig { .. } => "INVALID_CONFIG",
            StoreError::UnknownMaterial { .. } => "UNKNOWN_MATERIAL",
        }
    }

    /// Returns a user-friendly recovery suggestion.
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            StoreError::StorageWrite { .. } | StoreError::DirectoryCreate { .. } => {
                Some("Check that the storage directory is writable; the next change retries the save.")
            }
            StoreError::Serialization(_) => {
                Some("The saved session is corrupted. Run 'layerstack-cli reset' to start fresh.")
            }
            StoreError::UnsupportedVersion { .. } => {
                Some("The session was saved by a newer release. Upgrade to open it.")
            }
            StoreError::ConfigRead { .. } => {
                Some("Check the --config path, or omit it to use defaults.")
            }
            StoreError::UnknownMaterial { .. } => {
                Some("Run 'layerstack-cli materials' to list the catalog.")
            }
            _ => None,
        }
    }
}
