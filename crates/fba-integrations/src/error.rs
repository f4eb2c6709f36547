//! Error types for integration settings
//!
//! Only [`IntegrationError::NotFound`] reaches UI code in practice: storage
//! and codec failures are logged and degrade to defaults inside the store.

use std::path::PathBuf;

/// Integration store errors
#[derive(Debug, thiserror::Error)]
pub enum IntegrationError {
    /// No integration with this id in the catalog
    #[error("integration not found: '{0}'")]
    NotFound(String),

    /// Durable storage failed
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Settings could not be encoded
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
}

impl IntegrationError {
    /// Check if this is the not-found kind
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Key-value storage errors
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Key cannot be mapped to a storage location
    #[error("invalid storage key: '{0}'")]
    InvalidKey(String),

    /// IO error on the backing file
    #[error("io error on {path}: {source}")]
    Io {
        /// File the operation touched
        path: PathBuf,
        /// Underlying IO failure
        #[source]
        source: std::io::Error,
    },
}

impl StorageError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Persisted payload errors
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// Payload is not a recognizable settings document
    #[error("corrupt payload: {0}")]
    Corrupt(#[from] serde_json::Error),

    /// Payload written by a newer schema
    #[error("unsupported schema version {found} (max {supported})")]
    UnsupportedVersion {
        /// Version recorded in the payload
        found: u32,
        /// Newest version this build reads
        supported: u32,
    },
}

/// Result type alias for integration operations
pub type IntegrationResult<T> = Result<T, IntegrationError>;
