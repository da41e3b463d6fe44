//! Storage abstraction trait
//!
//! This module defines the AssetStore trait that storage backends implement.

use async_trait::async_trait;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage name: {0}")]
    InvalidName(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage abstraction trait
///
/// Backends persist raw asset bytes keyed by a sanitized filename and
/// project stored names into public paths. Names are plain filenames with
/// no directory components; backends must reject anything else.
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Write bytes under the storage root and return the stored name.
    /// An existing file of the same name is overwritten.
    async fn store(&self, filename: &str, data: Vec<u8>) -> StorageResult<String>;

    /// Delete a stored file. Deleting a missing file is not an error.
    async fn delete(&self, filename: &str) -> StorageResult<()>;

    /// Check whether a file exists under the storage root.
    async fn exists(&self, filename: &str) -> StorageResult<bool>;

    /// Public path for a stored name, e.g. `/img/thanks/{name}`.
    fn public_path(&self, filename: &str) -> String;
}
