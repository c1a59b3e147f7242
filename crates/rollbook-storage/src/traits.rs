//! Storage abstraction trait

use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;
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

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<StorageError> for rollbook_core::AppError {
    fn from(err: StorageError) -> Self {
        rollbook_core::AppError::Storage(err.to_string())
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage abstraction trait
///
/// All backends (S3, local filesystem) implement this so the ingestion
/// workflows never couple to a specific provider. Keys are produced by the
/// `naming` module; see the crate root documentation for the key layout.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Store `data` under `key`, overwriting any existing object.
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> StorageResult<()>;

    /// Delete the object at `key`. Deleting a missing object is an error
    /// for S3-compatible backends only when the backend reports it as one.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Check whether an object exists at `key`.
    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Publicly accessible URL for the object at `key`.
    fn public_url(&self, key: &str) -> String;

    /// Time-limited URL granting direct read access to the object.
    async fn signed_url(&self, key: &str, expires_in: Duration) -> StorageResult<String>;
}
