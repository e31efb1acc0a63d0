//! Storage abstraction trait
//!
//! This module defines the ObjectSink trait that all storage backends must implement.

use crate::StorageBackend;
use async_trait::async_trait;
use thiserror::Error;
use tokio::io::AsyncRead;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Byte source handed to a sink. Consumed until EOF.
pub type UploadReader<'a> = &'a mut (dyn AsyncRead + Send + Unpin);

/// Storage abstraction trait
///
/// A sink takes ownership of the bytes under a caller-chosen key and returns the URL
/// the object can be fetched from. Keys are derived by the caller (see `keys`); a sink
/// never invents one.
#[async_trait]
pub trait ObjectSink: Send + Sync {
    /// Stream `reader` to `key` and return the public URL of the stored object.
    ///
    /// An existing object under the same key is replaced.
    async fn store(
        &self,
        key: &str,
        content_type: &str,
        reader: UploadReader<'_>,
    ) -> StorageResult<String>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
