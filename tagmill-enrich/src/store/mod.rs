//! Object storage boundary
//!
//! The enrichment pipeline only ever talks to storage through the
//! [`ObjectStorage`] trait; [`remote::RemoteObjectStore`] adapts the
//! `object_store` crate's URL-configured backends (`s3://`, `file://`,
//! `memory:///`) to it. Tests inject their own implementations for fault
//! injection.

pub mod remote;

pub use remote::RemoteObjectStore;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// Object not present in the store
    #[error("object not found: {0}")]
    NotFound(String),

    /// Any backend-reported failure (permission, transient, protocol)
    #[error("storage backend error: {0}")]
    Backend(String),
}

impl From<object_store::Error> for StorageError {
    fn from(err: object_store::Error) -> Self {
        match err {
            object_store::Error::NotFound { path, .. } => StorageError::NotFound(path),
            other => StorageError::Backend(other.to_string()),
        }
    }
}

/// Contract expected of the object storage system.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// List object keys under `prefix`, capped at `max_keys`.
    ///
    /// Single page only: the listing never requests further pages even when
    /// more objects exist beyond the cap.
    async fn list_keys(&self, prefix: &str, max_keys: usize)
        -> Result<Vec<String>, StorageError>;

    /// Read an object's full content. Used to load the reference dataset
    /// when it is held in the store.
    async fn fetch_bytes(&self, key: &str) -> Result<Vec<u8>, StorageError>;

    /// Full-replace metadata write: the object's metadata becomes a single
    /// field holding the JSON-serialized document; content is preserved.
    async fn write_metadata(&self, key: &str, metadata: &Value) -> Result<(), StorageError>;
}
