//! `object_store`-backed implementation of the storage boundary

use super::{ObjectStorage, StorageError};
use async_trait::async_trait;
use futures::TryStreamExt;
use object_store::path::Path as StorePath;
use object_store::{Attribute, AttributeValue, Attributes, ObjectStore, PutOptions};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

/// Metadata field holding the serialized combined document
pub const METADATA_FIELD: &str = "enrichment-metadata";

/// Object storage adapter over a URL-configured `object_store` backend.
pub struct RemoteObjectStore {
    inner: Arc<dyn ObjectStore>,
}

impl RemoteObjectStore {
    pub fn new(inner: Arc<dyn ObjectStore>) -> Self {
        Self { inner }
    }

    /// Build a store from a URL such as `s3://bucket`, `file:///data`, or
    /// `memory:///`. Credentials for `s3://` come from the environment.
    pub fn from_url(store_url: &str) -> Result<Self, StorageError> {
        let url = url::Url::parse(store_url)
            .map_err(|e| StorageError::Backend(format!("invalid store URL {store_url}: {e}")))?;
        let (inner, _path) = object_store::parse_url(&url)?;
        info!("Object store backend: {}", inner);
        Ok(Self {
            inner: Arc::from(inner),
        })
    }
}

#[async_trait]
impl ObjectStorage for RemoteObjectStore {
    async fn list_keys(
        &self,
        prefix: &str,
        max_keys: usize,
    ) -> Result<Vec<String>, StorageError> {
        let list_prefix = if prefix.is_empty() {
            None
        } else {
            Some(StorePath::from(prefix))
        };

        // One page only: stop pulling from the stream at the cap.
        let mut stream = self.inner.list(list_prefix.as_ref());
        let mut keys = Vec::new();
        while keys.len() < max_keys {
            match stream.try_next().await? {
                Some(meta) => keys.push(meta.location.to_string()),
                None => break,
            }
        }

        debug!(prefix, count = keys.len(), "listed object keys");
        Ok(keys)
    }

    async fn fetch_bytes(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        let result = self.inner.get(&StorePath::from(key)).await?;
        let bytes = result.bytes().await?;
        Ok(bytes.to_vec())
    }

    async fn write_metadata(&self, key: &str, metadata: &Value) -> Result<(), StorageError> {
        let serialized = serde_json::to_string(metadata)
            .map_err(|e| StorageError::Backend(format!("metadata serialization failed: {e}")))?;

        // Replace-on-copy: re-put the object's own content with the new
        // metadata attribute, dropping whatever attributes it carried.
        let path = StorePath::from(key);
        let body = self.inner.get(&path).await?.bytes().await?;

        let mut attributes = Attributes::new();
        attributes.insert(
            Attribute::Metadata(METADATA_FIELD.into()),
            AttributeValue::from(serialized),
        );
        let options = PutOptions {
            attributes,
            ..Default::default()
        };

        self.inner.put_opts(&path, body.into(), options).await?;
        debug!(key, "object metadata replaced");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use object_store::memory::InMemory;
    use object_store::PutPayload;
    use serde_json::json;

    async fn seeded_store(keys: &[&str]) -> RemoteObjectStore {
        let inner = Arc::new(InMemory::new());
        for key in keys {
            inner
                .put(&StorePath::from(*key), PutPayload::from_static(b"body"))
                .await
                .unwrap();
        }
        RemoteObjectStore::new(inner)
    }

    #[tokio::test]
    async fn test_list_keys_with_prefix() {
        let store = seeded_store(&["in/a.xml", "in/b.xml", "out/c.xml"]).await;
        let keys = store.list_keys("in", 100).await.unwrap();
        assert_eq!(keys.len(), 2);
        assert!(keys.iter().all(|k| k.starts_with("in/")));
    }

    #[tokio::test]
    async fn test_list_keys_respects_cap() {
        let store = seeded_store(&["a", "b", "c", "d"]).await;
        let keys = store.list_keys("", 2).await.unwrap();
        assert_eq!(keys.len(), 2);
    }

    #[tokio::test]
    async fn test_fetch_bytes_roundtrip() {
        let store = seeded_store(&["data.csv"]).await;
        assert_eq!(store.fetch_bytes("data.csv").await.unwrap(), b"body");
    }

    #[tokio::test]
    async fn test_fetch_missing_is_not_found() {
        let store = seeded_store(&[]).await;
        let err = store.fetch_bytes("absent").await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_write_metadata_preserves_content() {
        let inner = Arc::new(InMemory::new());
        inner
            .put(&StorePath::from("a.xml"), PutPayload::from_static(b"content"))
            .await
            .unwrap();
        let store = RemoteObjectStore::new(Arc::clone(&inner) as Arc<dyn ObjectStore>);

        store
            .write_metadata("a.xml", &json!({"object_key": "a.xml"}))
            .await
            .unwrap();

        let result = inner.get(&StorePath::from("a.xml")).await.unwrap();
        let attributes = result.attributes.clone();
        let stored = attributes
            .get(&Attribute::Metadata(METADATA_FIELD.into()))
            .expect("metadata attribute present");
        let parsed: Value = serde_json::from_str(stored.as_ref()).unwrap();
        assert_eq!(parsed, json!({"object_key": "a.xml"}));

        assert_eq!(result.bytes().await.unwrap().as_ref(), b"content");
    }

    #[tokio::test]
    async fn test_write_metadata_missing_object_fails() {
        let store = seeded_store(&[]).await;
        let err = store
            .write_metadata("absent", &json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_from_url_memory_backend() {
        let store = RemoteObjectStore::from_url("memory:///").unwrap();
        assert!(store.list_keys("", 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_from_url_rejects_garbage() {
        assert!(RemoteObjectStore::from_url("not a url").is_err());
    }
}
