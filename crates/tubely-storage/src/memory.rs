//! In-process object sink
//!
//! Keeps every stored object in a map for the lifetime of the process. Meant for
//! local demos of the thumbnail path; nothing survives a restart.

use crate::traits::{ObjectSink, StorageResult, UploadReader};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use tokio::io::AsyncReadExt;
use tokio::sync::RwLock;

/// An object held by [`MemorySink`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub data: Bytes,
    pub content_type: String,
}

/// Map-backed sink
///
/// URLs point at `{base_url}/{key}`, which the API serves back out of [`MemorySink::get`].
pub struct MemorySink {
    objects: RwLock<HashMap<String, StoredObject>>,
    base_url: String,
}

impl MemorySink {
    /// * `base_url` - URL prefix the API serves this sink under (e.g., "http://localhost:8091/thumbnails")
    pub fn new(base_url: impl Into<String>) -> Self {
        MemorySink {
            objects: RwLock::new(HashMap::new()),
            base_url: base_url.into(),
        }
    }

    pub async fn get(&self, key: &str) -> Option<StoredObject> {
        self.objects.read().await.get(key).cloned()
    }

    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }
}

#[async_trait]
impl ObjectSink for MemorySink {
    async fn store(
        &self,
        key: &str,
        content_type: &str,
        reader: UploadReader<'_>,
    ) -> StorageResult<String> {
        // Buffer outside the lock.
        let mut data = Vec::new();
        reader.read_to_end(&mut data).await?;
        let size = data.len();

        self.objects.write().await.insert(
            key.to_string(),
            StoredObject {
                data: Bytes::from(data),
                content_type: content_type.to_string(),
            },
        );

        tracing::debug!(key = %key, size_bytes = size, "Stored object in memory");

        Ok(format!("{}/{}", self.base_url.trim_end_matches('/'), key))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Memory
    }
}
