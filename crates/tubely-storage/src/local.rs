use crate::traits::{ObjectSink, StorageError, StorageResult, UploadReader};
use crate::StorageBackend;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Local filesystem sink
///
/// Objects are written to `{base_path}/{key}` and served by the API under `base_url`.
#[derive(Clone)]
pub struct LocalSink {
    base_path: PathBuf,
    base_url: String,
}

impl LocalSink {
    /// Create a new LocalSink instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for stored files (e.g., "./assets")
    /// * `base_url` - Base URL for serving files (e.g., "http://localhost:8091/assets")
    pub async fn new(base_path: impl Into<PathBuf>, base_url: String) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create assets directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalSink {
            base_path,
            base_url,
        })
    }

    /// Convert a storage key to a filesystem path, refusing anything that could
    /// escape the assets directory.
    fn key_to_path(&self, key: &str) -> StorageResult<PathBuf> {
        if key.is_empty() || key.contains("..") || key.starts_with('/') || key.contains('\\') {
            return Err(StorageError::InvalidKey(
                "Storage key contains invalid characters".to_string(),
            ));
        }

        let path = self.base_path.join(key);
        if path.strip_prefix(&self.base_path).is_err() {
            return Err(StorageError::InvalidKey(
                "Storage key resolves outside storage directory".to_string(),
            ));
        }

        Ok(path)
    }

    fn generate_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), key)
    }

    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectSink for LocalSink {
    async fn store(
        &self,
        key: &str,
        _content_type: &str,
        reader: UploadReader<'_>,
    ) -> StorageResult<String> {
        let path = self.key_to_path(key)?;
        let start = std::time::Instant::now();

        self.ensure_parent_dir(&path).await?;

        // Bytes land in a sibling temp file and replace `path` only once fully synced.
        let parent = path.parent().unwrap_or(&self.base_path);
        let (std_file, temp_path) = tempfile::Builder::new()
            .prefix(".tubely-partial-")
            .tempfile_in(parent)
            .map_err(|e| {
                StorageError::UploadFailed(format!(
                    "Failed to create temp file in {}: {}",
                    parent.display(),
                    e
                ))
            })?
            .into_parts();
        let mut file = fs::File::from_std(std_file);

        let bytes_copied = tokio::io::copy(reader, &mut file).await.map_err(|e| {
            StorageError::UploadFailed(format!(
                "Failed to write stream to file {}: {}",
                path.display(),
                e
            ))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;
        drop(file);

        temp_path.persist(&path).map_err(|e| {
            StorageError::UploadFailed(format!(
                "Failed to move file into place at {}: {}",
                path.display(),
                e.error
            ))
        })?;

        let url = self.generate_url(key);

        tracing::info!(
            path = %path.display(),
            key = %key,
            size_bytes = bytes_copied,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage upload successful"
        );

        Ok(url)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}
