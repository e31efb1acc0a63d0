#[cfg(feature = "storage-local")]
use crate::LocalSink;
#[cfg(feature = "storage-s3")]
use crate::S3Sink;
use crate::{MemorySink, ObjectSink, StorageBackend, StorageError, StorageResult};
use std::sync::Arc;
use tubely_core::Config;

/// Create an object sink for the given backend
///
/// `memory_sink` is the process-wide in-memory sink; it is handed out as-is when
/// `backend` is [`StorageBackend::Memory`] so the API can serve what was stored in it.
pub async fn create_sink(
    config: &Config,
    backend: StorageBackend,
    memory_sink: &Arc<MemorySink>,
) -> StorageResult<Arc<dyn ObjectSink>> {
    match backend {
        #[cfg(feature = "storage-s3")]
        StorageBackend::S3 => {
            let bucket = config
                .s3_bucket()
                .map(String::from)
                .ok_or_else(|| StorageError::ConfigError("S3_BUCKET not configured".to_string()))?;
            let region = config
                .s3_region()
                .map(String::from)
                .or_else(|| config.aws_region().map(String::from))
                .ok_or_else(|| {
                    StorageError::ConfigError("S3_REGION or AWS_REGION not configured".to_string())
                })?;
            let endpoint = config.s3_endpoint().map(String::from);

            let sink = S3Sink::new(bucket, region, endpoint)?;
            Ok(Arc::new(sink))
        }

        #[cfg(not(feature = "storage-s3"))]
        StorageBackend::S3 => Err(StorageError::ConfigError(
            "S3 storage backend not available (storage-s3 feature not enabled)".to_string(),
        )),

        #[cfg(feature = "storage-local")]
        StorageBackend::Local => {
            let sink = LocalSink::new(
                config.assets_root().clone(),
                config.local_storage_base_url().to_string(),
            )
            .await?;
            Ok(Arc::new(sink))
        }

        #[cfg(not(feature = "storage-local"))]
        StorageBackend::Local => Err(StorageError::ConfigError(
            "Local storage backend not available (storage-local feature not enabled)".to_string(),
        )),

        StorageBackend::Memory => {
            let sink: Arc<dyn ObjectSink> = memory_sink.clone();
            Ok(sink)
        }
    }
}
