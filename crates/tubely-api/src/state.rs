//! Application state shared by every handler.

use crate::auth::JwtValidator;
use std::sync::Arc;
use tubely_core::Config;
use tubely_db::VideoRepository;
use tubely_processing::{ContentProber, StagingArea, UploadPipeline};
use tubely_storage::{create_sink, MemorySink};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub pipeline: Arc<UploadPipeline>,
    /// Backs `GET /thumbnails/{key}`; empty unless a media kind is configured for memory
    pub memory_sink: Arc<MemorySink>,
    pub jwt: Arc<JwtValidator>,
}

impl AppState {
    /// Wire sinks, staging and the upload pipeline around the given record store and prober.
    pub async fn new(
        config: Config,
        videos: Arc<dyn VideoRepository>,
        prober: Arc<dyn ContentProber>,
    ) -> Result<Self, anyhow::Error> {
        let memory_sink = Arc::new(MemorySink::new(format!(
            "{}/thumbnails",
            config.public_base_url()
        )));

        let video_sink = create_sink(&config, config.video_storage_backend(), &memory_sink).await?;
        let thumbnail_sink =
            create_sink(&config, config.thumbnail_storage_backend(), &memory_sink).await?;

        tracing::info!(
            video_backend = %video_sink.backend_type(),
            thumbnail_backend = %thumbnail_sink.backend_type(),
            "Object sinks initialized"
        );

        let pipeline = UploadPipeline::new(
            videos,
            video_sink,
            thumbnail_sink,
            prober,
            StagingArea::new(config.staging_dir().cloned()),
            config.thumbnail_allowed_content_types().to_vec(),
        );

        let jwt = JwtValidator::new(config.jwt_secret(), config.jwt_issuer());

        Ok(Self {
            config,
            pipeline: Arc::new(pipeline),
            memory_sink,
            jwt: Arc::new(jwt),
        })
    }
}
