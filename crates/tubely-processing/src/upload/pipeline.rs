use std::sync::Arc;

use tubely_core::constants::VIDEO_CONTENT_TYPE;
use tubely_core::{AppError, VideoRecord};
use tubely_db::VideoRepository;
use tubely_storage::{media_subtype, thumbnail_key, video_key, ObjectSink, UploadReader};
use uuid::Uuid;

use super::types::{AuthorizedVideo, UploadError, UploadStage};
use crate::aspect::classify;
use crate::probe::ContentProber;
use crate::staging::{StagedFile, StagingArea};
use crate::validator::{MediaValidator, ValidationError};

/// Drives an upload from ownership check to updated record.
///
/// The record is written only after the sink has accepted the object, and only the
/// URL field for the uploaded media kind changes. Any failure leaves the record as it
/// was and removes the staged copy.
pub struct UploadPipeline {
    videos: Arc<dyn VideoRepository>,
    video_sink: Arc<dyn ObjectSink>,
    thumbnail_sink: Arc<dyn ObjectSink>,
    prober: Arc<dyn ContentProber>,
    staging: StagingArea,
    video_validator: MediaValidator,
    thumbnail_validator: MediaValidator,
}

impl UploadPipeline {
    pub fn new(
        videos: Arc<dyn VideoRepository>,
        video_sink: Arc<dyn ObjectSink>,
        thumbnail_sink: Arc<dyn ObjectSink>,
        prober: Arc<dyn ContentProber>,
        staging: StagingArea,
        thumbnail_content_types: Vec<String>,
    ) -> Self {
        Self {
            videos,
            video_sink,
            thumbnail_sink,
            prober,
            staging,
            video_validator: MediaValidator::new(vec![VIDEO_CONTENT_TYPE.to_string()]),
            thumbnail_validator: MediaValidator::new(thumbnail_content_types),
        }
    }

    /// Confirm `user_id` owns `video_id`.
    #[tracing::instrument(skip(self), fields(stage = %UploadStage::Authorizing))]
    pub async fn authorize(
        &self,
        user_id: Uuid,
        video_id: Uuid,
    ) -> Result<AuthorizedVideo, UploadError> {
        let video = self
            .videos
            .get_video(video_id)
            .await
            .map_err(UploadError::Record)?
            .ok_or(UploadError::NotFound(video_id))?;

        if !video.is_owned_by(user_id) {
            tracing::warn!(%user_id, %video_id, "Upload attempted by non-owner");
            return Err(UploadError::Forbidden { user_id, video_id });
        }

        Ok(AuthorizedVideo { user_id, video })
    }

    /// Stage, probe, classify and store an MP4, then point the record's `video_url` at it.
    #[tracing::instrument(skip(self, authorized, reader), fields(
        video_id = %authorized.video_id(),
        user_id = %authorized.user_id(),
    ))]
    pub async fn upload_video(
        &self,
        authorized: AuthorizedVideo,
        content_type: &str,
        reader: UploadReader<'_>,
    ) -> Result<VideoRecord, UploadError> {
        let result = self.run_video(authorized, content_type, reader).await;
        log_outcome("video", &result);
        result
    }

    /// Store an image under the video's thumbnail key and update `thumbnail_url`.
    #[tracing::instrument(skip(self, authorized, reader), fields(
        video_id = %authorized.video_id(),
        user_id = %authorized.user_id(),
    ))]
    pub async fn upload_thumbnail(
        &self,
        authorized: AuthorizedVideo,
        content_type: &str,
        reader: UploadReader<'_>,
    ) -> Result<VideoRecord, UploadError> {
        let result = self.run_thumbnail(authorized, content_type, reader).await;
        log_outcome("thumbnail", &result);
        result
    }

    async fn run_video(
        &self,
        authorized: AuthorizedVideo,
        content_type: &str,
        reader: UploadReader<'_>,
    ) -> Result<VideoRecord, UploadError> {
        let media_type = self.video_validator.validate_content_type(content_type)?;
        let subtype = subtype_of(&media_type)?;

        tracing::debug!(stage = %UploadStage::Staging, "Staging video");
        let mut staged = self.staging.acquire().await?;
        let stored = self
            .store_staged_video(&mut staged, &media_type, subtype, reader)
            .await;
        staged.release();
        let url = stored?;

        self.update_record(authorized.video_id(), |video| video.video_url = Some(url))
            .await
    }

    async fn store_staged_video(
        &self,
        staged: &mut StagedFile,
        media_type: &str,
        subtype: &str,
        reader: UploadReader<'_>,
    ) -> Result<String, UploadError> {
        let size = staged.write_all(reader).await?;
        staged.rewind().await?;
        tracing::debug!(size_bytes = size, path = %staged.path().display(), "Video staged");

        tracing::debug!(stage = %UploadStage::Probing, "Probing video");
        let geometry = self.prober.probe(staged.path()).await?;

        let category = classify(geometry);
        tracing::debug!(
            stage = %UploadStage::Classifying,
            width = geometry.width,
            height = geometry.height,
            category = %category,
            "Video classified"
        );

        let key = video_key(Some(category), subtype);
        tracing::debug!(stage = %UploadStage::KeyDeriving, key = %key, "Video key derived");

        tracing::debug!(stage = %UploadStage::Storing, backend = %self.video_sink.backend_type(), "Storing video");
        let url = self
            .video_sink
            .store(&key, media_type, staged.reader())
            .await?;

        Ok(url)
    }

    async fn run_thumbnail(
        &self,
        authorized: AuthorizedVideo,
        content_type: &str,
        reader: UploadReader<'_>,
    ) -> Result<VideoRecord, UploadError> {
        let media_type = self
            .thumbnail_validator
            .validate_content_type(content_type)?;
        let subtype = subtype_of(&media_type)?;

        let key = thumbnail_key(authorized.video_id(), subtype);
        tracing::debug!(stage = %UploadStage::KeyDeriving, key = %key, "Thumbnail key derived");

        tracing::debug!(stage = %UploadStage::Storing, backend = %self.thumbnail_sink.backend_type(), "Storing thumbnail");
        let url = self.thumbnail_sink.store(&key, &media_type, reader).await?;

        self.update_record(authorized.video_id(), |video| video.thumbnail_url = Some(url))
            .await
    }

    /// Apply `set_url` to a fresh copy of the record and write it back.
    ///
    /// Works on a fresh read, not the authorize snapshot: a URL set by a concurrent
    /// upload in the meantime survives.
    async fn update_record(
        &self,
        video_id: Uuid,
        set_url: impl FnOnce(&mut VideoRecord),
    ) -> Result<VideoRecord, UploadError> {
        tracing::debug!(stage = %UploadStage::RecordUpdating, "Updating video record");
        let mut video = self
            .videos
            .get_video(video_id)
            .await
            .map_err(UploadError::Record)?
            .ok_or_else(|| {
                UploadError::Record(AppError::NotFound(format!("Video {} not found", video_id)))
            })?;
        set_url(&mut video);

        self.videos
            .update_video(&video)
            .await
            .map_err(UploadError::Record)
    }
}

fn subtype_of(media_type: &str) -> Result<&str, UploadError> {
    media_subtype(media_type)
        .ok_or_else(|| ValidationError::MalformedContentType(media_type.to_string()).into())
}

fn log_outcome(kind: &str, result: &Result<VideoRecord, UploadError>) {
    match result {
        Ok(_) => tracing::info!(stage = %UploadStage::Done, kind, "Upload completed"),
        Err(e) => match e {
            UploadError::Validation(_)
            | UploadError::NotFound(_)
            | UploadError::Forbidden { .. } => {
                tracing::debug!(stage = %e.stage(), kind, error = %e, "Upload rejected")
            }
            _ => tracing::error!(stage = %e.stage(), kind, error = %e, "Upload failed"),
        },
    }
}
