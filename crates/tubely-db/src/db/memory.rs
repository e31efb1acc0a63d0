use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tubely_core::{AppError, VideoRecord};
use uuid::Uuid;

use super::VideoRepository;

/// Video repository kept in process memory
#[derive(Default)]
pub struct InMemoryVideoRepository {
    videos: RwLock<HashMap<Uuid, VideoRecord>>,
}

impl InMemoryVideoRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VideoRepository for InMemoryVideoRepository {
    async fn get_video(&self, id: Uuid) -> Result<Option<VideoRecord>, AppError> {
        Ok(self.videos.read().await.get(&id).cloned())
    }

    async fn update_video(&self, video: &VideoRecord) -> Result<VideoRecord, AppError> {
        let mut videos = self.videos.write().await;
        let stored = videos
            .get_mut(&video.id)
            .ok_or_else(|| AppError::NotFound(format!("Video {} not found", video.id)))?;

        stored.title = video.title.clone();
        stored.description = video.description.clone();
        stored.thumbnail_url = video.thumbnail_url.clone();
        stored.video_url = video.video_url.clone();
        stored.updated_at = Utc::now();

        Ok(stored.clone())
    }

    async fn create_video(&self, video: &VideoRecord) -> Result<VideoRecord, AppError> {
        let mut videos = self.videos.write().await;
        if videos.contains_key(&video.id) {
            return Err(AppError::InvalidInput(format!(
                "Video {} already exists",
                video.id
            )));
        }
        videos.insert(video.id, video.clone());
        Ok(video.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_missing_video() {
        let repo = InMemoryVideoRepository::new();
        assert!(repo.get_video(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_only_touches_mutable_fields() {
        let repo = InMemoryVideoRepository::new();
        let owner = Uuid::new_v4();
        let video = repo
            .create_video(&VideoRecord::new(owner, "Boots", "A pair of boots"))
            .await
            .unwrap();

        let mut changed = video.clone();
        changed.user_id = Uuid::new_v4();
        changed.video_url = Some("https://example.com/landscape/a.mp4".to_string());
        let updated = repo.update_video(&changed).await.unwrap();

        assert_eq!(updated.user_id, owner);
        assert_eq!(updated.video_url, changed.video_url);
        assert!(updated.updated_at >= video.updated_at);
    }

    #[tokio::test]
    async fn test_update_missing_video_is_not_found() {
        let repo = InMemoryVideoRepository::new();
        let video = VideoRecord::new(Uuid::new_v4(), "Ghost", "");
        let result = repo.update_video(&video).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_create_duplicate_rejected() {
        let repo = InMemoryVideoRepository::new();
        let video = VideoRecord::new(Uuid::new_v4(), "Boots", "");
        repo.create_video(&video).await.unwrap();
        assert!(repo.create_video(&video).await.is_err());
    }
}
