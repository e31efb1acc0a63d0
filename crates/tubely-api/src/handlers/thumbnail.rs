use super::{missing_field, parse_video_id, FieldBody};
use crate::auth::AuthContext;
use crate::error::HttpAppError;
use crate::state::AppState;
use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use std::sync::Arc;
use tubely_core::constants::THUMBNAIL_FORM_FIELD;
use tubely_core::VideoRecord;

/// `POST /videos/{video_id}/thumbnail`
pub async fn upload_thumbnail(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Path(video_id): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<VideoRecord>, HttpAppError> {
    let video_id = parse_video_id(&video_id)?;
    let authorized = state.pipeline.authorize(auth.user_id, video_id).await?;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(THUMBNAIL_FORM_FIELD) {
            tracing::debug!(field = ?field.name(), "Skipping unexpected form field");
            continue;
        }

        let content_type = field.content_type().unwrap_or_default().to_string();
        let mut body = FieldBody::new(field);
        let result = state
            .pipeline
            .upload_thumbnail(authorized, &content_type, &mut body.reader)
            .await;

        return body.finish(result, state.config.max_thumbnail_size_bytes());
    }

    Err(missing_field(THUMBNAIL_FORM_FIELD))
}
