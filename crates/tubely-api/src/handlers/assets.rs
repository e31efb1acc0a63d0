use crate::error::HttpAppError;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tubely_core::AppError;

/// `GET /thumbnails/{key}`: serve an object held by the in-memory sink.
pub async fn get_thumbnail(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<Response, HttpAppError> {
    let object = state
        .memory_sink
        .get(&key)
        .await
        .ok_or_else(|| HttpAppError(AppError::NotFound(format!("Thumbnail {} not found", key))))?;

    Ok((
        [
            (header::CONTENT_TYPE, object.content_type),
            (header::CACHE_CONTROL, "no-cache".to_string()),
        ],
        object.data,
    )
        .into_response())
}
