use crate::state::AppState;
use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub environment: String,
    pub video_storage: String,
    pub thumbnail_storage: String,
}

/// Liveness probe. Does not touch the record store or any sink.
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        environment: state.config.environment().to_string(),
        video_storage: state.config.video_storage_backend().to_string(),
        thumbnail_storage: state.config.thumbnail_storage_backend().to_string(),
    })
}
