//! Record store, prober and pipeline construction

use crate::state::AppState;
use anyhow::{Context, Result};
use std::sync::Arc;
use tubely_core::Config;
use tubely_db::create_video_repository;
use tubely_processing::FfprobeProber;

pub async fn initialize_services(config: &Config) -> Result<Arc<AppState>> {
    let videos = create_video_repository(config)
        .await
        .context("Failed to initialize video repository")?;

    let prober = Arc::new(FfprobeProber::new(
        config.ffprobe_path(),
        config.probe_timeout(),
    ));

    let state = AppState::new(config.clone(), videos, prober)
        .await
        .context("Failed to initialize upload pipeline")?;

    tracing::info!("Services initialized");

    Ok(Arc::new(state))
}
