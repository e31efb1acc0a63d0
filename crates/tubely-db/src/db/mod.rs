//! Database repositories for data access layer
//!
//! The pipeline only depends on [`VideoRepository`]. Postgres backs it in deployed
//! environments and an in-memory map backs it in development and tests.

mod memory;
mod video;

pub use memory::InMemoryVideoRepository;
pub use video::{PgVideoRepository, VideoRepository};

use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tubely_core::{AppError, Config};

/// Open a connection pool using the configured limits
pub async fn connect_pool(database_url: &str, config: &Config) -> Result<PgPool, AppError> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections())
        .acquire_timeout(Duration::from_secs(config.db_timeout_seconds()))
        .connect(database_url)
        .await?;

    tracing::info!(
        max_connections = config.db_max_connections(),
        "Database pool created"
    );

    Ok(pool)
}

/// Apply the bundled migrations
pub async fn run_migrations(pool: &PgPool) -> Result<(), AppError> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to run migrations: {}", e)))?;
    tracing::info!("Database migrations applied");
    Ok(())
}

/// Create the video repository for the current configuration
///
/// Without a `DATABASE_URL` records live in memory only; configuration validation
/// refuses that combination in production.
pub async fn create_video_repository(
    config: &Config,
) -> Result<Arc<dyn VideoRepository>, AppError> {
    match config.database_url() {
        Some(url) => {
            let pool = connect_pool(url, config).await?;
            run_migrations(&pool).await?;
            Ok(Arc::new(PgVideoRepository::new(pool)))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, video records are kept in memory");
            Ok(Arc::new(InMemoryVideoRepository::new()))
        }
    }
}
