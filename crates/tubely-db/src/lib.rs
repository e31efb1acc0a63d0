//! Tubely database layer
//!
//! Repositories for the video records the upload pipeline reads and updates.

pub mod db;

pub use db::{
    connect_pool, create_video_repository, run_migrations, InMemoryVideoRepository,
    PgVideoRepository, VideoRepository,
};
