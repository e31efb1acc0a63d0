//! Test helpers: build AppState and router for integration tests.
//!
//! Records live in memory, videos go to a local sink under a temp dir, thumbnails go
//! to the in-memory sink unless a test asks for local ones, and ffprobe is replaced by
//! a fixed-geometry stub.

use async_trait::async_trait;
use axum_test::TestServer;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;
use tubely_api::setup::routes;
use tubely_api::AppState;
use tubely_core::{BaseConfig, Config, StorageBackend, StreamGeometry, UploadConfig, VideoRecord};
use tubely_db::{InMemoryVideoRepository, VideoRepository};
use tubely_processing::{ContentProber, ProbeError};
use uuid::Uuid;

pub const TEST_JWT_SECRET: &str = "test-jwt-secret-at-least-32-characters-long";
pub const TEST_BASE_URL: &str = "http://localhost:8091";
pub const MAX_THUMBNAIL_BYTES: usize = 4 * 1024;

/// Prober stand-in reporting the same geometry for every file
pub struct StubProber {
    geometry: StreamGeometry,
    calls: AtomicUsize,
}

impl StubProber {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            geometry: StreamGeometry::new(width, height),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentProber for StubProber {
    async fn probe(&self, path: &Path) -> Result<StreamGeometry, ProbeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert!(path.exists(), "probe called on a missing staged file");
        Ok(self.geometry)
    }
}

/// Test application: server plus the in-process collaborators it was built from.
pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
    pub videos: Arc<InMemoryVideoRepository>,
    pub prober: Arc<StubProber>,
    pub assets: TempDir,
    pub staging: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Bearer token for `user_id`, signed with the test secret.
    pub fn token_for(&self, user_id: Uuid) -> String {
        self.state
            .jwt
            .issue(user_id, chrono::Duration::hours(1))
            .expect("Failed to sign test token")
    }

    /// Insert a video owned by `user_id` with no media attached.
    pub async fn create_video(&self, user_id: Uuid) -> VideoRecord {
        self.videos
            .create_video(&VideoRecord::new(user_id, "Boots", "A video about boots"))
            .await
            .expect("Failed to create test video")
    }

    pub async fn video(&self, id: Uuid) -> VideoRecord {
        self.videos
            .get_video(id)
            .await
            .expect("Failed to read test video")
            .expect("Test video disappeared")
    }

    pub fn assets_path(&self, key: &str) -> PathBuf {
        self.assets.path().join(key)
    }

    pub fn staged_files(&self) -> usize {
        std::fs::read_dir(self.staging.path())
            .expect("Failed to read staging dir")
            .count()
    }
}

fn test_config(assets: &Path, staging: &Path, thumbnail_backend: StorageBackend) -> Config {
    Config(Box::new(UploadConfig {
        base: BaseConfig {
            server_port: 8091,
            cors_origins: vec!["*".to_string()],
            db_max_connections: 1,
            db_timeout_seconds: 5,
            jwt_secret: TEST_JWT_SECRET.to_string(),
            jwt_issuer: "tubely-access".to_string(),
            environment: "test".to_string(),
            public_base_url: TEST_BASE_URL.to_string(),
        },
        database_url: None,
        video_storage_backend: StorageBackend::Local,
        thumbnail_storage_backend: thumbnail_backend,
        s3_bucket: None,
        s3_region: None,
        s3_endpoint: None,
        aws_region: None,
        assets_root: assets.to_path_buf(),
        local_storage_base_url: format!("{}/assets", TEST_BASE_URL),
        max_video_size_bytes: 1024 * 1024,
        max_thumbnail_size_bytes: MAX_THUMBNAIL_BYTES,
        thumbnail_allowed_content_types: vec!["image/jpeg".to_string(), "image/png".to_string()],
        staging_dir: Some(staging.to_path_buf()),
        ffprobe_path: "ffprobe".to_string(),
        probe_timeout_secs: 5,
    }))
}

/// Setup a test app whose prober reports `width`x`height` for every video.
pub async fn setup_test_app_with_geometry(width: u32, height: u32) -> TestApp {
    build_test_app(width, height, StorageBackend::Memory).await
}

/// Setup a test app that writes thumbnails to the local assets dir.
pub async fn setup_test_app_with_local_thumbnails() -> TestApp {
    build_test_app(1920, 1080, StorageBackend::Local).await
}

async fn build_test_app(width: u32, height: u32, thumbnail_backend: StorageBackend) -> TestApp {
    let assets = tempfile::tempdir().expect("Failed to create assets dir");
    let staging = tempfile::tempdir().expect("Failed to create staging dir");

    let config = test_config(assets.path(), staging.path(), thumbnail_backend);
    config.validate().expect("Test config should be valid");

    let videos = Arc::new(InMemoryVideoRepository::new());
    let prober = Arc::new(StubProber::new(width, height));

    let state = Arc::new(
        AppState::new(config.clone(), videos.clone(), prober.clone())
            .await
            .expect("Failed to build app state"),
    );
    let router = routes::setup_routes(&config, state.clone()).expect("Failed to build routes");
    let server = TestServer::new(router).expect("Failed to start test server");

    TestApp {
        server,
        state,
        videos,
        prober,
        assets,
        staging,
    }
}

pub async fn setup_test_app() -> TestApp {
    setup_test_app_with_geometry(1920, 1080).await
}

/// Bytes that start like an MP4 file; the stub prober never inspects them.
pub fn fake_mp4() -> Vec<u8> {
    let mut data = b"\x00\x00\x00\x18ftypmp42\x00\x00\x00\x00mp42isom".to_vec();
    data.extend(std::iter::repeat(0u8).take(2048));
    data
}

pub fn fake_png() -> Vec<u8> {
    let mut data = b"\x89PNG\r\n\x1a\n".to_vec();
    data.extend_from_slice(b"\x00\x00\x00\rIHDR\x00\x00\x00\x01\x00\x00\x00\x01");
    data
}
