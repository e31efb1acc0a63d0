//! Configuration module
//!
//! Server, authentication, storage and upload settings, loaded from the environment
//! (and an optional `.env` file) once at startup.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{
    DEFAULT_FFPROBE_PATH, DEFAULT_PROBE_TIMEOUT_SECS, DEFAULT_THUMBNAIL_CONTENT_TYPES,
    MAX_THUMBNAIL_SIZE_MB, MAX_VIDEO_SIZE_MB,
};
use crate::storage_types::StorageBackend;

const SERVER_PORT: u16 = 8091;
const MAX_CONNECTIONS: u32 = 10;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const JWT_ISSUER: &str = "tubely-access";

/// Base configuration shared by every binary
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub environment: String,
    pub public_base_url: String,
}

/// Upload service configuration
#[derive(Clone, Debug)]
pub struct UploadConfig {
    pub base: BaseConfig,
    pub database_url: Option<String>,
    // Storage configuration
    pub video_storage_backend: StorageBackend,
    pub thumbnail_storage_backend: StorageBackend,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // S3-compatible providers (MinIO, Spaces, ...)
    pub aws_region: Option<String>,
    pub assets_root: PathBuf,
    pub local_storage_base_url: String,
    // Upload handling
    pub max_video_size_bytes: usize,
    pub max_thumbnail_size_bytes: usize,
    pub thumbnail_allowed_content_types: Vec<String>,
    pub staging_dir: Option<PathBuf>,
    pub ffprobe_path: String,
    pub probe_timeout_secs: u64,
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config(pub Box<UploadConfig>);

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = UploadConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.0.validate()
    }

    pub fn server_port(&self) -> u16 {
        self.0.base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.0.base.cors_origins
    }

    pub fn db_max_connections(&self) -> u32 {
        self.0.base.db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.0.base.db_timeout_seconds
    }

    pub fn jwt_secret(&self) -> &str {
        &self.0.base.jwt_secret
    }

    pub fn jwt_issuer(&self) -> &str {
        &self.0.base.jwt_issuer
    }

    pub fn environment(&self) -> &str {
        &self.0.base.environment
    }

    pub fn is_production(&self) -> bool {
        is_production_environment(&self.0.base.environment)
    }

    pub fn public_base_url(&self) -> &str {
        &self.0.base.public_base_url
    }

    pub fn database_url(&self) -> Option<&str> {
        self.0.database_url.as_deref()
    }

    pub fn video_storage_backend(&self) -> StorageBackend {
        self.0.video_storage_backend
    }

    pub fn thumbnail_storage_backend(&self) -> StorageBackend {
        self.0.thumbnail_storage_backend
    }

    pub fn s3_bucket(&self) -> Option<&str> {
        self.0.s3_bucket.as_deref()
    }

    pub fn s3_region(&self) -> Option<&str> {
        self.0.s3_region.as_deref()
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.0.s3_endpoint.as_deref()
    }

    pub fn aws_region(&self) -> Option<&str> {
        self.0.aws_region.as_deref()
    }

    pub fn assets_root(&self) -> &PathBuf {
        &self.0.assets_root
    }

    pub fn local_storage_base_url(&self) -> &str {
        &self.0.local_storage_base_url
    }

    pub fn max_video_size_bytes(&self) -> usize {
        self.0.max_video_size_bytes
    }

    pub fn max_thumbnail_size_bytes(&self) -> usize {
        self.0.max_thumbnail_size_bytes
    }

    pub fn thumbnail_allowed_content_types(&self) -> &[String] {
        &self.0.thumbnail_allowed_content_types
    }

    pub fn staging_dir(&self) -> Option<&PathBuf> {
        self.0.staging_dir.as_ref()
    }

    pub fn ffprobe_path(&self) -> &str {
        &self.0.ffprobe_path
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.0.probe_timeout_secs)
    }
}

/// Environment name from `ENVIRONMENT` (or `APP_ENV`), `development` when unset.
pub fn environment_from_env() -> String {
    env::var("ENVIRONMENT")
        .or_else(|_| env::var("APP_ENV"))
        .unwrap_or_else(|_| "development".to_string())
}

/// `production` and `prod` (any case) both count as production.
pub fn is_production_environment(environment: &str) -> bool {
    matches!(
        environment.trim().to_lowercase().as_str(),
        "production" | "prod"
    )
}

fn mb_to_bytes(mb: usize) -> usize {
    mb.saturating_mul(1024 * 1024)
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

impl UploadConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = environment_from_env();

        let server_port = env::var("PORT")
            .unwrap_or_else(|_| SERVER_PORT.to_string())
            .parse()
            .unwrap_or(SERVER_PORT);

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        let cors_origins = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let public_base_url = env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| format!("http://localhost:{}", server_port))
            .trim_end_matches('/')
            .to_string();

        let max_video_size_mb = env::var("MAX_VIDEO_SIZE_MB")
            .unwrap_or_else(|_| MAX_VIDEO_SIZE_MB.to_string())
            .parse()
            .unwrap_or(MAX_VIDEO_SIZE_MB);

        let max_thumbnail_size_mb = env::var("MAX_THUMBNAIL_SIZE_MB")
            .unwrap_or_else(|_| MAX_THUMBNAIL_SIZE_MB.to_string())
            .parse()
            .unwrap_or(MAX_THUMBNAIL_SIZE_MB);

        let video_storage_backend = env::var("VIDEO_STORAGE_BACKEND")
            .ok()
            .map(|s| s.parse::<StorageBackend>())
            .transpose()?
            .unwrap_or(StorageBackend::S3);

        let thumbnail_storage_backend = env::var("THUMBNAIL_STORAGE_BACKEND")
            .ok()
            .map(|s| s.parse::<StorageBackend>())
            .transpose()?
            .unwrap_or(StorageBackend::Local);

        let base = BaseConfig {
            server_port,
            cors_origins,
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| MAX_CONNECTIONS.to_string())
                .parse()
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: env::var("DB_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| CONNECTION_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            jwt_secret: env::var("JWT_SECRET")
                .map_err(|_| anyhow::anyhow!("JWT_SECRET must be set"))?,
            jwt_issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| JWT_ISSUER.to_string()),
            environment,
            public_base_url: public_base_url.clone(),
        };

        let config = UploadConfig {
            base,
            database_url: env::var("DATABASE_URL").ok().filter(|s| !s.is_empty()),
            video_storage_backend,
            thumbnail_storage_backend,
            s3_bucket: env::var("S3_BUCKET").ok(),
            s3_region: env::var("S3_REGION").ok(),
            s3_endpoint: env::var("S3_ENDPOINT").ok(),
            aws_region: env::var("AWS_REGION").ok(),
            assets_root: env::var("ASSETS_ROOT")
                .unwrap_or_else(|_| "./assets".to_string())
                .into(),
            local_storage_base_url: env::var("LOCAL_STORAGE_BASE_URL")
                .unwrap_or_else(|_| format!("{}/assets", public_base_url)),
            max_video_size_bytes: mb_to_bytes(max_video_size_mb),
            max_thumbnail_size_bytes: mb_to_bytes(max_thumbnail_size_mb),
            thumbnail_allowed_content_types: split_list(
                &env::var("THUMBNAIL_ALLOWED_CONTENT_TYPES")
                    .unwrap_or_else(|_| DEFAULT_THUMBNAIL_CONTENT_TYPES.to_string()),
            ),
            staging_dir: env::var("STAGING_DIR").ok().map(PathBuf::from),
            ffprobe_path: env::var("FFPROBE_PATH")
                .unwrap_or_else(|_| DEFAULT_FFPROBE_PATH.to_string()),
            probe_timeout_secs: env::var("PROBE_TIMEOUT_SECS")
                .unwrap_or_else(|_| DEFAULT_PROBE_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(DEFAULT_PROBE_TIMEOUT_SECS),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        let production = is_production_environment(&self.base.environment);

        if self.base.jwt_secret.len() < 32 {
            return Err(anyhow::anyhow!(
                "JWT_SECRET must be at least 32 characters long"
            ));
        }

        match self.database_url.as_deref() {
            Some(url) if !url.starts_with("postgres://") && !url.starts_with("postgresql://") => {
                return Err(anyhow::anyhow!(
                    "DATABASE_URL must be a valid PostgreSQL connection string"
                ));
            }
            None if production => {
                return Err(anyhow::anyhow!("DATABASE_URL must be set in production"));
            }
            _ => {}
        }

        if self.video_storage_backend == StorageBackend::Memory {
            return Err(anyhow::anyhow!(
                "VIDEO_STORAGE_BACKEND=memory is not supported; use s3 or local"
            ));
        }

        if production && self.thumbnail_storage_backend == StorageBackend::Memory {
            return Err(anyhow::anyhow!(
                "THUMBNAIL_STORAGE_BACKEND=memory is not allowed in production"
            ));
        }

        let uses_s3 = self.video_storage_backend == StorageBackend::S3
            || self.thumbnail_storage_backend == StorageBackend::S3;
        if uses_s3 {
            if self.s3_bucket.is_none() {
                return Err(anyhow::anyhow!(
                    "S3_BUCKET must be set when using S3 storage backend"
                ));
            }
            if self.s3_region.is_none() && self.aws_region.is_none() {
                return Err(anyhow::anyhow!(
                    "S3_REGION or AWS_REGION must be set when using S3 storage backend"
                ));
            }
        }

        if self.thumbnail_allowed_content_types.is_empty() {
            return Err(anyhow::anyhow!(
                "THUMBNAIL_ALLOWED_CONTENT_TYPES must list at least one media type"
            ));
        }

        if self.probe_timeout_secs == 0 {
            return Err(anyhow::anyhow!("PROBE_TIMEOUT_SECS must be greater than 0"));
        }

        if production && self.base.cors_origins.iter().any(|o| o == "*") {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production"
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> UploadConfig {
        UploadConfig {
            base: BaseConfig {
                server_port: 8091,
                cors_origins: vec!["*".to_string()],
                db_max_connections: 10,
                db_timeout_seconds: 30,
                jwt_secret: "a".repeat(32),
                jwt_issuer: JWT_ISSUER.to_string(),
                environment: "development".to_string(),
                public_base_url: "http://localhost:8091".to_string(),
            },
            database_url: None,
            video_storage_backend: StorageBackend::Local,
            thumbnail_storage_backend: StorageBackend::Memory,
            s3_bucket: None,
            s3_region: None,
            s3_endpoint: None,
            aws_region: None,
            assets_root: PathBuf::from("./assets"),
            local_storage_base_url: "http://localhost:8091/assets".to_string(),
            max_video_size_bytes: MAX_VIDEO_SIZE_MB * 1024 * 1024,
            max_thumbnail_size_bytes: MAX_THUMBNAIL_SIZE_MB * 1024 * 1024,
            thumbnail_allowed_content_types: split_list(DEFAULT_THUMBNAIL_CONTENT_TYPES),
            staging_dir: None,
            ffprobe_path: DEFAULT_FFPROBE_PATH.to_string(),
            probe_timeout_secs: DEFAULT_PROBE_TIMEOUT_SECS,
        }
    }

    #[test]
    fn test_valid_development_config() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_short_jwt_secret_rejected() {
        let mut config = valid_config();
        config.base.jwt_secret = "short".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_memory_backend_rejected_for_video() {
        let mut config = valid_config();
        config.video_storage_backend = StorageBackend::Memory;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_memory_backend_rejected_in_production() {
        let mut config = valid_config();
        config.base.environment = "production".to_string();
        config.base.cors_origins = vec!["https://tubely.example".to_string()];
        config.database_url = Some("postgres://localhost/tubely".to_string());
        assert!(config.validate().is_err());

        config.thumbnail_storage_backend = StorageBackend::Local;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_prod_alias_enables_production_guards() {
        let mut config = valid_config();
        config.base.environment = "Prod".to_string();
        assert!(config.validate().is_err());

        config.base.cors_origins = vec!["https://tubely.example".to_string()];
        config.database_url = Some("postgres://localhost/tubely".to_string());
        config.thumbnail_storage_backend = StorageBackend::Local;
        assert!(config.validate().is_ok());
        assert!(Config(Box::new(config)).is_production());
    }

    #[test]
    fn test_environment_names() {
        assert!(is_production_environment("production"));
        assert!(is_production_environment("PROD"));
        assert!(!is_production_environment("staging"));
        assert!(!is_production_environment("development"));
    }

    #[test]
    fn test_size_conversion_saturates() {
        assert_eq!(mb_to_bytes(10), 10 * 1024 * 1024);
        assert_eq!(mb_to_bytes(usize::MAX), usize::MAX);
    }

    #[test]
    fn test_s3_requires_bucket_and_region() {
        let mut config = valid_config();
        config.video_storage_backend = StorageBackend::S3;
        assert!(config.validate().is_err());

        config.s3_bucket = Some("tubely-media".to_string());
        assert!(config.validate().is_err());

        config.aws_region = Some("us-east-1".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_split_list_normalizes_entries() {
        assert_eq!(
            split_list(" image/JPEG , ,image/png"),
            vec!["image/jpeg".to_string(), "image/png".to_string()]
        );
    }
}
