//! Limits and defaults shared between configuration, the pipeline and the HTTP layer.

/// Default body cap for video uploads (1 GiB).
pub const MAX_VIDEO_SIZE_MB: usize = 1024;

/// Default body cap for thumbnail uploads (10 MiB).
pub const MAX_THUMBNAIL_SIZE_MB: usize = 10;

/// The only media type accepted on the video path.
pub const VIDEO_CONTENT_TYPE: &str = "video/mp4";

/// Multipart field carrying the video file.
pub const VIDEO_FORM_FIELD: &str = "video";

/// Multipart field carrying the thumbnail image.
pub const THUMBNAIL_FORM_FIELD: &str = "thumbnail";

/// Prefix for files created in the staging directory.
pub const STAGING_FILE_PREFIX: &str = "tubely-upload-";

/// Suffix for files created in the staging directory.
pub const STAGING_FILE_SUFFIX: &str = ".mp4";

/// Number of random bytes behind every video storage key.
pub const VIDEO_KEY_RANDOM_BYTES: usize = 32;

pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_FFPROBE_PATH: &str = "ffprobe";
pub const DEFAULT_THUMBNAIL_CONTENT_TYPES: &str = "image/jpeg,image/png";
