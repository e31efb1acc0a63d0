//! Tubely Storage Library
//!
//! This crate provides the [`ObjectSink`] abstraction that uploaded media is pushed to,
//! with implementations for S3, the local filesystem and an in-process map.
//!
//! # Storage key format
//!
//! - **Videos**: `{category}/{random}.{subtype}` where `random` is 32 random bytes
//!   encoded as unpadded base64url and `category` is the aspect bucket of the video.
//! - **Thumbnails**: `{video_id}.{subtype}`, so a new thumbnail replaces the old one.
//!
//! Keys must not contain `..` or a leading `/`. Key generation is centralized in the
//! `keys` module so all backends stay consistent.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
pub mod memory;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_sink;
pub use keys::{media_subtype, thumbnail_key, video_key};
#[cfg(feature = "storage-local")]
pub use local::LocalSink;
pub use memory::{MemorySink, StoredObject};
#[cfg(feature = "storage-s3")]
pub use s3::S3Sink;
pub use traits::{ObjectSink, StorageError, StorageResult, UploadReader};
pub use tubely_core::StorageBackend;
