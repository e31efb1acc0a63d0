//! Upload pipeline: authorize → stage → probe → classify → derive key → store → update record.

mod pipeline;
mod types;

pub use pipeline::UploadPipeline;
pub use types::{AuthorizedVideo, UploadError, UploadStage};
