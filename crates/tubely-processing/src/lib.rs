//! Tubely media processing
//!
//! Everything between "authenticated upload received" and "object stored, record
//! updated": staging, probing, classification and the pipeline that drives them.

pub mod aspect;
pub mod probe;
pub mod staging;
pub mod upload;
pub mod validator;

pub use aspect::classify;
pub use probe::{ContentProber, FfprobeProber, ProbeError};
pub use staging::{StagedFile, StagingArea, StagingError};
pub use upload::{AuthorizedVideo, UploadError, UploadPipeline, UploadStage};
pub use validator::{MediaValidator, ValidationError};
