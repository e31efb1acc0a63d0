//! Types for the upload pipeline.

use std::fmt::{Display, Formatter, Result as FmtResult};

use tubely_core::{AppError, VideoRecord};
use tubely_storage::StorageError;
use uuid::Uuid;

use crate::probe::ProbeError;
use crate::staging::StagingError;
use crate::validator::ValidationError;

/// Steps an upload moves through, used to label log events and failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStage {
    Authorizing,
    Validating,
    Staging,
    Probing,
    Classifying,
    KeyDeriving,
    Storing,
    RecordUpdating,
    Done,
}

impl Display for UploadStage {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let name = match self {
            UploadStage::Authorizing => "authorizing",
            UploadStage::Validating => "validating",
            UploadStage::Staging => "staging",
            UploadStage::Probing => "probing",
            UploadStage::Classifying => "classifying",
            UploadStage::KeyDeriving => "key_deriving",
            UploadStage::Storing => "storing",
            UploadStage::RecordUpdating => "record_updating",
            UploadStage::Done => "done",
        };
        f.write_str(name)
    }
}

/// A video the acting user has been confirmed to own.
///
/// Only [`UploadPipeline::authorize`](super::UploadPipeline::authorize) can build one,
/// so content handling cannot start before ownership is checked.
#[derive(Debug, Clone)]
pub struct AuthorizedVideo {
    pub(crate) user_id: Uuid,
    pub(crate) video: VideoRecord,
}

impl AuthorizedVideo {
    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn video_id(&self) -> Uuid {
        self.video.id
    }
}

/// Upload pipeline failure
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("Video {0} not found")]
    NotFound(Uuid),

    #[error("User {user_id} does not own video {video_id}")]
    Forbidden { user_id: Uuid, video_id: Uuid },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Staging(#[from] StagingError),

    #[error(transparent)]
    Probe(#[from] ProbeError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Record store error: {0}")]
    Record(#[source] AppError),
}

impl UploadError {
    /// The stage the upload was in when it failed
    pub fn stage(&self) -> UploadStage {
        match self {
            UploadError::NotFound(_) | UploadError::Forbidden { .. } => UploadStage::Authorizing,
            UploadError::Validation(_) => UploadStage::Validating,
            UploadError::Staging(_) => UploadStage::Staging,
            UploadError::Probe(_) => UploadStage::Probing,
            UploadError::Storage(_) => UploadStage::Storing,
            UploadError::Record(_) => UploadStage::RecordUpdating,
        }
    }
}

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::NotFound(id) => AppError::NotFound(format!("Video {} not found", id)),
            UploadError::Forbidden { .. } => {
                AppError::Unauthorized("You are not the owner of this video".to_string())
            }
            UploadError::Validation(e) => AppError::InvalidInput(e.to_string()),
            UploadError::Staging(e) => AppError::InternalWithSource {
                message: "Failed to stage upload".to_string(),
                source: e.into(),
            },
            UploadError::Probe(e) => AppError::MediaProbe(e.to_string()),
            UploadError::Storage(StorageError::InvalidKey(msg)) => AppError::Internal(msg),
            UploadError::Storage(e) => AppError::Storage(e.to_string()),
            // A row that disappears between read and write is a server-side failure here.
            UploadError::Record(AppError::NotFound(msg)) => AppError::Internal(msg),
            UploadError::Record(e) => e,
        }
    }
}
