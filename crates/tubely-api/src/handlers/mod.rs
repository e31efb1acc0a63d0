pub mod assets;
pub mod health;
pub mod thumbnail;
pub mod video;

use crate::error::HttpAppError;
use axum::extract::multipart::{Field, MultipartError};
use axum::http::StatusCode;
use axum::Json;
use bytes::Bytes;
use futures::{Stream, TryStreamExt};
use std::io;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio_util::io::StreamReader;
use tubely_core::{AppError, VideoRecord};
use tubely_processing::{UploadError, ValidationError};
use uuid::Uuid;

type FieldStream<'a> = Pin<Box<dyn Stream<Item = io::Result<Bytes>> + Send + 'a>>;

pub(crate) fn parse_video_id(raw: &str) -> Result<Uuid, HttpAppError> {
    Uuid::parse_str(raw).map_err(|e| HttpAppError(e.into()))
}

pub(crate) fn missing_field(name: &str) -> HttpAppError {
    UploadError::from(ValidationError::MissingField(name.to_string())).into()
}

/// A multipart field exposed as an `AsyncRead`.
///
/// The body cap surfaces as an I/O error somewhere inside the pipeline, so the reader
/// records it and [`FieldBody::finish`] reports it as 413 instead.
pub(crate) struct FieldBody<'a> {
    pub reader: StreamReader<FieldStream<'a>, Bytes>,
    limit_exceeded: Arc<AtomicBool>,
}

impl<'a> FieldBody<'a> {
    pub fn new(field: Field<'a>) -> Self {
        let limit_exceeded = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&limit_exceeded);

        let stream: FieldStream<'a> = Box::pin(field.map_err(move |e: MultipartError| {
            if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
                flag.store(true, Ordering::Relaxed);
            }
            io::Error::other(e)
        }));

        Self {
            reader: StreamReader::new(stream),
            limit_exceeded,
        }
    }

    pub fn finish(
        &self,
        result: Result<VideoRecord, UploadError>,
        limit_bytes: usize,
    ) -> Result<Json<VideoRecord>, HttpAppError> {
        match result {
            Ok(video) => Ok(Json(video)),
            Err(_) if self.limit_exceeded.load(Ordering::Relaxed) => {
                Err(HttpAppError(AppError::PayloadTooLarge(format!(
                    "Upload exceeds the {} MB limit",
                    limit_bytes / 1024 / 1024
                ))))
            }
            Err(e) => Err(e.into()),
        }
    }
}
