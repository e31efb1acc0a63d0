//! Scoped local staging for in-flight uploads.
//!
//! A [`StagedFile`] owns its backing file: dropping it deletes the file, so every exit
//! path of an upload, including panics and early returns, leaves the staging
//! directory clean.

use std::io::{self, SeekFrom};
use std::path::{Path, PathBuf};

use tempfile::TempPath;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncSeekExt, AsyncWriteExt};
use tubely_core::constants::{STAGING_FILE_PREFIX, STAGING_FILE_SUFFIX};

#[derive(Debug, thiserror::Error)]
pub enum StagingError {
    #[error("Failed to create staged file in {dir}: {source}")]
    Create {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write staged file: {0}")]
    Write(#[source] io::Error),

    #[error("Failed to rewind staged file: {0}")]
    Rewind(#[source] io::Error),
}

/// Directory that staged uploads are written to
#[derive(Debug, Clone)]
pub struct StagingArea {
    dir: PathBuf,
}

impl StagingArea {
    /// Stage under `dir`, or the system temp directory when `None`.
    pub fn new(dir: Option<PathBuf>) -> Self {
        Self {
            dir: dir.unwrap_or_else(std::env::temp_dir),
        }
    }

    /// Create a new, randomly named, empty staged file.
    pub async fn acquire(&self) -> Result<StagedFile, StagingError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| StagingError::Create {
                dir: self.dir.clone(),
                source,
            })?;

        let named = tempfile::Builder::new()
            .prefix(STAGING_FILE_PREFIX)
            .suffix(STAGING_FILE_SUFFIX)
            .tempfile_in(&self.dir)
            .map_err(|source| StagingError::Create {
                dir: self.dir.clone(),
                source,
            })?;

        let (file, path) = named.into_parts();
        tracing::debug!(path = %path.display(), "Staged file created");

        Ok(StagedFile {
            file: File::from_std(file),
            path,
        })
    }
}

/// Exclusively owned temporary copy of an upload
pub struct StagedFile {
    file: File,
    path: TempPath,
}

impl StagedFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Copy `reader` into the file until EOF and flush it.
    pub async fn write_all<R>(&mut self, reader: &mut R) -> Result<u64, StagingError>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        let written = tokio::io::copy(reader, &mut self.file)
            .await
            .map_err(StagingError::Write)?;
        self.file.flush().await.map_err(StagingError::Write)?;
        Ok(written)
    }

    /// Move back to the start so the whole file can be read again.
    pub async fn rewind(&mut self) -> Result<(), StagingError> {
        self.file
            .seek(SeekFrom::Start(0))
            .await
            .map_err(StagingError::Rewind)?;
        Ok(())
    }

    /// Reader over the staged bytes from the current position.
    pub fn reader(&mut self) -> &mut File {
        &mut self.file
    }

    /// Delete the backing file now, logging instead of failing if that is not possible.
    pub fn release(self) {
        let StagedFile { file, path } = self;
        drop(file);
        let shown = path.display().to_string();
        if let Err(e) = path.close() {
            tracing::warn!(path = %shown, error = %e, "Failed to delete staged file");
        } else {
            tracing::debug!(path = %shown, "Staged file released");
        }
    }
}
