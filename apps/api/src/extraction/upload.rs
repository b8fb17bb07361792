use anyhow::{Context, Result};
use bytes::Bytes;
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;

use super::{extract_text, ExtractionError};

/// An uploaded file spooled to a temporary file while the request body is read.
///
/// The file is read exactly once by [`StagedUpload::extract_text`] and removed
/// right after; if removal fails the error is logged and otherwise ignored.
/// Dropping an unread upload removes it as well.
#[derive(Debug)]
pub struct StagedUpload {
    filename: String,
    content_type: Option<String>,
    file: NamedTempFile,
    writer: tokio::fs::File,
    len: usize,
}

impl StagedUpload {
    pub fn create(filename: impl Into<String>, content_type: Option<String>) -> Result<Self> {
        let file = tempfile::Builder::new()
            .prefix("resume-upload-")
            .tempfile()
            .context("failed to create temporary upload file")?;
        let writer = tokio::fs::File::from_std(
            file.reopen()
                .context("failed to open temporary upload file")?,
        );

        Ok(Self {
            filename: filename.into(),
            content_type,
            file,
            writer,
            len: 0,
        })
    }

    pub async fn append(&mut self, chunk: &[u8]) -> Result<()> {
        self.writer
            .write_all(chunk)
            .await
            .context("failed to write upload chunk")?;
        self.len += chunk.len();
        Ok(())
    }

    /// Stages a body that is already fully in memory.
    #[cfg(test)]
    pub async fn from_bytes(
        filename: impl Into<String>,
        content_type: Option<String>,
        content: &[u8],
    ) -> Result<Self> {
        let mut upload = Self::create(filename, content_type)?;
        upload.append(content).await?;
        Ok(upload)
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn bytes_staged(&self) -> usize {
        self.len
    }

    /// Reads the staged bytes, deletes the temporary file and extracts text.
    pub async fn extract_text(mut self) -> Result<String, ExtractionError> {
        self.writer.flush().await?;
        let content = Bytes::from(tokio::fs::read(self.file.path()).await?);

        let path = self.file.path().to_path_buf();
        if let Err(e) = self.file.close() {
            tracing::warn!("Failed to remove staged upload {}: {e}", path.display());
        }

        extract_text(
            content,
            Some(self.filename.as_str()),
            self.content_type.as_deref(),
        )
        .await
    }
}
