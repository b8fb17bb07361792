use async_trait::async_trait;
use bytes::Bytes;

use super::{ExtractionError, TextExtractor};

pub struct PdfExtractor;

#[async_trait]
impl TextExtractor for PdfExtractor {
    async fn extract(&self, content: Bytes) -> Result<String, ExtractionError> {
        // pdf-extract is synchronous and may panic on malformed input; a panic
        // surfaces here as a JoinError instead of taking down the worker.
        tokio::task::spawn_blocking(move || {
            pdf_extract::extract_text_from_mem(&content).map_err(|e| e.to_string())
        })
        .await
        .map_err(|e| ExtractionError::Pdf(format!("parser aborted: {e}")))?
        .map_err(ExtractionError::Pdf)
    }
}
