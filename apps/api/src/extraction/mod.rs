//! Text Extraction Adapter: turns an uploaded document into one plain-text body.
//!
//! Kind is decided by extension first, then declared MIME type; anything
//! unrecognised is read as (lossy) UTF-8 text.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

mod docx;
mod pdf;
pub mod upload;

pub use docx::DocxExtractor;
pub use pdf::PdfExtractor;
pub use upload::StagedUpload;

pub const PDF_MIME: &str = "application/pdf";
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("{kind} file appears to be empty or could not extract text")]
    Empty { kind: &'static str },

    #[error("Failed to parse PDF: {0}")]
    Pdf(String),

    #[error("Failed to parse DOCX: {0}")]
    Docx(String),

    #[error("Failed to read uploaded file: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
    PlainText,
}

impl DocumentKind {
    pub fn detect(filename: Option<&str>, content_type: Option<&str>) -> Self {
        let ext = filename
            .and_then(|name| name.rsplit_once('.'))
            .map(|(_, ext)| ext.to_ascii_lowercase());
        let mime = content_type.map(|ct| ct.trim().to_ascii_lowercase());

        match (ext.as_deref(), mime.as_deref()) {
            (Some("pdf"), _) | (_, Some(PDF_MIME)) => DocumentKind::Pdf,
            (Some("docx"), _) | (_, Some(DOCX_MIME)) => DocumentKind::Docx,
            _ => DocumentKind::PlainText,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DocumentKind::Pdf => "PDF",
            DocumentKind::Docx => "DOCX",
            DocumentKind::PlainText => "Text",
        }
    }

    fn extractor(self) -> Box<dyn TextExtractor> {
        match self {
            DocumentKind::Pdf => Box::new(PdfExtractor),
            DocumentKind::Docx => Box::new(DocxExtractor),
            DocumentKind::PlainText => Box::new(PlainTextExtractor),
        }
    }
}

/// One document format. Implementations may be CPU-heavy and should move
/// parsing off the async executor.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract(&self, content: Bytes) -> Result<String, ExtractionError>;
}

pub struct PlainTextExtractor;

#[async_trait]
impl TextExtractor for PlainTextExtractor {
    async fn extract(&self, content: Bytes) -> Result<String, ExtractionError> {
        Ok(String::from_utf8_lossy(&content).into_owned())
    }
}

/// Extracts text from `content`, rejecting documents with no readable text.
pub async fn extract_text(
    content: Bytes,
    filename: Option<&str>,
    content_type: Option<&str>,
) -> Result<String, ExtractionError> {
    let kind = DocumentKind::detect(filename, content_type);
    let text = kind.extractor().extract(content).await?;

    if text.trim().is_empty() {
        return Err(ExtractionError::Empty { kind: kind.label() });
    }

    tracing::debug!("Extracted {} chars from {} upload", text.len(), kind.label());
    Ok(text)
}
