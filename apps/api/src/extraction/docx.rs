use std::io::{Cursor, Read};
use std::sync::OnceLock;

use async_trait::async_trait;
use bytes::Bytes;
use regex::Regex;
use zip::ZipArchive;

use super::{ExtractionError, TextExtractor};

const DOCUMENT_PART: &str = "word/document.xml";

static BREAK_RE: OnceLock<Regex> = OnceLock::new();
static TAB_RE: OnceLock<Regex> = OnceLock::new();
static TAG_RE: OnceLock<Regex> = OnceLock::new();
static CHAR_REF_RE: OnceLock<Regex> = OnceLock::new();

/// Reads the main document part of a .docx package and flattens it to text.
pub struct DocxExtractor;

#[async_trait]
impl TextExtractor for DocxExtractor {
    async fn extract(&self, content: Bytes) -> Result<String, ExtractionError> {
        tokio::task::spawn_blocking(move || {
            read_document_xml(&content).map(|xml| document_xml_to_text(&xml))
        })
        .await
        .map_err(|e| ExtractionError::Docx(format!("parser aborted: {e}")))?
    }
}

fn read_document_xml(content: &[u8]) -> Result<String, ExtractionError> {
    let mut archive = ZipArchive::new(Cursor::new(content))
        .map_err(|e| ExtractionError::Docx(format!("not a DOCX package: {e}")))?;
    let mut part = archive
        .by_name(DOCUMENT_PART)
        .map_err(|_| ExtractionError::Docx(format!("missing {DOCUMENT_PART}")))?;

    let mut xml = String::new();
    part.read_to_string(&mut xml)?;
    Ok(xml)
}

/// Paragraph ends and explicit breaks become newlines, tabs stay tabs,
/// every other tag is dropped.
fn document_xml_to_text(xml: &str) -> String {
    let breaks = BREAK_RE.get_or_init(|| {
        Regex::new(r"</w:p>|<w:br\s*/>|<w:cr\s*/>").expect("break pattern is valid")
    });
    let tabs = TAB_RE.get_or_init(|| Regex::new(r"<w:tab\s*/>").expect("tab pattern is valid"));
    let tags = TAG_RE.get_or_init(|| Regex::new(r"<[^>]*>").expect("tag pattern is valid"));

    let text = breaks.replace_all(xml, "\n");
    let text = tabs.replace_all(&text, "\t");
    let text = tags.replace_all(&text, "");
    let text = decode_entities(&text);

    text.lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

fn decode_entities(text: &str) -> String {
    let char_refs = CHAR_REF_RE.get_or_init(|| {
        Regex::new(r"&#(x[0-9a-fA-F]+|[0-9]+);").expect("char ref pattern is valid")
    });

    let decoded = char_refs.replace_all(text, |caps: &regex::Captures| {
        let code = &caps[1];
        let value = match code.strip_prefix('x') {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => code.parse::<u32>().ok(),
        };
        value
            .and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_default()
    });

    decoded
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
