//! MuPDF-backed text extraction
//!
//! MuPDF's `fz_context` is not thread-safe. Each call opens a fresh
//! document from the bytes and drops it before returning, so no MuPDF state
//! outlives a single extraction.

use mupdf::{Document, TextPageOptions};

use crate::error::ExtractionError;

use super::format::DocumentFormat;
use super::TextExtractor;

/// Extracts plain text page by page, concatenated in page order
#[derive(Clone)]
pub struct MupdfExtractor {
    options: TextPageOptions,
}

impl MupdfExtractor {
    pub fn new() -> Self {
        Self {
            options: TextPageOptions::empty(),
        }
    }

    /// Keep whitespace runs as they appear on the page
    pub fn preserve_whitespace(mut self) -> Self {
        self.options |= TextPageOptions::PRESERVE_WHITESPACE;
        self
    }
}

impl Default for MupdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl TextExtractor for MupdfExtractor {
    fn extract_text(&self, data: &[u8]) -> Result<String, ExtractionError> {
        let format =
            DocumentFormat::from_magic_bytes(data).ok_or(ExtractionError::UnsupportedFormat)?;

        let doc = Document::from_bytes(data, format.mime_type())?;
        let page_count = doc.page_count()?;

        let mut text = String::new();
        for index in 0..page_count {
            let page = doc.load_page(index)?;
            let text_page = page.to_text_page(self.options)?;
            text.push_str(&text_page.to_text()?);
        }

        tracing::debug!(pages = page_count, bytes = text.len(), "Extracted document text");

        Ok(text)
    }
}
