//! Resume text extraction: turns an uploaded PDF into one plain-text block.
//!
//! Pages are read one at a time; a page that fails to extract is logged and
//! skipped so one bad page does not sink the whole resume.

use anyhow::Result;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::ResumeDocument;
use crate::validation::validate_resume_document;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("{0}")]
    Invalid(String),

    #[error("Could not read the PDF ({0}). The file may be corrupt or password-protected.")]
    Corrupt(String),

    #[error("The PDF is empty: it contains no pages.")]
    Empty,

    #[error(
        "No text could be extracted from the PDF. It is likely a scanned or image-only \
        document; please upload a text-based PDF."
    )]
    Textless,
}

/// Outcome handed back to callers: `text` on success, `error` otherwise.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionOutcome {
    pub ok: bool,
    pub text: Option<String>,
    pub error: Option<String>,
}

impl From<Result<String, ExtractError>> for ExtractionOutcome {
    fn from(result: Result<String, ExtractError>) -> Self {
        match result {
            Ok(text) => ExtractionOutcome {
                ok: true,
                text: Some(text),
                error: None,
            },
            Err(e) => ExtractionOutcome {
                ok: false,
                text: None,
                error: Some(e.to_string()),
            },
        }
    }
}

/// A paginated document whose pages can be read independently.
pub trait PageSource {
    fn page_count(&self) -> usize;

    /// Text of the zero-based page `index`.
    fn page_text(&self, index: usize) -> Result<String>;
}

/// A parsed PDF backed by `lopdf`.
pub struct PdfDocument {
    document: lopdf::Document,
    page_numbers: Vec<u32>,
}

impl PdfDocument {
    pub fn load(data: &[u8]) -> Result<Self, ExtractError> {
        let document =
            lopdf::Document::load_mem(data).map_err(|e| ExtractError::Corrupt(e.to_string()))?;
        let page_numbers = document.get_pages().keys().copied().collect();
        Ok(Self {
            document,
            page_numbers,
        })
    }
}

impl PageSource for PdfDocument {
    fn page_count(&self) -> usize {
        self.page_numbers.len()
    }

    fn page_text(&self, index: usize) -> Result<String> {
        let page = self
            .page_numbers
            .get(index)
            .copied()
            .ok_or_else(|| anyhow::anyhow!("page index {index} out of range"))?;
        Ok(self.document.extract_text(&[page])?)
    }
}

/// Validates, parses and extracts the resume, reporting the structured outcome.
pub fn extract_resume_text(document: &ResumeDocument) -> ExtractionOutcome {
    extract_text(document).into()
}

pub fn extract_text(document: &ResumeDocument) -> Result<String, ExtractError> {
    let verdict = validate_resume_document(Some(document));
    if !verdict.valid {
        return Err(ExtractError::Invalid(verdict.error.unwrap_or_default()));
    }

    let pdf = PdfDocument::load(&document.data)?;
    extract_pages(&pdf)
}

/// Concatenates the text of every readable page.
pub fn extract_pages(source: &impl PageSource) -> Result<String, ExtractError> {
    let count = source.page_count();
    if count == 0 {
        return Err(ExtractError::Empty);
    }

    let mut pages = Vec::with_capacity(count);
    for index in 0..count {
        match source.page_text(index) {
            Ok(text) => pages.push(text),
            Err(e) => warn!("Skipping page {} of {}: {e}", index + 1, count),
        }
    }

    let text = pages.join("\n").trim().to_string();
    if text.is_empty() {
        return Err(ExtractError::Textless);
    }

    debug!(
        "Extracted {} characters from {}/{} pages",
        text.chars().count(),
        pages.len(),
        count
    );
    Ok(text)
}
