//! PDF text extraction.
//!
//! Every page is read in order with lopdf; a page lopdf cannot read makes
//! the whole file unreadable. If the pages hold no text at all (unusual
//! font encodings) the document is retried with pdf-extract.

use lopdf::Document;
use std::panic::{AssertUnwindSafe, catch_unwind};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("Could not read that PDF. Try downloading a text-friendly statement. ({0})")]
    Unreadable(String),
    #[error("Could not read that PDF. Try downloading a text-friendly statement. (no text layer found)")]
    NoText,
}

/// Anything that can turn PDF bytes into statement text.
pub trait PdfText {
    fn extract_text(&self, bytes: &[u8]) -> Result<String, PdfError>;
}

/// Extractor built once and shared by reference with the pipeline.
#[derive(Debug, Clone, Default)]
pub struct PdfTextExtractor;

impl PdfTextExtractor {
    pub fn new() -> Self {
        Self
    }
}

/// Trimmed text of every page, in page order.
fn extract_pages(doc: &Document) -> Result<Vec<String>, PdfError> {
    doc.get_pages()
        .keys()
        .map(|page_number| {
            doc.extract_text(&[*page_number])
                .map(|text| text.trim().to_string())
                .map_err(|e| {
                    warn!(page = page_number, error = %e, "page text extraction failed");
                    PdfError::Unreadable(format!("page {page_number}: {e}"))
                })
        })
        .collect()
}

/// pdf-extract panics on some malformed fonts; a panic means unreadable.
fn extract_with_pdf_extract(bytes: &[u8]) -> Result<String, PdfError> {
    match catch_unwind(AssertUnwindSafe(|| pdf_extract::extract_text_from_mem(bytes))) {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => Err(PdfError::Unreadable(e.to_string())),
        Err(_) => {
            warn!("pdf-extract panicked");
            Err(PdfError::Unreadable("malformed PDF content".to_string()))
        }
    }
}

fn has_text(s: &str) -> bool {
    s.chars().any(|c| !c.is_whitespace())
}

impl PdfText for PdfTextExtractor {
    fn extract_text(&self, bytes: &[u8]) -> Result<String, PdfError> {
        let doc = Document::load_mem(bytes).map_err(|e| PdfError::Unreadable(e.to_string()))?;

        let pages = extract_pages(&doc)?;
        let joined = pages
            .iter()
            .filter(|p| has_text(p))
            .cloned()
            .collect::<Vec<_>>()
            .join("\n");
        if has_text(&joined) {
            info!(pages = pages.len(), chars = joined.len(), "PDF text extracted");
            return Ok(joined);
        }

        warn!("no page text from lopdf, retrying with pdf-extract");
        let text = extract_with_pdf_extract(bytes)?;
        if has_text(&text) {
            Ok(text.trim().to_string())
        } else {
            Err(PdfError::NoText)
        }
    }
}
