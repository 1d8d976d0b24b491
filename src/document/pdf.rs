//! PDF decoding backed by lopdf
//!
//! Decoding sits behind the [`PdfDecoder`] trait so the cascade can be driven
//! by a scripted decoder in tests.

use crate::ExtractionError;
use lopdf::Document;

/// Text decoded from a PDF, page by page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedPdf {
    /// Total number of pages in the document, regardless of how many were decoded
    pub page_count: usize,

    /// Text for each decoded page in page order; a page that failed to decode
    /// carries the decoder's message
    pub pages: Vec<Result<String, String>>,
}

/// Turns raw PDF bytes into per-page text
pub trait PdfDecoder: Send + Sync {
    /// Decodes at most `max_pages` leading pages, or all pages when `None`
    fn decode(&self, bytes: &[u8], max_pages: Option<usize>) -> Result<DecodedPdf, ExtractionError>;
}

/// Decoder using lopdf's content-stream text extraction
#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfDecoder;

impl PdfDecoder for LopdfDecoder {
    fn decode(&self, bytes: &[u8], max_pages: Option<usize>) -> Result<DecodedPdf, ExtractionError> {
        let document =
            Document::load_mem(bytes).map_err(|e| ExtractionError::Pdf(e.to_string()))?;

        if document.is_encrypted() {
            return Err(ExtractionError::Encrypted);
        }

        let page_numbers: Vec<u32> = document.get_pages().keys().copied().collect();
        if page_numbers.is_empty() {
            return Err(ExtractionError::Empty);
        }

        let limit = max_pages.unwrap_or(page_numbers.len());
        let pages = page_numbers
            .iter()
            .take(limit)
            .map(|&number| {
                document
                    .extract_text(&[number])
                    .map_err(|e| format!("page {}: {}", number, e))
            })
            .collect();

        Ok(DecodedPdf {
            page_count: page_numbers.len(),
            pages,
        })
    }
}
