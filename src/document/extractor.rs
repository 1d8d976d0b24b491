//! Text extraction from downloaded documents
//!
//! Format is decided from the declared content type, the body's magic bytes,
//! and the URL suffix, in that order. PDF decoding is CPU-bound and runs on
//! the blocking thread pool so it never stalls other cascades.

use crate::document::markup::html_to_text;
use crate::document::pdf::{LopdfDecoder, PdfDecoder};
use crate::ExtractionError;
use std::sync::Arc;

const PDF_MAGIC: &[u8] = b"%PDF-";

/// Document formats the extractor understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Markup,
}

impl DocumentFormat {
    /// Determines the format of a downloaded body
    ///
    /// # Arguments
    ///
    /// * `content_type` - Declared Content-Type, possibly empty
    /// * `url` - The URL the body was fetched from
    /// * `bytes` - The body itself
    ///
    /// # Returns
    ///
    /// * `Ok(DocumentFormat)` - A supported format
    /// * `Err(ExtractionError::UnsupportedFormat)` - Nothing identifies the body
    pub fn detect(content_type: &str, url: &str, bytes: &[u8]) -> Result<Self, ExtractionError> {
        let declared = content_type.to_lowercase();

        if declared.contains("pdf") || bytes.starts_with(PDF_MAGIC) {
            return Ok(Self::Pdf);
        }

        if declared.contains("html") || declared.contains("xml") {
            return Ok(Self::Markup);
        }

        if crate::acquisition::has_document_extension(url) {
            return Ok(Self::Pdf);
        }

        Err(ExtractionError::UnsupportedFormat {
            content_type: content_type.to_string(),
        })
    }
}

/// How much of a document to extract
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionDepth {
    /// Only the first N pages, for classification
    Preview(usize),
    Full,
}

impl ExtractionDepth {
    fn max_pages(self) -> Option<usize> {
        match self {
            Self::Preview(pages) => Some(pages),
            Self::Full => None,
        }
    }
}

/// What one decoded page contributed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageExtraction {
    /// The page decoded to this many characters
    Text(usize),
    /// The page failed to decode and contributed nothing
    Failed(String),
}

/// Text extracted from one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedDocument {
    /// Page texts concatenated in order, trimmed
    pub text: String,

    /// Total pages in the source document; markup documents count as one page
    pub page_count: usize,

    /// One entry per page that was decoded, in page order
    pub pages: Vec<PageExtraction>,

    pub source_url: String,
}

impl ExtractedDocument {
    /// Text length in characters
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Whether the text is long enough to count as a successful extraction
    pub fn meets_threshold(&self, min_chars: usize) -> bool {
        self.char_len() >= min_chars
    }

    /// Failed pages as (1-based page number, error message)
    pub fn failed_pages(&self) -> impl Iterator<Item = (usize, &str)> {
        self.pages.iter().enumerate().filter_map(|(index, page)| match page {
            PageExtraction::Failed(message) => Some((index + 1, message.as_str())),
            PageExtraction::Text(_) => None,
        })
    }
}

/// Extracts text from document bodies
#[derive(Clone)]
pub struct Extractor {
    decoder: Arc<dyn PdfDecoder>,
}

impl std::fmt::Debug for Extractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Extractor").finish_non_exhaustive()
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(Arc::new(LopdfDecoder))
    }
}

impl Extractor {
    pub fn new(decoder: Arc<dyn PdfDecoder>) -> Self {
        Self { decoder }
    }

    /// Extracts text at the requested depth
    ///
    /// A PDF page that fails to decode contributes no text; the remaining
    /// pages are still used and the failure is kept in `pages`.
    pub async fn extract(
        &self,
        bytes: Arc<Vec<u8>>,
        format: DocumentFormat,
        depth: ExtractionDepth,
        source_url: &str,
    ) -> Result<ExtractedDocument, ExtractionError> {
        let decoder = self.decoder.clone();
        let url = source_url.to_string();

        tokio::task::spawn_blocking(move || match format {
            DocumentFormat::Pdf => extract_pdf(decoder.as_ref(), &bytes, depth, url),
            DocumentFormat::Markup => Ok(extract_markup(&bytes, url)),
        })
        .await
        .map_err(|e| ExtractionError::Worker(e.to_string()))?
    }
}

fn extract_markup(bytes: &[u8], source_url: String) -> ExtractedDocument {
    let html = String::from_utf8_lossy(bytes);
    let text = html_to_text(&html).trim().to_string();

    ExtractedDocument {
        pages: vec![PageExtraction::Text(text.chars().count())],
        text,
        page_count: 1,
        source_url,
    }
}

fn extract_pdf(
    decoder: &dyn PdfDecoder,
    bytes: &[u8],
    depth: ExtractionDepth,
    source_url: String,
) -> Result<ExtractedDocument, ExtractionError> {
    let decoded = decoder.decode(bytes, depth.max_pages())?;

    let mut text = String::new();
    let mut pages = Vec::with_capacity(decoded.pages.len());
    for (index, page) in decoded.pages.into_iter().enumerate() {
        match page {
            Ok(page_text) => {
                let chars = page_text.chars().count();
                tracing::debug!("Page {}: {} characters", index + 1, chars);
                text.push_str(&page_text);
                pages.push(PageExtraction::Text(chars));
            }
            Err(message) => {
                tracing::warn!("Failed to extract page {} of {}: {}", index + 1, source_url, message);
                pages.push(PageExtraction::Failed(message));
            }
        }
    }

    Ok(ExtractedDocument {
        text: text.trim().to_string(),
        page_count: decoded.page_count,
        pages,
        source_url,
    })
}
