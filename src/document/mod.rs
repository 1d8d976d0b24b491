//! Document handling: format detection, text extraction and classification
//!
//! This module contains:
//! - PDF decoding behind a swappable decoder trait
//! - Visible-text extraction for HTML/XML bodies
//! - Preview and full extraction at configurable depth
//! - Annual report indicator matching on URLs and preview text

mod classifier;
mod extractor;
mod markup;
mod pdf;

pub use classifier::{Classifier, Verdict, REPORT_INDICATORS};
pub use extractor::{DocumentFormat, ExtractedDocument, ExtractionDepth, Extractor, PageExtraction};
pub use markup::html_to_text;
pub use pdf::{DecodedPdf, LopdfDecoder, PdfDecoder};
