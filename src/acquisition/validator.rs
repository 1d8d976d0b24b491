//! Header-only document validation
//!
//! A candidate is plausible when its probe declares a PDF content type or its
//! URL path ends in `.pdf`. Probe failures reject the candidate; they never
//! abort the cascade.

use crate::acquisition::fetcher::Fetcher;
use std::fmt;
use url::Url;

/// Result of probing one candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    Accepted { content_type: String },
    Rejected { reason: String },
}

impl ValidationOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }
}

impl fmt::Display for ValidationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Accepted { content_type } if content_type.is_empty() => write!(f, "valid"),
            Self::Accepted { content_type } => write!(f, "valid ({})", content_type),
            Self::Rejected { reason } => write!(f, "invalid: {}", reason),
        }
    }
}

/// Whether the URL path ends with the document extension, ignoring case
pub fn has_document_extension(url: &str) -> bool {
    match Url::parse(url) {
        Ok(parsed) => parsed.path().to_lowercase().ends_with(".pdf"),
        Err(_) => url.to_lowercase().ends_with(".pdf"),
    }
}

/// Decides validity from a probed content type and the candidate URL
pub fn looks_like_document(content_type: &str, url: &str) -> bool {
    content_type.to_lowercase().contains("pdf") || has_document_extension(url)
}

/// Probes candidates without downloading their bodies
#[derive(Debug, Clone)]
pub struct Validator {
    fetcher: Fetcher,
}

impl Validator {
    pub fn new(fetcher: Fetcher) -> Self {
        Self { fetcher }
    }

    /// Probes a candidate and explains the decision
    pub async fn validate(&self, url: &str) -> ValidationOutcome {
        match self.fetcher.probe(url).await {
            Ok(probe) => {
                if looks_like_document(&probe.content_type, url) {
                    ValidationOutcome::Accepted {
                        content_type: probe.content_type,
                    }
                } else {
                    ValidationOutcome::Rejected {
                        reason: format!(
                            "content-type '{}' is not a document and URL has no .pdf suffix",
                            probe.content_type
                        ),
                    }
                }
            }
            Err(e) => ValidationOutcome::Rejected {
                reason: format!("probe failed: {}", e),
            },
        }
    }

    /// Returns true if the candidate plausibly points to a document
    pub async fn is_valid_document_url(&self, url: &str) -> bool {
        self.validate(url).await.is_accepted()
    }
}
