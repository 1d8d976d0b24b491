//! Annual report pre-classification
//!
//! The classifier looks for annual-report indicator phrases, first in the
//! candidate URL and then in the leading characters of the preview text.
//! A URL match is sufficient on its own, so the caller can skip preview
//! extraction entirely.

/// Phrases that mark a document as an annual report
pub const REPORT_INDICATORS: [&str; 5] = [
    "annual report",
    "form 10-k",
    "consolidated financial statements",
    "year ended",
    "fiscal year",
];

/// Where the classifier found its evidence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The URL contains an indicator
    UrlMatch(&'static str),
    /// The preview prefix contains an indicator
    ContentMatch(&'static str),
    /// Neither URL nor preview matched
    NoMatch,
}

/// Checks candidate URLs and preview text for report indicators
#[derive(Debug, Clone)]
pub struct Classifier {
    prefix_chars: usize,
}

impl Classifier {
    /// Creates a classifier inspecting the first `prefix_chars` characters of a preview
    pub fn new(prefix_chars: usize) -> Self {
        Self { prefix_chars }
    }

    /// Looks for an indicator in the URL
    ///
    /// The URL is lowercased and percent-decoded, then searched for the
    /// indicator phrase literally: `annual%20report.pdf` matches "annual
    /// report", `annual-report.pdf` does not.
    pub fn check_url(&self, url: &str) -> Option<&'static str> {
        let lower = url.to_lowercase();
        let decoded = urlencoding::decode(&lower)
            .map(|d| d.into_owned())
            .unwrap_or_else(|_| lower.clone());

        REPORT_INDICATORS
            .iter()
            .copied()
            .find(|indicator| decoded.contains(indicator))
    }

    /// Looks for an indicator in the leading characters of the preview text
    pub fn check_content(&self, text: &str) -> Option<&'static str> {
        let prefix: String = text
            .chars()
            .take(self.prefix_chars)
            .flat_map(char::to_lowercase)
            .collect();

        REPORT_INDICATORS
            .iter()
            .copied()
            .find(|indicator| prefix.contains(indicator))
    }

    /// Classifies a candidate from its URL and, if needed, its preview text
    pub fn classify(&self, url: &str, preview: Option<&str>) -> Verdict {
        if let Some(indicator) = self.check_url(url) {
            return Verdict::UrlMatch(indicator);
        }

        match preview.and_then(|text| self.check_content(text)) {
            Some(indicator) => Verdict::ContentMatch(indicator),
            None => Verdict::NoMatch,
        }
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(5000)
    }
}
