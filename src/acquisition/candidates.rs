//! Candidate extraction from search result pages
//!
//! A search result page is parsed once into an ordered list of candidate
//! document URLs. Provider redirect wrappers (`/url?q=<target>&...`) are
//! unwrapped to their real destination, absolute links pass through, and
//! anything else is resolved against the search provider's origin.

use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Marker an href must contain to be considered a document link
pub const DOCUMENT_MARKER: &str = "pdf";

/// A URL discovered on a search result page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Resolved destination URL
    pub url: String,

    /// Index of the tier whose query produced this candidate
    pub tier_index: usize,

    /// The rendered query that produced this candidate
    pub query: String,
}

/// Ordered, consume-once sequence of candidates from one query
///
/// The whole page is parsed up front; iterating only hands out the
/// candidates already collected, so `len` is known before the first one.
#[derive(Debug)]
pub struct Candidates {
    inner: std::vec::IntoIter<Candidate>,
}

impl Candidates {
    /// Number of candidates not yet consumed
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.len() == 0
    }
}

impl Iterator for Candidates {
    type Item = Candidate;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Candidates {}

/// Parses search result pages into candidates
#[derive(Debug, Clone)]
pub struct CandidateExtractor {
    /// Origin of the search provider, used to resolve relative links
    origin: Url,
}

impl CandidateExtractor {
    /// Creates an extractor for the given search endpoint
    pub fn new(search_url: &Url) -> Self {
        let mut origin = search_url.clone();
        origin.set_path("/");
        origin.set_query(None);
        origin.set_fragment(None);
        Self { origin }
    }

    /// Extracts candidates from a search result page
    ///
    /// Unparseable or unexpected markup degrades to zero candidates. Duplicate
    /// destinations on the same page are kept once, at their first position.
    ///
    /// # Arguments
    ///
    /// * `html` - Raw search result page
    /// * `tier_index` - Tier that issued the query
    /// * `query` - The rendered query text
    pub fn extract(&self, html: &str, tier_index: usize, query: &str) -> Candidates {
        let urls = self.extract_urls(html);
        let candidates: Vec<Candidate> = urls
            .into_iter()
            .map(|url| Candidate {
                url,
                tier_index,
                query: query.to_string(),
            })
            .collect();

        Candidates {
            inner: candidates.into_iter(),
        }
    }

    fn extract_urls(&self, html: &str) -> Vec<String> {
        let document = Html::parse_document(html);
        let Ok(selector) = Selector::parse("a[href]") else {
            return Vec::new();
        };

        let mut seen = HashSet::new();
        let mut urls = Vec::new();

        for element in document.select(&selector) {
            let Some(href) = element.value().attr("href") else {
                continue;
            };

            if !href.to_lowercase().contains(DOCUMENT_MARKER) {
                continue;
            }

            let Some(url) = self.resolve_search_link(href) else {
                tracing::debug!("Dropping unresolvable link: {}", href);
                continue;
            };

            if seen.insert(url.clone()) {
                urls.push(url);
            }
        }

        urls
    }

    /// Resolves a search result href to its real destination
    ///
    /// Returns None for links that cannot lead to a document: non-HTTP
    /// schemes, redirect wrappers without a target, or unparseable URLs.
    pub fn resolve_search_link(&self, href: &str) -> Option<String> {
        let href = href.trim();
        if href.is_empty() {
            return None;
        }

        let lower = href.to_lowercase();
        if lower.starts_with("javascript:") || lower.starts_with("mailto:") || lower.starts_with("data:") {
            return None;
        }

        let resolved = if lower.starts_with("http://") || lower.starts_with("https://") {
            Url::parse(href).ok()?
        } else {
            self.origin.join(href).ok()?
        };

        let target = if self.is_redirect_wrapper(&resolved) {
            let (_, q) = resolved.query_pairs().find(|(k, _)| k == "q")?;
            Url::parse(q.as_ref()).ok()?
        } else {
            resolved
        };

        match target.scheme() {
            "http" | "https" => Some(target.to_string()),
            _ => None,
        }
    }

    /// Whether the URL is the provider's `/url?q=` redirect form
    fn is_redirect_wrapper(&self, url: &Url) -> bool {
        url.path() == "/url" && url.host_str() == self.origin.host_str()
    }
}
