//! Query cascade controller
//!
//! For each company the controller walks the configured tiers in order. Each
//! tier issues one search, and its candidates are tried one at a time through
//! validate → download → (strict tiers only) classify → full extraction. The
//! first candidate to clear every gate ends the cascade with a success; a tier
//! that yields nothing is followed by a politeness pause and the next tier.
//!
//! Every step returns a typed result. Nothing below the run level is fatal:
//! network, format, and classification problems skip the candidate or tier
//! and are written to the audit log. Cascades for different companies share
//! one audit log, so every line names the company it belongs to.

use crate::acquisition::candidates::Candidate;
use crate::acquisition::context::RunContext;
use crate::acquisition::fetcher::search_url_for;
use crate::acquisition::validator::ValidationOutcome;
use crate::config::QueryTier;
use crate::document::{DocumentFormat, ExtractedDocument, ExtractionDepth, PageExtraction, Verdict};
use crate::output::OutcomeRecorder;
use crate::state::{CascadeState, Outcome};
use crate::{ConfigError, ScoutError};
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Why a candidate was passed over
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The URL was already tried for this company
    AlreadyAttempted,
    /// The header probe did not indicate a document
    Invalid(String),
    /// The body could not be downloaded
    Fetch(String),
    /// The body could not be turned into text
    Format(String),
    /// A strict tier's classifier found no report indicators
    Rejected,
    /// Full extraction produced fewer characters than required
    TooShort { chars: usize, required: usize },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyAttempted => write!(f, "already attempted"),
            Self::Invalid(reason) => write!(f, "validation failed ({})", reason),
            Self::Fetch(reason) => write!(f, "download failed ({})", reason),
            Self::Format(reason) => write!(f, "extraction failed ({})", reason),
            Self::Rejected => write!(f, "document does not appear to be an annual report"),
            Self::TooShort { chars, required } => write!(
                f,
                "extracted text was too short ({} of {} characters)",
                chars, required
            ),
        }
    }
}

/// Result of trying one candidate
#[derive(Debug)]
pub enum CandidateResult {
    Accepted(ExtractedDocument),
    Skipped(SkipReason),
    Cancelled,
}

/// Result of running one tier
#[derive(Debug)]
pub enum TierResult {
    Accepted(ExtractedDocument),
    Exhausted,
    Cancelled,
}

/// Per-company cascade bookkeeping
#[derive(Debug)]
struct CompanyCascade {
    company: String,
    state: CascadeState,
    /// Candidate URLs already tried, across all tiers
    attempted: HashSet<String>,
}

impl CompanyCascade {
    fn new(company: &str) -> Self {
        Self {
            company: company.trim().to_string(),
            state: CascadeState::Pending,
            attempted: HashSet::new(),
        }
    }

    fn enter(&mut self, next: CascadeState) -> Result<(), ScoutError> {
        if !self.state.can_transition_to(next) {
            return Err(ScoutError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        self.state = next;
        Ok(())
    }
}

/// Drives query cascades for one run
#[derive(Clone)]
pub struct Controller {
    ctx: Arc<RunContext>,
}

impl Controller {
    /// Creates a controller, rejecting configurations that cannot run
    pub fn new(ctx: RunContext) -> Result<Self, ScoutError> {
        if ctx.config.tiers.is_empty() {
            return Err(ConfigError::Validation("at least one query tier is required".to_string()).into());
        }
        Ok(Self { ctx: Arc::new(ctx) })
    }

    pub fn context(&self) -> &RunContext {
        &self.ctx
    }

    /// Runs every company, bounded by the configured company concurrency
    ///
    /// Each company's outcome is recorded with its position in `companies`.
    pub async fn run_all(&self, companies: &[String], recorder: &OutcomeRecorder) {
        let limit = (self.ctx.config.engine.max_concurrent_companies as usize).max(1);

        stream::iter(companies.iter().enumerate())
            .for_each_concurrent(limit, |(position, company)| async move {
                let outcome = self.run_company(company).await;
                recorder.record(position, outcome);
            })
            .await;
    }

    /// Runs the full cascade for one company and returns its single outcome
    pub async fn run_company(&self, company: &str) -> Outcome {
        let audit = &self.ctx.audit;
        let tiers = &self.ctx.config.tiers;
        let mut cascade = CompanyCascade::new(company);

        audit.log_separator();
        audit.log(format!("Starting process for company: {}", cascade.company));

        for (index, tier) in tiers.iter().enumerate() {
            if self.ctx.is_cancelled() {
                return self.finish_cancelled(&mut cascade);
            }

            self.transition(&mut cascade, CascadeState::TryingTier(index));

            match self.run_tier(&mut cascade, index, tier).await {
                TierResult::Accepted(document) => {
                    self.transition(&mut cascade, CascadeState::Succeeded);
                    self.note(
                        &cascade,
                        format!(
                            "Successfully extracted {} - {} characters",
                            tier.report_type.label(),
                            document.char_len()
                        ),
                    );
                    return Outcome::success(
                        &cascade.company,
                        &document.source_url,
                        document.text,
                        document.page_count,
                        tier.report_type,
                    );
                }
                TierResult::Cancelled => return self.finish_cancelled(&mut cascade),
                TierResult::Exhausted => {}
            }

            if index + 1 < tiers.len() && !self.pause_between_tiers().await {
                return self.finish_cancelled(&mut cascade);
            }
        }

        self.transition(&mut cascade, CascadeState::Exhausted);
        audit.log(format!("Failed to retrieve any reports for {}", cascade.company));
        Outcome::failure(&cascade.company)
    }

    async fn run_tier(&self, cascade: &mut CompanyCascade, index: usize, tier: &QueryTier) -> TierResult {
        let ctx = &self.ctx;
        let query = tier.render(&cascade.company, ctx.config.search.report_year);

        self.note(
            cascade,
            format!(
                "Attempt {}/{} ({}): {}",
                index + 1,
                ctx.config.tiers.len(),
                tier.report_type.label(),
                query
            ),
        );

        let html = match search_url_for(&ctx.config.search.url, &query) {
            Ok(url) => match ctx.fetcher.fetch_text(url.as_str()).await {
                Ok(html) => html,
                Err(e) => {
                    self.note(cascade, format!("Query {} failed: {}", index + 1, e));
                    return TierResult::Exhausted;
                }
            },
            Err(e) => {
                self.note(cascade, format!("Query {} failed: {}", index + 1, e));
                return TierResult::Exhausted;
            }
        };

        let candidates = ctx.candidates.extract(&html, index, &query);
        if candidates.is_empty() {
            self.note(cascade, format!("No candidate documents found for query {}", index + 1));
            return TierResult::Exhausted;
        }
        self.note(cascade, format!("Found {} potential link(s)", candidates.len()));

        for candidate in candidates {
            if ctx.is_cancelled() {
                return TierResult::Cancelled;
            }

            match self.try_candidate(cascade, tier, &candidate).await {
                CandidateResult::Accepted(document) => return TierResult::Accepted(document),
                CandidateResult::Skipped(reason) => {
                    self.note(cascade, format!("Skipped candidate {}: {}", candidate.url, reason));
                }
                CandidateResult::Cancelled => return TierResult::Cancelled,
            }
        }

        TierResult::Exhausted
    }

    async fn try_candidate(
        &self,
        cascade: &mut CompanyCascade,
        tier: &QueryTier,
        candidate: &Candidate,
    ) -> CandidateResult {
        let ctx = &self.ctx;
        let url = candidate.url.as_str();

        if !cascade.attempted.insert(candidate.url.clone()) {
            return CandidateResult::Skipped(SkipReason::AlreadyAttempted);
        }

        match ctx.validator.validate(url).await {
            ValidationOutcome::Accepted { content_type } => {
                self.note(cascade, format!("Candidate {} is valid ({})", url, content_type));
            }
            ValidationOutcome::Rejected { reason } => {
                return CandidateResult::Skipped(SkipReason::Invalid(reason));
            }
        }

        if ctx.is_cancelled() {
            return CandidateResult::Cancelled;
        }

        self.note(cascade, format!("Attempting to download document from: {}", url));
        let fetched = match ctx.fetcher.fetch_document(url).await {
            Ok(fetched) => fetched,
            Err(e) => return CandidateResult::Skipped(SkipReason::Fetch(e.to_string())),
        };

        let format = match DocumentFormat::detect(&fetched.content_type, url, &fetched.bytes) {
            Ok(format) => format,
            Err(e) => return CandidateResult::Skipped(SkipReason::Format(e.to_string())),
        };
        let bytes = Arc::new(fetched.bytes);

        if tier.strict {
            // URL first; the preview is only extracted when the URL says nothing
            let verdict = match ctx.classifier.classify(url, None) {
                Verdict::NoMatch => {
                    let depth = ExtractionDepth::Preview(ctx.config.engine.preview_pages);
                    let preview = match ctx.extractor.extract(bytes.clone(), format, depth, url).await {
                        Ok(preview) => preview,
                        Err(e) => return CandidateResult::Skipped(SkipReason::Format(e.to_string())),
                    };
                    for (page, message) in preview.failed_pages() {
                        self.note(cascade, format!("Error extracting text from page {}: {}", page, message));
                    }
                    ctx.classifier.classify(url, Some(&preview.text))
                }
                url_match => url_match,
            };

            match verdict {
                Verdict::UrlMatch(indicator) => {
                    self.note(cascade, format!("URL matches report indicator '{}'", indicator));
                }
                Verdict::ContentMatch(indicator) => {
                    self.note(cascade, format!("Preview matches report indicator '{}'", indicator));
                }
                Verdict::NoMatch => return CandidateResult::Skipped(SkipReason::Rejected),
            }
        }

        let document = match ctx.extractor.extract(bytes, format, ExtractionDepth::Full, url).await {
            Ok(document) => document,
            Err(e) => return CandidateResult::Skipped(SkipReason::Format(e.to_string())),
        };
        self.note_pages(cascade, &document);
        self.note(
            cascade,
            format!(
                "Document has {} pages, {} characters extracted",
                document.page_count,
                document.char_len()
            ),
        );

        let required = ctx.config.engine.min_text_length;
        if !document.meets_threshold(required) {
            return CandidateResult::Skipped(SkipReason::TooShort {
                chars: document.char_len(),
                required,
            });
        }

        CandidateResult::Accepted(document)
    }

    /// Waits the politeness interval; returns false if cancelled meanwhile
    async fn pause_between_tiers(&self) -> bool {
        let interval = self.ctx.config.engine.politeness_interval();
        if interval.is_zero() {
            return !self.ctx.is_cancelled();
        }

        tokio::select! {
            _ = tokio::time::sleep(interval) => true,
            _ = self.ctx.cancel.cancelled() => false,
        }
    }

    /// Writes an audit line tagged with the cascade's company
    fn note(&self, cascade: &CompanyCascade, message: impl AsRef<str>) {
        self.ctx
            .audit
            .log(format!("[{}] {}", cascade.company, message.as_ref()));
    }

    fn note_pages(&self, cascade: &CompanyCascade, document: &ExtractedDocument) {
        let total = document.page_count;
        for (index, page) in document.pages.iter().enumerate() {
            match page {
                PageExtraction::Text(chars) => self.note(
                    cascade,
                    format!("Extracted text from page {}/{} - Length: {}", index + 1, total, chars),
                ),
                PageExtraction::Failed(message) => self.note(
                    cascade,
                    format!("Error extracting text from page {}: {}", index + 1, message),
                ),
            }
        }
    }

    fn finish_cancelled(&self, cascade: &mut CompanyCascade) -> Outcome {
        self.transition(cascade, CascadeState::Cancelled);
        self.ctx
            .audit
            .log(format!("Run cancelled before a result for {}", cascade.company));
        Outcome::cancelled(&cascade.company)
    }

    fn transition(&self, cascade: &mut CompanyCascade, next: CascadeState) {
        if let Err(e) = cascade.enter(next) {
            tracing::error!("{} ({})", e, cascade.company);
        }
    }
}
