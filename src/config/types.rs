use crate::config::tiers::default_tiers;
use crate::state::ReportType;
use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Report-Scout
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub companies: Vec<String>,
    #[serde(rename = "tier", default = "default_tiers")]
    pub tiers: Vec<QueryTier>,
}

/// Cascade tuning: thresholds, depths, timeouts and politeness
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Extracted text shorter than this (in characters) counts as a failed extraction
    #[serde(rename = "min-text-length")]
    pub min_text_length: usize,

    /// Number of leading PDF pages decoded for classification
    #[serde(rename = "preview-pages")]
    pub preview_pages: usize,

    /// Number of leading preview characters the classifier inspects
    #[serde(rename = "classification-prefix-chars")]
    pub classification_prefix_chars: usize,

    /// Timeout for search and document GET requests (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// Timeout for header-only validation probes (seconds)
    #[serde(rename = "probe-timeout-secs")]
    pub probe_timeout_secs: u64,

    /// Pause after a tier produced nothing, before the next tier (milliseconds)
    #[serde(rename = "politeness-interval-ms")]
    pub politeness_interval_ms: u64,

    /// Maximum number of requests in flight across the whole run
    #[serde(rename = "max-concurrent-requests")]
    pub max_concurrent_requests: u32,

    /// Cooldown before a released request slot can be reused (milliseconds)
    #[serde(rename = "rate-period-ms")]
    pub rate_period_ms: u64,

    /// Maximum number of company cascades running at once
    #[serde(rename = "max-concurrent-companies")]
    pub max_concurrent_companies: u32,

    /// Maximum redirect hops followed for a single request
    #[serde(rename = "max-redirects")]
    pub max_redirects: usize,
}

impl EngineConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    pub fn politeness_interval(&self) -> Duration {
        Duration::from_millis(self.politeness_interval_ms)
    }

    pub fn rate_period(&self) -> Duration {
        Duration::from_millis(self.rate_period_ms)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_text_length: 100,
            preview_pages: 5,
            classification_prefix_chars: 5000,
            request_timeout_secs: 30,
            probe_timeout_secs: 10,
            politeness_interval_ms: 2000,
            max_concurrent_requests: 5,
            rate_period_ms: 1000,
            max_concurrent_companies: 2,
            max_redirects: 10,
        }
    }
}

/// Search provider endpoint and the browser-like header set sent to it
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Search endpoint; the query is sent as the `q` parameter
    pub url: String,

    /// Year substituted for `{year}` in tier templates
    #[serde(rename = "report-year")]
    pub report_year: u32,

    #[serde(rename = "user-agent")]
    pub user_agent: String,

    pub accept: String,

    #[serde(rename = "accept-language")]
    pub accept_language: String,

    /// Sent as `Referer`; left out when empty
    pub referer: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            url: "https://www.google.com/search".to_string(),
            report_year: 2023,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36"
                .to_string(),
            accept: "text/html,application/xhtml+xml,application/pdf".to_string(),
            accept_language: "en-US,en;q=0.9".to_string(),
            referer: "https://www.google.com/".to_string(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Path to the JSON results file
    #[serde(rename = "results-path")]
    pub results_path: String,

    /// Path to the markdown summary file
    #[serde(rename = "summary-path")]
    pub summary_path: String,

    /// Path to the append-only audit log
    #[serde(rename = "audit-log-path")]
    pub audit_log_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            database_path: "./data/report_scout.db".to_string(),
            results_path: "./data/nonpublic_annual_reports.json".to_string(),
            summary_path: "./data/summary.md".to_string(),
            audit_log_path: "./logs/scraping_log.txt".to_string(),
        }
    }
}

/// One stage of the query cascade
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct QueryTier {
    /// Search query with `{company}`, `{company_slug}` and `{year}` placeholders
    pub template: String,

    /// Report type recorded when this tier succeeds
    #[serde(rename = "report-type")]
    pub report_type: ReportType,

    /// Whether candidates must pass classification before being accepted
    #[serde(default)]
    pub strict: bool,
}
