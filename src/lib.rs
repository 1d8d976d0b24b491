//! Report-Scout: a polite corporate report finder
//!
//! This crate searches the web for a company's annual, sustainability, or
//! financial report, validates and pre-classifies candidate documents before
//! paying for full extraction, and records exactly one outcome per company.

pub mod acquisition;
pub mod config;
pub mod document;
pub mod output;
pub mod state;
pub mod storage;

use thiserror::Error;

/// Main error type for Report-Scout operations
#[derive(Debug, Error)]
pub enum ScoutError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid cascade transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::CascadeState,
        to: state::CascadeState,
    },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid query template: {0}")]
    InvalidTemplate(String),
}

/// Network-level failures from a single request
///
/// Every variant is recovered locally by the cascade: the candidate or tier
/// that produced it is skipped.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Connection failed for {url}: {message}")]
    Connect { url: String, message: String },

    #[error("HTTP {status_code} for {url}")]
    Status { url: String, status_code: u16 },

    #[error("Failed to read body from {url}: {message}")]
    Body { url: String, message: String },

    #[error("Invalid request URL: {url}")]
    InvalidUrl { url: String },

    #[error("Request to {url} failed: {message}")]
    Request { url: String, message: String },
}

impl FetchError {
    /// Classifies a reqwest error the same way for GET and HEAD requests
    pub fn from_reqwest(url: &str, error: &reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout {
                url: url.to_string(),
            }
        } else if error.is_connect() {
            Self::Connect {
                url: url.to_string(),
                message: error.to_string(),
            }
        } else if error.is_builder() {
            Self::InvalidUrl {
                url: url.to_string(),
            }
        } else {
            Self::Request {
                url: url.to_string(),
                message: error.to_string(),
            }
        }
    }

    /// Returns true for timeouts, which are reported separately in the audit log
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Failures turning a document body into text
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Unsupported document format (content-type: {content_type})")]
    UnsupportedFormat { content_type: String },

    #[error("Failed to open PDF: {0}")]
    Pdf(String),

    #[error("PDF is encrypted")]
    Encrypted,

    #[error("Document has no pages")]
    Empty,

    #[error("Extraction worker failed: {0}")]
    Worker(String),
}

/// Result type alias for Report-Scout operations
pub type Result<T> = std::result::Result<T, ScoutError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use acquisition::{run_scout, CancelHandle, CancelSignal, Controller, RunContext};
pub use config::{Config, QueryTier};
pub use state::{CascadeState, Outcome, ReportType};
