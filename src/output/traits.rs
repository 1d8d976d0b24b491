//! Output sink traits and error types
//!
//! This module defines the trait interface for outcome sinks and the
//! associated error type.

use crate::state::Outcome;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("Failed to format output: {0}")]
    Format(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Destination for the outcomes of a finished run
///
/// Outcomes arrive in company order, paired with each company's position in
/// the configured list. Implementations must be thread-safe.
pub trait OutcomeSink: Send + Sync {
    /// Short name used in log lines
    fn name(&self) -> &'static str;

    /// Persists every outcome of the run
    fn persist(&self, outcomes: &[(usize, Outcome)]) -> OutputResult<()>;
}
