//! Output module for recording outcomes and generating run summaries
//!
//! This module handles:
//! - The append-only audit log
//! - Collecting per-company outcomes from concurrent cascades
//! - Persisting outcomes to the JSON results file and SQLite
//! - Generating markdown summaries and run statistics

mod audit;
mod json;
mod markdown;
mod recorder;
mod sqlite_output;
pub mod stats;
mod traits;

pub use audit::{AuditLog, AUDIT_TIMESTAMP_FORMAT};
pub use json::{read_results_json, JsonFileSink};
pub use markdown::{format_markdown_summary, generate_markdown_summary};
pub use recorder::OutcomeRecorder;
pub use sqlite_output::SqliteOutcomeSink;
pub use stats::{load_summary, print_summary, RunSummary};
pub use traits::{OutcomeSink, OutputError, OutputResult};

use crate::state::Outcome;
use crate::storage::{RunRecord, Storage};
use crate::ScoutError;

/// A finished run with its outcomes
#[derive(Debug, Clone)]
pub struct RunReport {
    pub run: RunRecord,
    pub summary: RunSummary,
    /// Outcomes in company order
    pub outcomes: Vec<Outcome>,
}

impl RunReport {
    /// Wall-clock duration, if the run has finished
    pub fn duration_seconds(&self) -> Option<u64> {
        let started = self.run.started_at.parse::<chrono::DateTime<chrono::Utc>>().ok()?;
        let finished = self
            .run
            .finished_at
            .as_ref()?
            .parse::<chrono::DateTime<chrono::Utc>>()
            .ok()?;
        Some((finished - started).num_seconds().max(0) as u64)
    }
}

/// Builds the report for a stored run
///
/// # Arguments
///
/// * `storage` - The storage backend containing run data
/// * `run_id` - The run to report on
///
/// # Returns
///
/// * `Ok(RunReport)` - Successfully generated report
/// * `Err(ScoutError)` - The run does not exist or could not be read
pub fn generate_report(storage: &dyn Storage, run_id: i64) -> Result<RunReport, ScoutError> {
    let run = storage.get_run(run_id)?;
    let outcomes = storage.load_outcomes(run_id)?;
    let summary = RunSummary::from_outcomes(&outcomes);

    Ok(RunReport {
        run,
        summary,
        outcomes,
    })
}

/// Builds the report for the most recent run
pub fn generate_latest_report(storage: &dyn Storage) -> Result<Option<RunReport>, ScoutError> {
    match storage.get_latest_run()? {
        Some(run) => generate_report(storage, run.id).map(Some),
        None => Ok(None),
    }
}
