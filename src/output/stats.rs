//! Run statistics derived from outcomes
//!
//! This module provides the per-run counts shown in the audit log footer,
//! the markdown summary, and the `--stats` command.

use crate::state::{Outcome, ReportType};
use crate::storage::Storage;
use crate::ScoutError;
use std::collections::BTreeMap;

/// Outcome counts for one run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    /// Number of companies with a terminal outcome
    pub total: u64,

    pub succeeded: u64,

    pub failed: u64,

    pub cancelled: u64,

    /// Successful outcomes per report type
    pub by_report_type: BTreeMap<ReportType, u64>,
}

impl RunSummary {
    /// Tallies a set of outcomes
    pub fn from_outcomes<'a>(outcomes: impl IntoIterator<Item = &'a Outcome>) -> Self {
        let mut summary = Self::default();
        for report_type in ReportType::all() {
            summary.by_report_type.insert(report_type, 0);
        }

        for outcome in outcomes {
            summary.total += 1;
            match outcome {
                Outcome::Success { report_type, .. } => {
                    summary.succeeded += 1;
                    *summary.by_report_type.entry(*report_type).or_insert(0) += 1;
                }
                Outcome::Failure { .. } => summary.failed += 1,
                Outcome::Cancelled { .. } => summary.cancelled += 1,
            }
        }

        summary
    }

    /// Successful outcomes of one report type
    pub fn count_for(&self, report_type: ReportType) -> u64 {
        self.by_report_type.get(&report_type).copied().unwrap_or(0)
    }

    /// Returns the success rate as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (self.succeeded as f64 / self.total as f64) * 100.0
    }

    /// The summary block written at the end of the audit log
    pub fn log_lines(&self) -> Vec<String> {
        let mut lines = vec![
            "Scraping completed:".to_string(),
            format!("Total companies processed: {}", self.total),
            format!("Successful retrievals: {}", self.succeeded),
        ];
        for (report_type, count) in &self.by_report_type {
            lines.push(format!("  - {}s: {}", report_type.label(), count));
        }
        lines.push(format!("Failed retrievals: {}", self.failed));
        if self.cancelled > 0 {
            lines.push(format!("Cancelled: {}", self.cancelled));
        }
        lines
    }
}

/// Loads the summary of a stored run
///
/// # Arguments
///
/// * `storage` - The storage backend to query
/// * `run_id` - Run to summarize
///
/// # Returns
///
/// * `Ok(RunSummary)` - Successfully loaded statistics
/// * `Err(ScoutError)` - Failed to query statistics
pub fn load_summary(storage: &dyn Storage, run_id: i64) -> Result<RunSummary, ScoutError> {
    let outcomes = storage.load_outcomes(run_id)?;
    Ok(RunSummary::from_outcomes(&outcomes))
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `summary` - The statistics to display
pub fn print_summary(summary: &RunSummary) {
    println!("=== Run Statistics ===\n");

    println!("Overview:");
    println!("  Companies processed: {}", summary.total);
    println!("  Successful: {}", summary.succeeded);
    println!("  Failed: {}", summary.failed);
    if summary.cancelled > 0 {
        println!("  Cancelled: {}", summary.cancelled);
    }
    println!();

    println!("Reports by Type:");
    for (report_type, count) in &summary.by_report_type {
        println!("  {}: {}", report_type.label(), count);
    }
    println!();

    println!(
        "Success Rate: {:.1}% ({} / {} companies)",
        summary.success_rate(),
        summary.succeeded,
        summary.total
    );
}
