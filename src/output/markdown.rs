//! Markdown summary generation
//!
//! This module generates a human-readable markdown summary of a run: run
//! metadata, outcome counts, and a per-company result table.

use crate::output::traits::OutputResult;
use crate::output::RunReport;
use crate::state::Outcome;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes a markdown summary of a run report
///
/// # Arguments
///
/// * `report` - The run report
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote markdown summary
/// * `Err(OutputError)` - Failed to write summary
pub fn generate_markdown_summary(report: &RunReport, output_path: &Path) -> OutputResult<()> {
    let markdown = format_markdown_summary(report);

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a run report as markdown
pub fn format_markdown_summary(report: &RunReport) -> String {
    let run = &report.run;
    let summary = &report.summary;
    let mut md = String::new();

    md.push_str("# Report-Scout Run Summary\n\n");

    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Run ID**: {}\n", run.id));
    md.push_str(&format!("- **Started**: {}\n", run.started_at));
    if let Some(finished) = &run.finished_at {
        md.push_str(&format!("- **Finished**: {}\n", finished));
    }
    if let Some(duration) = report.duration_seconds() {
        md.push_str(&format!(
            "- **Duration**: {} seconds ({:.2} minutes)\n",
            duration,
            duration as f64 / 60.0
        ));
    }
    md.push_str(&format!("- **Status**: {}\n", run.status.to_db_string()));
    md.push_str(&format!("- **Config Hash**: {}\n\n", run.config_hash));

    md.push_str("## Overall Statistics\n\n");
    md.push_str(&format!("- **Companies**: {}\n", summary.total));
    md.push_str(&format!("- **Successful**: {}\n", summary.succeeded));
    md.push_str(&format!("- **Failed**: {}\n", summary.failed));
    if summary.cancelled > 0 {
        md.push_str(&format!("- **Cancelled**: {}\n", summary.cancelled));
    }
    md.push_str(&format!(
        "- **Success Rate**: {:.2}%\n\n",
        summary.success_rate()
    ));

    md.push_str("## Reports by Type\n\n");
    md.push_str("| Report Type | Count |\n");
    md.push_str("|-------------|-------|\n");
    for (report_type, count) in &summary.by_report_type {
        md.push_str(&format!("| {} | {} |\n", report_type.label(), count));
    }
    md.push('\n');

    if !report.outcomes.is_empty() {
        md.push_str("## Companies\n\n");
        md.push_str("| Company | Status | Report Type | Pages | Characters | URL |\n");
        md.push_str("|---------|--------|-------------|-------|------------|-----|\n");

        for outcome in &report.outcomes {
            let row = match outcome {
                Outcome::Success {
                    company,
                    url,
                    text,
                    page_count,
                    report_type,
                    ..
                } => format!(
                    "| {} | success | {} | {} | {} | {} |\n",
                    escape_cell(company),
                    report_type.label(),
                    page_count,
                    text.chars().count(),
                    escape_cell(url)
                ),
                other => format!(
                    "| {} | {} | - | - | - | - |\n",
                    escape_cell(other.company()),
                    other.status()
                ),
            };
            md.push_str(&row);
        }
        md.push('\n');
    }

    md
}

fn escape_cell(value: &str) -> String {
    value.replace('|', "\\|")
}
