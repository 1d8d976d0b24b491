//! Acquisition module: finding, validating and fetching report documents
//!
//! This module contains the core cascade logic, including:
//! - The run-wide request rate limiter
//! - HTTP fetching for search pages, header probes and document bodies
//! - Candidate link extraction from search result pages
//! - Header-only candidate validation
//! - The per-company query cascade controller

mod candidates;
mod context;
mod controller;
mod fetcher;
mod rate_limiter;
mod validator;

pub use candidates::{Candidate, CandidateExtractor, Candidates, DOCUMENT_MARKER};
pub use context::{cancel_pair, CancelHandle, CancelSignal, RunContext};
pub use controller::{CandidateResult, Controller, SkipReason, TierResult};
pub use fetcher::{build_http_client, search_url_for, FetchedDocument, Fetcher, ProbeResponse};
pub use rate_limiter::{RateLimiter, RatePermit};
pub use validator::{has_document_extension, looks_like_document, ValidationOutcome, Validator};

use crate::config::{validate, Config};
use crate::document::{LopdfDecoder, PdfDecoder};
use crate::output::{
    generate_markdown_summary, generate_report, AuditLog, JsonFileSink, OutcomeRecorder, OutcomeSink,
    RunReport, SqliteOutcomeSink,
};
use crate::storage::{open_storage, RunStatus, Storage};
use crate::ScoutError;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Runs a complete acquisition pass over every configured company
///
/// This is the main entry point for a run. It will:
/// 1. Open the audit log and the database, and register the run
/// 2. Run each company's query cascade, a bounded number at a time
/// 3. Persist the outcomes to the JSON results file and the database
/// 4. Write the summary block to the audit log and the markdown summary
///
/// # Arguments
///
/// * `config` - The validated run configuration
/// * `config_hash` - Hash of the configuration file, stored with the run
/// * `cancel` - Cancellation signal; cancelled companies record a cancelled outcome
///
/// # Returns
///
/// * `Ok(RunReport)` - The run finished (possibly cancelled) and was persisted
/// * `Err(ScoutError)` - The run could not be started or its results could not be stored
pub async fn run_scout(config: Config, config_hash: &str, cancel: CancelSignal) -> Result<RunReport, ScoutError> {
    run_scout_with_decoder(config, config_hash, cancel, Arc::new(LopdfDecoder)).await
}

/// Same as [`run_scout`], with a specific PDF decoder
pub async fn run_scout_with_decoder(
    config: Config,
    config_hash: &str,
    cancel: CancelSignal,
    decoder: Arc<dyn PdfDecoder>,
) -> Result<RunReport, ScoutError> {
    validate(&config)?;

    let audit = Arc::new(AuditLog::open(Path::new(&config.output.audit_log_path))?);
    let storage = Arc::new(Mutex::new(open_storage(Path::new(&config.output.database_path))?));

    let run_id = storage
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .create_run(config_hash)?;
    tracing::info!("Started run {} for {} companies", run_id, config.companies.len());

    let companies = config.companies.clone();
    let results_path = config.output.results_path.clone();
    let summary_path = config.output.summary_path.clone();

    let controller = Controller::new(RunContext::with_decoder(config, audit.clone(), cancel, decoder)?)?;
    let recorder = OutcomeRecorder::new();
    controller.run_all(&companies, &recorder).await;

    let entries = recorder.entries();
    let summary = recorder.summary();
    audit.log_separator();
    audit.log_summary(&summary);

    let sinks: Vec<Box<dyn OutcomeSink>> = vec![
        Box::new(JsonFileSink::new(&results_path)),
        Box::new(SqliteOutcomeSink::new(storage.clone(), run_id)),
    ];
    let mut persisted = true;
    for sink in &sinks {
        if let Err(e) = sink.persist(&entries) {
            tracing::error!("Failed to persist outcomes to {}: {}", sink.name(), e);
            audit.log(format!("Failed to save results ({}): {}", sink.name(), e));
            persisted = false;
        }
    }

    let status = if !persisted {
        RunStatus::Failed
    } else if summary.cancelled > 0 {
        RunStatus::Cancelled
    } else {
        RunStatus::Completed
    };

    let report = {
        let mut storage = storage.lock().unwrap_or_else(|e| e.into_inner());
        storage.finish_run(run_id, status)?;
        generate_report(&*storage, run_id)?
    };

    if let Err(e) = generate_markdown_summary(&report, Path::new(&summary_path)) {
        tracing::warn!("Failed to write markdown summary: {}", e);
    }

    tracing::info!(
        "Run {} finished: {} succeeded, {} failed, {} cancelled",
        run_id,
        summary.succeeded,
        summary.failed,
        summary.cancelled
    );

    Ok(report)
}
