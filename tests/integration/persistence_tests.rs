//! Integration tests for complete runs and their persisted results
//!
//! These tests go through `run_scout_with_decoder`, then read back the JSON
//! results file, the database, the markdown summary and the audit log.

mod common;

use common::{
    filler_pages, mount_pdf, mount_search, query_for, test_config, ScriptedDecoder, TestPaths, ACME_REPORT_PATH,
};
use report_scout::acquisition::{cancel_pair, run_scout_with_decoder, CancelSignal};
use report_scout::config::default_tiers;
use report_scout::output::{generate_latest_report, read_results_json};
use report_scout::storage::{RunStatus, SqliteStorage, Storage};
use report_scout::ReportType;
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Acme has an annual report on the first tier; every other search is empty
async fn mount_acme(server: &MockServer) -> String {
    let tiers = default_tiers();
    let doc_url = format!("{}{}", server.uri(), ACME_REPORT_PATH);

    mount_search(server, &query_for(&tiers[0], "Acme Corp"), &[doc_url.clone()]).await;
    mount_pdf(server, ACME_REPORT_PATH, b"%PDF-acme").await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><body></body></html>"))
        .mount(server)
        .await;

    doc_url
}

#[tokio::test]
async fn test_full_run_persists_every_outcome() {
    let server = MockServer::start().await;
    let paths = TestPaths::new();
    let doc_url = mount_acme(&server).await;

    let decoder = Arc::new(ScriptedDecoder::new().with_document(b"%PDF-acme", filler_pages(40, 300)));
    let config = test_config(&server, &paths, &["Acme Corp", "NoReport Inc"], default_tiers());

    let report = run_scout_with_decoder(config, "test-hash", CancelSignal::never(), decoder)
        .await
        .unwrap();

    assert_eq!(report.run.status, RunStatus::Completed);
    assert_eq!(report.run.config_hash, "test-hash");
    assert!(report.run.finished_at.is_some());
    assert_eq!(report.summary.total, 2);
    assert_eq!(report.summary.succeeded, 1);
    assert_eq!(report.summary.failed, 1);
    assert_eq!(report.summary.count_for(ReportType::Annual), 1);

    // Outcomes keep company order
    assert_eq!(report.outcomes[0].company(), "Acme Corp");
    assert_eq!(report.outcomes[0].url(), Some(doc_url.as_str()));
    assert!(report.outcomes[1].is_failure());

    // JSON results
    let from_json = read_results_json(&paths.results()).unwrap();
    assert_eq!(from_json.len(), 2);
    assert!(from_json[0].same_result(&report.outcomes[0]));
    assert!(from_json[1].same_result(&report.outcomes[1]));

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(paths.results()).unwrap()).unwrap();
    assert_eq!(raw[0]["status"], "success");
    assert_eq!(raw[0]["pages"], 40);
    assert_eq!(raw[0]["reportType"], "annual");
    assert_eq!(raw[0]["completeText"].as_str().unwrap().len(), 12000);
    assert_eq!(raw[1]["status"], "failed");
    assert_eq!(raw[1]["company"], "NoReport Inc");

    // Database
    let storage = SqliteStorage::new(&paths.database()).unwrap();
    let stored = storage.load_outcomes(report.run.id).unwrap();
    assert_eq!(stored.len(), 2);
    assert!(stored[0].same_result(&report.outcomes[0]));
    assert_eq!(storage.count_outcomes(report.run.id, "success").unwrap(), 1);
    assert_eq!(storage.count_outcomes(report.run.id, "failed").unwrap(), 1);

    // Markdown summary and audit log
    let summary = std::fs::read_to_string(paths.summary()).unwrap();
    assert!(summary.contains("# Report-Scout Run Summary"));
    assert!(summary.contains("| Acme Corp | success | Annual Report | 40 | 12000 |"));
    assert!(summary.contains("| NoReport Inc | failed |"));

    let log = paths.read_audit_log();
    assert!(log.contains("Total companies processed: 2"));
    assert!(log.contains("Successful retrievals: 1"));
    assert!(log.contains("Failed retrievals: 1"));
}

#[tokio::test]
async fn test_successive_runs_are_kept_separately() {
    let server = MockServer::start().await;
    let paths = TestPaths::new();
    mount_acme(&server).await;

    let decoder = Arc::new(ScriptedDecoder::new().with_document(b"%PDF-acme", filler_pages(3, 100)));

    let first = run_scout_with_decoder(
        test_config(&server, &paths, &["Acme Corp"], default_tiers()),
        "hash-1",
        CancelSignal::never(),
        decoder.clone(),
    )
    .await
    .unwrap();
    let second = run_scout_with_decoder(
        test_config(&server, &paths, &["Acme Corp"], default_tiers()),
        "hash-2",
        CancelSignal::never(),
        decoder,
    )
    .await
    .unwrap();

    assert_ne!(first.run.id, second.run.id);
    assert!(first.outcomes[0].same_result(&second.outcomes[0]));

    let storage = SqliteStorage::new(&paths.database()).unwrap();
    let latest = generate_latest_report(&storage).unwrap().unwrap();
    assert_eq!(latest.run.id, second.run.id);
    assert_eq!(latest.run.config_hash, "hash-2");

    // The audit log accumulates across runs
    let log = paths.read_audit_log();
    assert_eq!(log.matches("Starting process for company: Acme Corp").count(), 2);
}

#[tokio::test]
async fn test_cancelled_run_records_cancelled_outcomes() {
    let server = MockServer::start().await;
    let paths = TestPaths::new();

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (handle, signal) = cancel_pair();
    handle.cancel();

    let config = test_config(&server, &paths, &["Acme Corp", "Beta Ltd"], default_tiers());
    let report = run_scout_with_decoder(config, "hash", signal, Arc::new(ScriptedDecoder::new()))
        .await
        .unwrap();

    assert_eq!(report.run.status, RunStatus::Cancelled);
    assert_eq!(report.summary.cancelled, 2);
    assert!(report.outcomes.iter().all(|o| o.is_cancelled()));

    let from_json = read_results_json(&paths.results()).unwrap();
    assert_eq!(from_json.len(), 2);
    assert_eq!(from_json[1].company(), "Beta Ltd");
    assert!(from_json[1].is_cancelled());
}

#[tokio::test]
async fn test_invalid_config_aborts_before_any_request() {
    let server = MockServer::start().await;
    let paths = TestPaths::new();

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = test_config(&server, &paths, &["Acme Corp"], default_tiers());
    config.tiers.clear();

    let result = run_scout_with_decoder(config, "hash", CancelSignal::never(), Arc::new(ScriptedDecoder::new())).await;

    assert!(result.is_err());
    assert!(!paths.database().exists());
    assert!(!paths.results().exists());
}
