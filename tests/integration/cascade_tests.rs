//! Integration tests for the query cascade
//!
//! These tests drive `Controller::run_company` against a wiremock server
//! standing in for the search provider and the document hosts.

mod common;

use common::{
    audit_messages, filler_pages, mount_pdf, mount_search, query_for, test_config, ScriptedDecoder,
    TestPaths, ACME_REPORT_PATH,
};
use report_scout::acquisition::{cancel_pair, CancelSignal, Controller, RunContext};
use report_scout::config::{default_tiers, Config, QueryTier};
use report_scout::output::{AuditLog, OutcomeRecorder};
use report_scout::state::FAILURE_REASON;
use report_scout::{Outcome, ReportType};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn controller(config: Config, paths: &TestPaths, decoder: Arc<ScriptedDecoder>, cancel: CancelSignal) -> Controller {
    let audit = Arc::new(AuditLog::open(&paths.audit_log()).unwrap());
    let ctx = RunContext::with_decoder(config, audit, cancel, decoder).unwrap();
    Controller::new(ctx).unwrap()
}

fn tier(template: &str, report_type: ReportType, strict: bool) -> QueryTier {
    QueryTier {
        template: template.to_string(),
        report_type,
        strict,
    }
}

#[tokio::test]
async fn test_first_tier_url_match_succeeds_without_preview() {
    let server = MockServer::start().await;
    let paths = TestPaths::new();
    let tiers = default_tiers();

    let doc_url = format!("{}{}", server.uri(), ACME_REPORT_PATH);
    mount_search(&server, &query_for(&tiers[0], "Acme Corp"), &[doc_url.clone()]).await;
    mount_pdf(&server, ACME_REPORT_PATH, b"%PDF-acme").await;

    let decoder = Arc::new(ScriptedDecoder::new().with_document(b"%PDF-acme", filler_pages(40, 300)));
    let config = test_config(&server, &paths, &["Acme Corp"], tiers);
    let controller = controller(config, &paths, decoder.clone(), CancelSignal::never());

    let outcome = controller.run_company("Acme Corp").await;

    match &outcome {
        Outcome::Success {
            company,
            url,
            text,
            page_count,
            report_type,
            ..
        } => {
            assert_eq!(company, "Acme Corp");
            assert_eq!(url, &doc_url);
            assert_eq!(text.chars().count(), 12000);
            assert_eq!(*page_count, 40);
            assert_eq!(*report_type, ReportType::Annual);
        }
        other => panic!("expected success, got {:?}", other),
    }

    // The URL carried an indicator, so only the full extraction ran
    assert_eq!(decoder.calls_for(b"%PDF-acme"), vec![None]);

    let log = paths.read_audit_log();
    assert!(log.contains("Starting process for company: Acme Corp"));
    assert!(log.contains("[Acme Corp] URL matches report indicator 'annual report'"));
    assert!(log.contains("[Acme Corp] Extracted text from page 1/40 - Length: 300"));
    assert!(log.contains("[Acme Corp] Extracted text from page 40/40 - Length: 300"));
    assert!(log.contains("[Acme Corp] Successfully extracted Annual Report - 12000 characters"));
}

#[tokio::test]
async fn test_hyphenated_url_is_classified_from_preview() {
    let server = MockServer::start().await;
    let paths = TestPaths::new();
    let tiers = default_tiers();

    let doc_url = format!("{}/docs/not-annual-report-faq.pdf", server.uri());
    mount_search(&server, &query_for(&tiers[0], "Acme Corp"), &[doc_url.clone()]).await;
    mount_pdf(&server, "/docs/not-annual-report-faq.pdf", b"%PDF-faq").await;

    let decoder = Arc::new(
        ScriptedDecoder::new().with_document(b"%PDF-faq", vec![format!("Frequently asked {}", "q".repeat(300))]),
    );
    let config = test_config(&server, &paths, &["Acme Corp"], vec![tiers[0].clone()]);
    let controller = controller(config, &paths, decoder.clone(), CancelSignal::never());

    let outcome = controller.run_company("Acme Corp").await;

    assert!(outcome.is_failure());
    assert_eq!(decoder.calls_for(b"%PDF-faq"), vec![Some(5)]);
    assert!(paths.read_audit_log().contains("does not appear to be an annual report"));
}

#[tokio::test]
async fn test_page_results_are_written_to_audit_log() {
    let server = MockServer::start().await;
    let paths = TestPaths::new();
    let tiers = vec![tier("{company} esg {year}", ReportType::Sustainability, false)];

    let doc_url = format!("{}/files/esg-2023.pdf", server.uri());
    mount_search(&server, &query_for(&tiers[0], "Acme Corp"), &[doc_url.clone()]).await;
    mount_pdf(&server, "/files/esg-2023.pdf", b"%PDF-esg").await;

    let decoder = Arc::new(ScriptedDecoder::new().with_pages(
        b"%PDF-esg",
        vec![
            Ok("a".repeat(150)),
            Err("invalid content stream".to_string()),
            Ok("b".repeat(150)),
        ],
    ));
    let config = test_config(&server, &paths, &["Acme Corp"], tiers);
    let controller = controller(config, &paths, decoder, CancelSignal::never());

    let outcome = controller.run_company("Acme Corp").await;

    match &outcome {
        Outcome::Success { text, page_count, .. } => {
            assert_eq!(text.chars().count(), 300);
            assert_eq!(*page_count, 3);
        }
        other => panic!("expected success, got {:?}", other),
    }

    let log = paths.read_audit_log();
    assert!(log.contains("[Acme Corp] Extracted text from page 1/3 - Length: 150"));
    assert!(log.contains("[Acme Corp] Error extracting text from page 2: invalid content stream"));
    assert!(log.contains("[Acme Corp] Extracted text from page 3/3 - Length: 150"));
    assert!(log.contains("[Acme Corp] Document has 3 pages, 300 characters extracted"));
}

#[tokio::test]
async fn test_strict_tier_classifies_from_preview() {
    let server = MockServer::start().await;
    let paths = TestPaths::new();
    let tiers = vec![tier("{company} report {year}", ReportType::Annual, true)];

    let doc_url = format!("{}/files/acme-2023.pdf", server.uri());
    mount_search(&server, &query_for(&tiers[0], "Acme Corp"), &[doc_url.clone()]).await;
    mount_pdf(&server, "/files/acme-2023.pdf", b"%PDF-preview").await;

    let mut pages = vec![format!("Acme Corp Annual Report 2023 {}", "x".repeat(200))];
    pages.extend(filler_pages(9, 200));
    let decoder = Arc::new(ScriptedDecoder::new().with_document(b"%PDF-preview", pages));

    let config = test_config(&server, &paths, &["Acme Corp"], tiers);
    let controller = controller(config, &paths, decoder.clone(), CancelSignal::never());

    let outcome = controller.run_company("Acme Corp").await;

    assert!(outcome.is_success());
    assert_eq!(outcome.report_type(), Some(ReportType::Annual));
    assert_eq!(decoder.calls_for(b"%PDF-preview"), vec![Some(5), None]);
}

#[tokio::test]
async fn test_company_without_reports_fails_after_every_tier() {
    let server = MockServer::start().await;
    let paths = TestPaths::new();

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><body><p>No results</p></body></html>"),
        )
        .expect(7)
        .mount(&server)
        .await;

    let decoder = Arc::new(ScriptedDecoder::new());
    let config = test_config(&server, &paths, &["NoReport Inc"], default_tiers());
    let controller = controller(config, &paths, decoder.clone(), CancelSignal::never());

    let outcome = controller.run_company("NoReport Inc").await;

    match &outcome {
        Outcome::Failure { company, reason, .. } => {
            assert_eq!(company, "NoReport Inc");
            assert_eq!(reason, FAILURE_REASON);
        }
        other => panic!("expected failure, got {:?}", other),
    }
    assert_eq!(decoder.total_calls(), 0);

    let log = paths.read_audit_log();
    assert!(log.contains("Failed to retrieve any reports for NoReport Inc"));
    assert_eq!(log.matches("No candidate documents found").count(), 7);
}

#[tokio::test]
async fn test_invalid_candidate_is_skipped_without_download() {
    let server = MockServer::start().await;
    let paths = TestPaths::new();
    let tiers = default_tiers();

    let viewer_url = format!("{}/viewer/pdf-preview", server.uri());
    let doc_url = format!("{}{}", server.uri(), ACME_REPORT_PATH);
    mount_search(
        &server,
        &query_for(&tiers[0], "Acme Corp"),
        &[viewer_url.clone(), doc_url.clone()],
    )
    .await;

    Mock::given(method("HEAD"))
        .and(path("/viewer/pdf-preview"))
        .respond_with(ResponseTemplate::new(200).insert_header("content-type", "text/html"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/viewer/pdf-preview"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    mount_pdf(&server, ACME_REPORT_PATH, b"%PDF-acme").await;

    let decoder = Arc::new(ScriptedDecoder::new().with_document(b"%PDF-acme", filler_pages(4, 100)));
    let config = test_config(&server, &paths, &["Acme Corp"], tiers);
    let controller = controller(config, &paths, decoder, CancelSignal::never());

    let outcome = controller.run_company("Acme Corp").await;

    assert_eq!(outcome.url(), Some(doc_url.as_str()));
    let log = paths.read_audit_log();
    assert!(log.contains(&format!("Skipped candidate {}", viewer_url)));
}

#[tokio::test]
async fn test_rejected_candidate_not_retried_in_later_tier() {
    let server = MockServer::start().await;
    let paths = TestPaths::new();
    let tiers = vec![
        tier("{company} annual {year}", ReportType::Annual, true),
        tier("{company} esg {year}", ReportType::Sustainability, false),
    ];

    let brochure_url = format!("{}/files/brochure.pdf", server.uri());
    let esg_url = format!("{}/files/esg-2023.pdf", server.uri());
    mount_search(&server, &query_for(&tiers[0], "Acme Corp"), &[brochure_url.clone()]).await;
    mount_search(
        &server,
        &query_for(&tiers[1], "Acme Corp"),
        &[brochure_url.clone(), esg_url.clone()],
    )
    .await;

    Mock::given(method("HEAD"))
        .and(path("/files/brochure.pdf"))
        .respond_with(ResponseTemplate::new(200).insert_header("content-type", "application/pdf"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/files/brochure.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"%PDF-brochure".to_vec(), "application/pdf"))
        .expect(1)
        .mount(&server)
        .await;
    mount_pdf(&server, "/files/esg-2023.pdf", b"%PDF-esg").await;

    let decoder = Arc::new(
        ScriptedDecoder::new()
            .with_document(b"%PDF-brochure", vec![format!("Our product range {}", "y".repeat(500))])
            .with_document(b"%PDF-esg", filler_pages(3, 200)),
    );
    let config = test_config(&server, &paths, &["Acme Corp"], tiers);
    let controller = controller(config, &paths, decoder.clone(), CancelSignal::never());

    let outcome = controller.run_company("Acme Corp").await;

    assert_eq!(outcome.url(), Some(esg_url.as_str()));
    assert_eq!(outcome.report_type(), Some(ReportType::Sustainability));

    // Preview only for the rejected brochure; the non-strict tier skips classification
    assert_eq!(decoder.calls_for(b"%PDF-brochure"), vec![Some(5)]);
    assert_eq!(decoder.calls_for(b"%PDF-esg"), vec![None]);

    let log = paths.read_audit_log();
    assert!(log.contains("does not appear to be an annual report"));
    assert!(log.contains("already attempted"));
}

#[tokio::test]
async fn test_short_document_falls_through_to_next_candidate() {
    let server = MockServer::start().await;
    let paths = TestPaths::new();
    let tiers = default_tiers();

    let short_url = format!("{}/reports/annual%20report%20scan.pdf", server.uri());
    let full_url = format!("{}/reports/annual%20report%20full.pdf", server.uri());
    mount_search(
        &server,
        &query_for(&tiers[0], "Acme Corp"),
        &[short_url.clone(), full_url.clone()],
    )
    .await;
    mount_pdf(&server, "/reports/annual%20report%20scan.pdf", b"%PDF-scan").await;
    mount_pdf(&server, "/reports/annual%20report%20full.pdf", b"%PDF-full").await;

    let decoder = Arc::new(
        ScriptedDecoder::new()
            .with_document(b"%PDF-scan", vec!["  page 1  ".to_string(), "".to_string()])
            .with_document(b"%PDF-full", filler_pages(2, 60)),
    );
    let config = test_config(&server, &paths, &["Acme Corp"], tiers);
    let controller = controller(config, &paths, decoder, CancelSignal::never());

    let outcome = controller.run_company("Acme Corp").await;

    match &outcome {
        Outcome::Success { url, text, page_count, .. } => {
            assert_eq!(url, &full_url);
            assert_eq!(text.chars().count(), 120);
            assert_eq!(*page_count, 2);
        }
        other => panic!("expected success, got {:?}", other),
    }

    let log = paths.read_audit_log();
    assert!(log.contains("extracted text was too short (6 of 100 characters)"));
}

#[tokio::test]
async fn test_search_error_advances_to_next_tier() {
    let server = MockServer::start().await;
    let paths = TestPaths::new();
    let tiers = default_tiers();

    let doc_url = format!("{}/ar/acme.pdf", server.uri());
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", query_for(&tiers[0], "Acme Corp")))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    mount_search(&server, &query_for(&tiers[1], "Acme Corp"), &[doc_url.clone()]).await;
    mount_pdf(&server, "/ar/acme.pdf", b"%PDF-ar").await;

    let pages = vec![format!("Annual Report for the fiscal year 2023 {}", "z".repeat(200))];
    let decoder = Arc::new(ScriptedDecoder::new().with_document(b"%PDF-ar", pages));
    let config = test_config(&server, &paths, &["Acme Corp"], tiers);
    let controller = controller(config, &paths, decoder, CancelSignal::never());

    let outcome = controller.run_company("Acme Corp").await;

    assert_eq!(outcome.url(), Some(doc_url.as_str()));
    assert_eq!(outcome.report_type(), Some(ReportType::Annual));
    assert!(paths.read_audit_log().contains("Query 1 failed"));
}

#[tokio::test]
async fn test_markup_document_is_extracted_as_text() {
    let server = MockServer::start().await;
    let paths = TestPaths::new();
    let tiers = vec![tier("{company} financial report", ReportType::Financial, false)];

    let doc_url = format!("{}/investors/report.pdf", server.uri());
    mount_search(&server, &query_for(&tiers[0], "Acme Corp"), &[doc_url.clone()]).await;

    let paragraph = "Revenue grew steadily across every region during the year. ".repeat(5);
    let html = format!(
        "<html><head><title>ignored</title><script>var x = 1;</script></head>\
         <body><h1>Financial Report</h1><p>{}</p></body></html>",
        paragraph
    );
    Mock::given(method("HEAD"))
        .and(path("/investors/report.pdf"))
        .respond_with(ResponseTemplate::new(200).insert_header("content-type", "text/html"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/investors/report.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(html.into_bytes(), "text/html"))
        .mount(&server)
        .await;

    let decoder = Arc::new(ScriptedDecoder::new());
    let config = test_config(&server, &paths, &["Acme Corp"], tiers);
    let controller = controller(config, &paths, decoder.clone(), CancelSignal::never());

    let outcome = controller.run_company("Acme Corp").await;

    match &outcome {
        Outcome::Success { text, page_count, .. } => {
            assert_eq!(*page_count, 1);
            assert!(text.starts_with("Financial Report"));
            assert!(text.contains("Revenue grew steadily"));
            assert!(!text.contains("var x"));
        }
        other => panic!("expected success, got {:?}", other),
    }
    assert_eq!(decoder.total_calls(), 0);
}

#[tokio::test]
async fn test_repeated_runs_give_the_same_result() {
    let server = MockServer::start().await;
    let paths = TestPaths::new();
    let tiers = default_tiers();

    let doc_url = format!("{}{}", server.uri(), ACME_REPORT_PATH);
    mount_search(&server, &query_for(&tiers[0], "Acme Corp"), &[doc_url]).await;
    mount_pdf(&server, ACME_REPORT_PATH, b"%PDF-acme").await;

    let decoder = Arc::new(ScriptedDecoder::new().with_document(b"%PDF-acme", filler_pages(5, 50)));
    let config = test_config(&server, &paths, &["Acme Corp"], tiers);
    let controller = controller(config, &paths, decoder, CancelSignal::never());

    let first = controller.run_company("Acme Corp").await;
    let second = controller.run_company("Acme Corp").await;

    assert!(first.is_success());
    assert!(first.same_result(&second));
}

#[tokio::test]
async fn test_cancelled_before_start_issues_no_requests() {
    let server = MockServer::start().await;
    let paths = TestPaths::new();

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (handle, signal) = cancel_pair();
    handle.cancel();

    let config = test_config(&server, &paths, &["Acme Corp"], default_tiers());
    let controller = controller(config, &paths, Arc::new(ScriptedDecoder::new()), signal);

    let outcome = controller.run_company("Acme Corp").await;

    assert!(outcome.is_cancelled());
    assert_eq!(outcome.company(), "Acme Corp");
}

#[tokio::test]
async fn test_cancel_interrupts_politeness_pause() {
    let server = MockServer::start().await;
    let paths = TestPaths::new();

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><body></body></html>"))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = test_config(&server, &paths, &["Acme Corp"], default_tiers());
    config.engine.politeness_interval_ms = 30_000;

    let (handle, signal) = cancel_pair();
    let controller = controller(config, &paths, Arc::new(ScriptedDecoder::new()), signal);

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        handle.cancel();
    });

    let outcome = tokio::time::timeout(Duration::from_secs(5), controller.run_company("Acme Corp"))
        .await
        .expect("cancellation should cut the pause short");

    assert!(outcome.is_cancelled());
}

#[tokio::test]
async fn test_run_all_records_one_outcome_per_company_in_order() {
    let server = MockServer::start().await;
    let paths = TestPaths::new();

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><body></body></html>"))
        .mount(&server)
        .await;

    let companies = ["Alpha", "Beta", "Gamma", "Delta"];
    let tiers = vec![tier("{company} annual report", ReportType::Annual, true)];
    let config = test_config(&server, &paths, &companies, tiers);
    let controller = controller(config, &paths, Arc::new(ScriptedDecoder::new()), CancelSignal::never());

    let recorder = OutcomeRecorder::new();
    let names: Vec<String> = companies.iter().map(|c| c.to_string()).collect();
    controller.run_all(&names, &recorder).await;

    let outcomes = recorder.outcomes();
    assert_eq!(outcomes.len(), 4);
    for (outcome, expected) in outcomes.iter().zip(companies) {
        assert_eq!(outcome.company(), expected);
        assert!(outcome.is_failure());
    }
}

#[tokio::test]
async fn test_concurrent_companies_are_named_on_every_audit_line() {
    let server = MockServer::start().await;
    let paths = TestPaths::new();
    let tiers = default_tiers();

    let acme_url = format!("{}{}", server.uri(), ACME_REPORT_PATH);
    let beta_path = "/beta/Beta%20Annual%20Report%202023.pdf";
    let beta_url = format!("{}{}", server.uri(), beta_path);
    mount_search(&server, &query_for(&tiers[0], "Acme Corp"), &[acme_url.clone()]).await;
    mount_search(&server, &query_for(&tiers[0], "Beta Ltd"), &[beta_url.clone()]).await;
    mount_pdf(&server, ACME_REPORT_PATH, b"%PDF-acme").await;
    mount_pdf(&server, beta_path, b"%PDF-beta").await;

    let decoder = Arc::new(
        ScriptedDecoder::new()
            .with_document(b"%PDF-acme", filler_pages(3, 100))
            .with_document(b"%PDF-beta", filler_pages(2, 200)),
    );
    let companies = ["Acme Corp", "Beta Ltd"];
    let config = test_config(&server, &paths, &companies, tiers);
    let controller = controller(config, &paths, decoder, CancelSignal::never());

    let recorder = OutcomeRecorder::new();
    let names: Vec<String> = companies.iter().map(|c| c.to_string()).collect();
    controller.run_all(&names, &recorder).await;

    let outcomes = recorder.outcomes();
    assert_eq!(outcomes[0].url(), Some(acme_url.as_str()));
    assert_eq!(outcomes[1].url(), Some(beta_url.as_str()));

    let messages = audit_messages(&paths.read_audit_log());
    assert!(!messages.is_empty());
    for message in &messages {
        assert!(
            message.contains("Acme Corp") || message.contains("Beta Ltd"),
            "audit line without a company: {}",
            message
        );
    }
    assert!(messages.contains(&format!("[Beta Ltd] Attempting to download document from: {}", beta_url)));
    assert!(messages.contains(&"[Beta Ltd] Extracted text from page 2/2 - Length: 200".to_string()));
    assert!(messages.contains(&"[Acme Corp] Successfully extracted Annual Report - 300 characters".to_string()));
}
