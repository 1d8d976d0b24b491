//! Report-Scout main entry point
//!
//! This is the command-line interface for the Report-Scout report finder.

use anyhow::{bail, Context};
use clap::Parser;
use report_scout::acquisition::{cancel_pair, run_scout};
use report_scout::config::{load_config_with_hash, Config};
use report_scout::output::{generate_latest_report, generate_markdown_summary, load_summary, print_summary};
use report_scout::storage::{open_storage, Storage};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Report-Scout: A polite corporate report finder
///
/// Report-Scout searches for each configured company's annual, sustainability
/// or financial report through a cascade of increasingly broad queries,
/// validates and pre-classifies candidates before downloading them in full,
/// and records exactly one outcome per company.
#[derive(Parser, Debug)]
#[command(name = "report-scout")]
#[command(version = "1.0.0")]
#[command(about = "A polite corporate report finder", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Only process these companies (may be repeated); defaults to the configured list
    #[arg(long = "company", value_name = "NAME")]
    companies: Vec<String>,

    /// Validate config and show the queries that would be issued
    #[arg(long, conflicts_with_all = ["stats", "export_summary"])]
    dry_run: bool,

    /// Show statistics for the latest run and exit
    #[arg(long, conflicts_with_all = ["dry_run", "export_summary"])]
    stats: bool,

    /// Generate the markdown summary for the latest run and exit
    #[arg(long, conflicts_with_all = ["dry_run", "stats"])]
    export_summary: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if !cli.companies.is_empty() {
        config.companies = cli.companies.clone();
    }

    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.stats {
        handle_stats(&config)?;
    } else if cli.export_summary {
        handle_export_summary(&config)?;
    } else {
        handle_run(config, &config_hash).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("report_scout=info,warn"),
            1 => EnvFilter::new("report_scout=debug,info"),
            2 => EnvFilter::new("report_scout=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows the configuration and every rendered query
fn handle_dry_run(config: &Config) {
    println!("=== Report-Scout Dry Run ===\n");

    println!("Engine:");
    println!("  Min text length: {} characters", config.engine.min_text_length);
    println!("  Preview pages: {}", config.engine.preview_pages);
    println!("  Max concurrent requests: {}", config.engine.max_concurrent_requests);
    println!("  Max concurrent companies: {}", config.engine.max_concurrent_companies);
    println!("  Politeness interval: {}ms", config.engine.politeness_interval_ms);

    println!("\nSearch:");
    println!("  Endpoint: {}", config.search.url);
    println!("  Report year: {}", config.search.report_year);

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);
    println!("  Results: {}", config.output.results_path);
    println!("  Summary: {}", config.output.summary_path);
    println!("  Audit log: {}", config.output.audit_log_path);

    println!("\nQuery tiers ({}):", config.tiers.len());
    for (index, tier) in config.tiers.iter().enumerate() {
        println!(
            "  {}. {}{} -> {}",
            index + 1,
            tier.template,
            if tier.strict { " [strict]" } else { "" },
            tier.report_type.label()
        );
    }

    println!("\nCompanies ({}):", config.companies.len());
    for company in &config.companies {
        println!("  - {}", company);
        for tier in &config.tiers {
            println!("    * {}", tier.render(company, config.search.report_year));
        }
    }

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would issue at most {} searches",
        config.companies.len() * config.tiers.len()
    );
}

/// Handles the --stats mode: shows statistics for the latest run
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Database: {}\n", config.output.database_path);

    let storage = open_storage(Path::new(&config.output.database_path))?;
    match storage.get_latest_run()? {
        Some(run) => {
            println!("Run {} ({})\n", run.id, run.status.to_db_string());
            let summary = load_summary(&storage, run.id)?;
            print_summary(&summary);
        }
        None => println!("No runs recorded yet"),
    }

    Ok(())
}

/// Handles the --export-summary mode: writes the markdown summary for the latest run
fn handle_export_summary(config: &Config) -> anyhow::Result<()> {
    println!("=== Exporting Run Summary ===\n");
    println!("Database: {}", config.output.database_path);
    println!("Output: {}", config.output.summary_path);
    println!();

    let storage = open_storage(Path::new(&config.output.database_path))?;

    tracing::info!("Loading run data from database...");
    let Some(report) = generate_latest_report(&storage)? else {
        bail!("no runs recorded in {}", config.output.database_path);
    };

    tracing::info!("Generating markdown summary...");
    generate_markdown_summary(&report, Path::new(&config.output.summary_path))?;

    println!("✓ Summary exported to: {}", config.output.summary_path);

    Ok(())
}

/// Handles the main run; Ctrl-C cancels outstanding cascades
async fn handle_run(config: Config, config_hash: &str) -> anyhow::Result<()> {
    if config.companies.is_empty() {
        bail!("no companies configured");
    }

    tracing::info!(
        "Companies: {}, query tiers: {}",
        config.companies.len(),
        config.tiers.len()
    );

    let (handle, signal) = cancel_pair();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, cancelling outstanding companies");
            handle.cancel();
        }
    });

    let report = run_scout(config, config_hash, signal).await.context("Run failed")?;

    for line in report.summary.log_lines() {
        println!("{}", line);
    }

    Ok(())
}
