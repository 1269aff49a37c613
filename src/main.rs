//! seo-audit main entry point
//!
//! This is the command-line interface for the technical SEO auditor.

use anyhow::Context;
use clap::Parser;
use seo_audit::config::{load_config, Config};
use seo_audit::output::{export_json, print_audit_summary, print_comparison, write_markdown_report};
use seo_audit::report::{compare_audits, AuditSnapshot};
use seo_audit::storage::{open_store, record_audit};
use seo_audit::{AuditResult, Auditor};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// seo-audit: a bounded technical SEO auditor
///
/// Crawls one site politely, checks links, redirects, content, security,
/// mobile friendliness and page speed, and prints a weighted score with a
/// prioritized list of issues.
#[derive(Parser, Debug)]
#[command(name = "seo-audit")]
#[command(version)]
#[command(about = "A bounded technical SEO auditor", long_about = None)]
struct Cli {
    /// Domain or URL to audit
    #[arg(value_name = "DOMAIN")]
    domain: String,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Maximum number of pages to fetch
    #[arg(long)]
    max_pages: Option<usize>,

    /// Maximum link depth from the seed URL
    #[arg(long)]
    max_depth: Option<usize>,

    /// Maximum number of concurrent requests
    #[arg(long)]
    concurrency: Option<usize>,

    /// Overall audit deadline in seconds
    #[arg(long, value_name = "SECS")]
    deadline: Option<u64>,

    /// Skip the PageSpeed Insights check
    #[arg(long)]
    no_speed: bool,

    /// Skip the security check
    #[arg(long)]
    no_security: bool,

    /// Skip the mobile check
    #[arg(long)]
    no_mobile: bool,

    /// Write the full result as JSON
    #[arg(long, value_name = "FILE")]
    json: Option<PathBuf>,

    /// Write a markdown report
    #[arg(long, value_name = "FILE")]
    markdown: Option<PathBuf>,

    /// SQLite database of past audits, used for comparison
    #[arg(long, value_name = "FILE")]
    db: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)
                .with_context(|| format!("failed to load configuration {}", path.display()))?
        }
        None => Config::default(),
    };
    apply_overrides(&mut config, &cli);

    let auditor = Auditor::from_config(config)?;
    let result = auditor
        .run(&cli.domain)
        .await
        .with_context(|| format!("audit of {} failed", cli.domain))?;

    if !cli.quiet {
        print_audit_summary(&result);
    }

    let output = &auditor.config().output;
    if let Some(path) = cli.json.clone().or_else(|| output.json_path.as_ref().map(PathBuf::from)) {
        export_json(&result, &path)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }
    if let Some(path) = cli
        .markdown
        .clone()
        .or_else(|| output.markdown_path.as_ref().map(PathBuf::from))
    {
        write_markdown_report(&result, &path)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }
    if let Some(path) = cli
        .db
        .clone()
        .or_else(|| output.database_path.as_ref().map(PathBuf::from))
    {
        handle_history(&result, &path, cli.quiet)?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("seo_audit=info,warn"),
            1 => EnvFilter::new("seo_audit=debug,info"),
            2 => EnvFilter::new("seo_audit=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Applies command-line flags on top of the file configuration
fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(max_pages) = cli.max_pages {
        config.crawler.max_pages = max_pages;
    }
    if let Some(max_depth) = cli.max_depth {
        config.crawler.max_depth = max_depth;
    }
    if let Some(concurrency) = cli.concurrency {
        config.crawler.concurrency = concurrency;
    }
    if cli.deadline.is_some() {
        config.crawler.audit_deadline_secs = cli.deadline;
    }
    if cli.no_speed {
        config.checks.speed = false;
    }
    if cli.no_security {
        config.checks.security = false;
    }
    if cli.no_mobile {
        config.checks.mobile = false;
    }
}

/// Stores the audit and prints the change since the previous one
fn handle_history(result: &AuditResult, db_path: &Path, quiet: bool) -> anyhow::Result<()> {
    let mut store = open_store(db_path)
        .with_context(|| format!("failed to open audit database {}", db_path.display()))?;

    let snapshot = AuditSnapshot::from(result);
    let previous = record_audit(&mut store, &snapshot)?;

    match previous {
        Some(previous) if !quiet => print_comparison(&compare_audits(&previous, &snapshot)),
        Some(_) => {}
        None => tracing::info!("First recorded audit of {}", result.domain),
    }
    Ok(())
}
