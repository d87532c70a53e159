//! get-papers-list - fetch PubMed papers and flag company-affiliated authors
//!
//! ## Usage
//!
//! ```bash
//! get-papers-list "cancer immunotherapy"
//! get-papers-list "cancer immunotherapy" --file results.csv --debug
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use get_papers_list::{export, fetch_papers, FetchConfig, PubMedClient};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::Level;
use tracing_subscriber::{fmt, EnvFilter};

// ============================================================================
// CLI Definition
// ============================================================================

/// Fetch PubMed papers based on a query and filter by author affiliation.
#[derive(Parser)]
#[command(name = "get-papers-list")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Search query for PubMed
    query: String,

    /// Filename to save the results as CSV
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,

    /// Maximum number of results (overrides PUBMED_RETMAX)
    #[arg(long)]
    max_results: Option<u32>,

    /// E-utilities base URL, e.g. a local mirror (overrides PUBMED_*_URL)
    #[arg(long)]
    endpoint: Option<String>,

    /// Only list PubMed ids, skipping the article detail request
    #[arg(long)]
    ids_only: bool,

    /// NCBI API key (overrides NCBI_API_KEY)
    #[arg(long)]
    api_key: Option<String>,

    /// Contact email sent to NCBI (overrides NCBI_EMAIL)
    #[arg(long)]
    email: Option<String>,

    /// Request timeout in seconds (default: no explicit timeout)
    #[arg(long)]
    timeout: Option<u64>,

    /// Write diagnostics to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Emit diagnostics as JSON lines
    #[arg(long)]
    log_json: bool,
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    init_logging(cli.debug, cli.log_file.as_deref(), cli.log_json)?;

    let config = build_config(&cli)?;
    let client = PubMedClient::new(config)?;

    let papers = fetch_papers(&client, &cli.query, cli.debug).await?;

    match &cli.file {
        Some(path) => {
            export::save_csv(&papers, path)?;
            println!("Results saved to {}", path.display());
        }
        None => {
            let stdout = std::io::stdout();
            export::print_records(&papers, &mut stdout.lock())?;
        }
    }

    Ok(())
}

/// Environment first, then command-line overrides
fn build_config(cli: &Cli) -> Result<FetchConfig> {
    let mut config = FetchConfig::from_env()?;

    if let Some(endpoint) = &cli.endpoint {
        config = config.with_base_url(endpoint);
    }
    if let Some(limit) = cli.max_results {
        config = config.with_result_limit(limit);
    }
    if cli.ids_only {
        config = config.with_fetch_details(false);
    }
    if let Some(key) = &cli.api_key {
        config = config.with_api_key(key.clone());
    }
    if let Some(email) = &cli.email {
        config = config.with_email(email.clone());
    }
    if let Some(secs) = cli.timeout {
        config = config.with_timeout_secs(secs);
    }

    Ok(config)
}

/// Diagnostics go to stderr or `log_file`, never to stdout
fn init_logging(debug: bool, log_file: Option<&std::path::Path>, json: bool) -> Result<()> {
    let log_level = if debug { Level::DEBUG } else { Level::WARN };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));

    let builder = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false);

    match (log_file, json) {
        (Some(path), true) => {
            let file = open_log_file(path)?;
            builder.json().with_writer(Mutex::new(file)).init();
        }
        (Some(path), false) => {
            let file = open_log_file(path)?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        (None, true) => builder.json().with_writer(std::io::stderr).init(),
        (None, false) => builder.with_writer(std::io::stderr).init(),
    }

    Ok(())
}

fn open_log_file(path: &std::path::Path) -> Result<std::fs::File> {
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))
}
