//! # simplified_csv
//!
//! Downloads a single web page (typically a Wiktionary Mandarin frequency
//! list), finds the first HTML table whose header row has a `Simplified`
//! column, and writes that column's values to a CSV file ready for import
//! into Anki or a spreadsheet.
//!
//! ## Usage
//!
//! ```sh
//! simplified_csv --url https://en.wiktionary.org/wiki/Appendix:Mandarin_Frequency_lists/1-1000
//! ```
//!
//! ## Architecture
//!
//! A linear pipeline, each step awaited before the next:
//! 1. **Naming**: derive `<out_dir>/<last URL segment>.csv`
//! 2. **Fetching**: GET the page, falling back to a second transport on network failure
//! 3. **Extraction**: locate the table and collect the column values
//! 4. **Output**: write the CSV file and print a one-line summary
//!
//! Logs go to stderr (`RUST_LOG` controls the level); stdout carries only the
//! summary line. Any error ends the run with `Error: <message>` and status 1.

use clap::Parser;
use std::process::ExitCode;
use tracing::{debug, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};
use url::Url;

mod cli;
mod config;
mod error;
mod fetch;
mod models;
mod outputs;
mod scrapers;
mod utils;

use cli::Cli;
use config::{FileConfig, Settings, load_file_config};
use error::ScrapeError;
use fetch::{FallbackFetch, Transport, default_fetcher};
use models::ScrapeReport;
use outputs::csv::write_column;
use scrapers::column::extract_column;
use utils::{ensure_writable_dir, output_path};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    match run(&args).await {
        Ok(report) => {
            info!(elapsed_ms = start_time.elapsed().as_millis() as u64, "Execution complete");
            println!("Wrote {} rows to {}", report.rows, report.path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            debug!(error = ?e, "Execution failed");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Resolve settings and run the pipeline with the default transports.
async fn run(args: &Cli) -> Result<ScrapeReport, ScrapeError> {
    let file_config = match &args.config {
        Some(path) => load_file_config(path).await?,
        None => FileConfig::default(),
    };
    let settings = Settings::resolve(args, file_config)?;
    let fetcher = default_fetcher(&settings.user_agent, settings.timeout)?;
    scrape_to_csv(&settings, &fetcher).await
}

/// Fetch, extract and write according to `settings`.
///
/// The output file is only touched once extraction has succeeded.
#[instrument(level = "info", skip_all, fields(url = %settings.url, column = %settings.column))]
async fn scrape_to_csv<P, S>(
    settings: &Settings,
    fetcher: &FallbackFetch<P, S>,
) -> Result<ScrapeReport, ScrapeError>
where
    P: Transport,
    S: Transport,
{
    let path = output_path(&settings.out_dir, &settings.url)?;
    let url = Url::parse(&settings.url)
        .map_err(|e| ScrapeError::Config(format!("invalid URL '{}': {e}", settings.url)))?;
    ensure_writable_dir(&settings.out_dir).await?;

    let html = fetcher.fetch(&url).await?;
    let column = extract_column(&html, &settings.column)?;
    let rows = write_column(&column, &path, settings.include_header).await?;

    Ok(ScrapeReport { path, rows })
}
