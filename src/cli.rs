//! Command-line interface definitions for simplified_csv.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! The URL and output directory can also come from environment variables;
//! everything except the URL can also come from a YAML config file.

use clap::Parser;
use std::path::PathBuf;

/// Scrape the 'Simplified' column from a Wiktionary frequency list into a CSV file.
///
/// # Examples
///
/// ```sh
/// # Write ~/Documents/1-1000.csv
/// simplified_csv --url https://en.wiktionary.org/wiki/Appendix:Mandarin_Frequency_lists/1-1000
///
/// # Custom directory, with a header line
/// simplified_csv --url https://example.org/wiki/Foo_list --dir ./out --header
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Source URL to scrape
    #[arg(long, env = "SIMPLIFIED_CSV_URL")]
    pub url: String,

    /// Output directory (default: ~/Documents)
    #[arg(long = "dir", env = "SIMPLIFIED_CSV_DIR")]
    pub out_dir: Option<PathBuf>,

    /// Do not write a header row (default: on)
    #[arg(long, conflicts_with = "header")]
    pub no_header: bool,

    /// Write the column label as a header row
    #[arg(long)]
    pub header: bool,

    /// Header label of the column to extract
    #[arg(long)]
    pub column: Option<String>,

    /// Timeout in seconds for each download attempt
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Optional path to config.yaml file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Header preference from the flags, if one was given.
    pub fn include_header(&self) -> Option<bool> {
        match (self.header, self.no_header) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}
