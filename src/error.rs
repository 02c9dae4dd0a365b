//! Error taxonomy for the scrape pipeline.
//!
//! Every failure is terminal: `main` prints the [`ScrapeError`] display
//! string once as `Error: <message>` and exits with status 1.

use std::path::PathBuf;
use thiserror::Error;

/// Failure of a single transport attempt.
#[derive(Error, Debug)]
pub enum TransportError {
    /// The server answered with a non-2xx status.
    #[error("HTTP status {status} for {url}")]
    Status { status: u16, url: String },

    /// Connect, timeout, redirect or body-read failure.
    #[error("network error: {0}")]
    Network(String),
}

impl TransportError {
    /// Whether a second transport could plausibly succeed where this one failed.
    pub fn is_network(&self) -> bool {
        matches!(self, TransportError::Network(_))
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(status) => TransportError::Status {
                status: status.as_u16(),
                url: e.url().map(|u| u.to_string()).unwrap_or_default(),
            },
            None => TransportError::Network(e.to_string()),
        }
    }
}

#[derive(Error, Debug)]
pub enum ScrapeError {
    /// A required capability could not be set up (selectors, HTTP client, paths, config file).
    #[error("Configuration error: {0}")]
    Config(String),

    /// The primary transport got an answer, but not a successful one.
    #[error("Failed to fetch {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: TransportError,
    },

    /// Both transports failed at the network level.
    #[error("Failed to fetch {url}: {primary}; fallback also failed: {fallback}")]
    Fetch {
        url: String,
        primary: TransportError,
        fallback: TransportError,
    },

    #[error("Could not find a table with a '{column}' header.")]
    NoMatchingTable { column: String },

    #[error("Could not derive output file name from URL '{url}'.")]
    Naming { url: String },

    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV encoding failed: {0}")]
    Csv(#[from] csv::Error),
}

impl ScrapeError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ScrapeError::Io {
            path: path.into(),
            source,
        }
    }
}
