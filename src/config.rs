//! Run configuration: optional YAML file merged with command-line flags.
//!
//! Precedence is flag (or its environment variable) over `config.yaml` over
//! built-in defaults.
//!
//! ```yaml
//! out_dir: ~/Anki/imports
//! column: Simplified
//! include_header: false
//! user_agent: "Mozilla/5.0 (compatible; anki_tools/1.0)"
//! timeout_secs: 30
//! ```

use crate::cli::Cli;
use crate::error::ScrapeError;
use crate::fetch::{DEFAULT_TIMEOUT, USER_AGENT};
use crate::scrapers::column::DEFAULT_COLUMN;
use crate::utils::resolve_dir;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tracing::{debug, instrument};

/// Contents of `config.yaml`. Every key is optional.
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub out_dir: Option<PathBuf>,
    pub column: Option<String>,
    pub include_header: Option<bool>,
    pub user_agent: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl FileConfig {
    pub fn from_yaml(text: &str) -> Result<Self, ScrapeError> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text)
            .map_err(|e| ScrapeError::Config(format!("invalid config file: {e}")))
    }
}

/// Load a config file from disk.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn load_file_config(path: &Path) -> Result<FileConfig, ScrapeError> {
    let text = fs::read_to_string(path)
        .await
        .map_err(|e| ScrapeError::Config(format!("cannot read {}: {e}", path.display())))?;
    let config = FileConfig::from_yaml(&text)?;
    debug!(?config, "Loaded config file");
    Ok(config)
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub url: String,
    /// Absolute output directory.
    pub out_dir: PathBuf,
    pub column: String,
    pub include_header: bool,
    pub user_agent: String,
    pub timeout: Duration,
}

impl Settings {
    /// Merge CLI flags over the file config over defaults.
    pub fn resolve(cli: &Cli, file: FileConfig) -> Result<Self, ScrapeError> {
        let out_dir = match cli.out_dir.clone().or(file.out_dir) {
            Some(dir) => dir,
            None => default_out_dir()?,
        };
        let timeout = cli
            .timeout_secs
            .or(file.timeout_secs)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT);
        if timeout.is_zero() {
            return Err(ScrapeError::Config("timeout must be at least one second".into()));
        }

        Ok(Self {
            url: cli.url.clone(),
            out_dir: resolve_dir(&out_dir)?,
            column: cli
                .column
                .clone()
                .or(file.column)
                .unwrap_or_else(|| DEFAULT_COLUMN.to_string()),
            include_header: cli.include_header().or(file.include_header).unwrap_or(false),
            user_agent: file.user_agent.unwrap_or_else(|| USER_AGENT.to_string()),
            timeout,
        })
    }
}

/// The user's documents directory, or `~/Documents` where the platform has none.
pub fn default_out_dir() -> Result<PathBuf, ScrapeError> {
    dirs::document_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join("Documents")))
        .ok_or_else(|| {
            ScrapeError::Config("cannot determine the documents directory; pass --dir".into())
        })
}
