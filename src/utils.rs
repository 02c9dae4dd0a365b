//! Utility functions for output naming, path handling and text cleanup.
//!
//! This module provides helper functions used throughout the application:
//! - Output file name derivation from the source URL
//! - Home-directory expansion and output directory validation
//! - Whitespace normalisation and log truncation

use crate::error::ScrapeError;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument};

/// Derive the output base name from the last path segment of a URL.
///
/// Trailing slashes are ignored, so `https://example.org/wiki/Foo_list/`
/// yields `Foo_list`.
///
/// # Errors
///
/// Returns [`ScrapeError::Naming`] if the last segment is empty.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(output_base_name("https://example.org/a/b").unwrap(), "b");
/// ```
pub fn output_base_name(url: &str) -> Result<String, ScrapeError> {
    let base = url.trim_end_matches('/').rsplit('/').next().unwrap_or("");
    if base.is_empty() {
        return Err(ScrapeError::Naming {
            url: url.to_string(),
        });
    }
    Ok(base.to_string())
}

/// Full output path: `<out_dir>/<base>.csv`.
pub fn output_path(out_dir: &Path, url: &str) -> Result<PathBuf, ScrapeError> {
    let base = output_base_name(url)?;
    Ok(out_dir.join(format!("{base}.csv")))
}

/// Expand a leading `~` to the home directory and make the path absolute.
pub fn resolve_dir(path: &Path) -> Result<PathBuf, ScrapeError> {
    let expanded = match path.strip_prefix("~") {
        Ok(rest) => dirs::home_dir()
            .ok_or_else(|| {
                ScrapeError::Config("cannot expand '~': home directory is unknown".into())
            })?
            .join(rest),
        Err(_) => path.to_path_buf(),
    };
    std::path::absolute(&expanded).map_err(|e| ScrapeError::io(expanded, e))
}

/// Collapse runs of whitespace into single spaces and trim.
pub fn normalize_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Truncate a string for logging purposes.
///
/// Cuts at a character boundary at or below `max` bytes and appends the
/// number of bytes dropped.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log("a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory (and parents) if needed, then creates and removes
/// a probe file.
///
/// # Errors
///
/// Returns [`ScrapeError::Io`] if the directory cannot be created or written.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_dir(path: &Path) -> Result<(), ScrapeError> {
    fs::create_dir_all(path)
        .await
        .map_err(|e| ScrapeError::io(path, e))?;

    let probe_path = path.join("..__probe_write__");
    fs::File::create(&probe_path)
        .await
        .map_err(|e| ScrapeError::io(&probe_path, e))?;
    let _ = fs::remove_file(&probe_path).await;
    info!("Output directory is writable");
    Ok(())
}
