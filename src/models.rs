//! Data models shared by the scrape and output stages.
//!
//! - [`ExtractedColumn`]: the values pulled out of the matching table
//! - [`ScrapeReport`]: what was written, for the summary line

use std::path::PathBuf;

/// The text values of one table column, in document order.
///
/// Values are trimmed and never empty; duplicates are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedColumn {
    /// The header label that was matched (e.g. `"Simplified"`).
    pub header: String,
    /// Zero-based position of the header among the row's `<th>` cells.
    pub index: usize,
    /// Zero-based position of the table among all `<table>` elements.
    pub table: usize,
    /// One entry per qualifying data row.
    pub values: Vec<String>,
}

impl ExtractedColumn {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeReport {
    /// Absolute path of the CSV file that was written.
    pub path: PathBuf,
    /// Number of value rows written (the optional header line is not counted).
    pub rows: usize,
}
