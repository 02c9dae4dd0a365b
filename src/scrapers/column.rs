//! Table column scraper.
//!
//! Finds the first `<table>` whose header row contains a `<th>` with a given
//! label (by default `Simplified`, as used by the Wiktionary Mandarin
//! frequency lists) and collects that column's text from every data row.
//!
//! # Matching rules
//!
//! - A header row is any `<tr>` with at least one `<th>`. Header labels are
//!   whitespace-normalised before comparison.
//! - Only `<td>` cells count when indexing a data row.
//! - Rows that are too short, or whose cell is empty after trimming, are skipped.
//! - A table whose column turns out to be empty does not count as a match;
//!   the scan moves on to the next table.

use crate::error::ScrapeError;
use crate::models::ExtractedColumn;
use crate::utils::{normalize_ws, truncate_for_log};
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, instrument};

/// Header label looked up when none is configured.
pub const DEFAULT_COLUMN: &str = "Simplified";

/// Compiled selectors for the table walk.
#[derive(Debug)]
struct TableSelectors {
    table: Selector,
    row: Selector,
    header_cell: Selector,
    data_cell: Selector,
}

impl TableSelectors {
    fn new() -> Result<Self, ScrapeError> {
        let parse = |css: &str| {
            Selector::parse(css)
                .map_err(|e| ScrapeError::Config(format!("invalid selector '{css}': {e}")))
        };
        Ok(Self {
            table: parse("table")?,
            row: parse("tr")?,
            header_cell: parse("th")?,
            data_cell: parse("td")?,
        })
    }
}

/// Extract the values of the `column` column from the first qualifying table.
///
/// # Arguments
///
/// * `html` - The page source
/// * `column` - Exact header label to look for (after whitespace normalisation)
///
/// # Returns
///
/// The matched column, with at least one value.
///
/// # Errors
///
/// [`ScrapeError::NoMatchingTable`] if no table has the header, or every
/// table that has it yields no non-empty values.
#[instrument(level = "info", skip(html), fields(bytes = html.len()))]
pub fn extract_column(html: &str, column: &str) -> Result<ExtractedColumn, ScrapeError> {
    let selectors = TableSelectors::new()?;
    let document = Html::parse_document(html);

    for (table_idx, table) in document.select(&selectors.table).enumerate() {
        let Some(index) = header_index(table, &selectors, column) else {
            continue;
        };

        let extracted = ExtractedColumn {
            header: column.to_string(),
            index,
            table: table_idx,
            values: column_values(table, &selectors, index),
        };
        if extracted.is_empty() {
            debug!(table = table_idx, index, "Header matched but column is empty");
            continue;
        }

        info!(
            table = extracted.table,
            index = extracted.index,
            count = extracted.len(),
            "Extracted column values"
        );
        return Ok(extracted);
    }

    debug!(preview = %truncate_for_log(html, 300), "No qualifying table");
    Err(ScrapeError::NoMatchingTable {
        column: column.to_string(),
    })
}

/// Position of `column` in the first header row of `table` that contains it.
fn header_index(table: ElementRef<'_>, selectors: &TableSelectors, column: &str) -> Option<usize> {
    for row in table.select(&selectors.row) {
        let headers: Vec<String> = row
            .select(&selectors.header_cell)
            .map(header_text)
            .collect();
        if headers.is_empty() {
            continue;
        }
        if let Some(idx) = headers.iter().position(|h| h == column) {
            return Some(idx);
        }
    }
    None
}

fn column_values(table: ElementRef<'_>, selectors: &TableSelectors, index: usize) -> Vec<String> {
    table
        .select(&selectors.row)
        .filter_map(|row| row.select(&selectors.data_cell).nth(index))
        .map(cell_text)
        .filter(|text| !text.is_empty())
        .collect()
}

/// Header text: trimmed text nodes joined by a space, whitespace collapsed.
fn header_text(cell: ElementRef<'_>) -> String {
    let joined = cell
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    normalize_ws(&joined)
}

/// Data text: trimmed text nodes concatenated with no separator.
fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text().map(str::trim).collect()
}
