//! CSV output for an extracted column.
//!
//! The file is encoded as UTF-8 with a leading byte-order mark so that
//! spreadsheet tools and Anki on Windows pick the right encoding. Each value
//! is one record with a single field; quoting is only applied where CSV
//! requires it (commas, quotes, line breaks). Records end in `\r\n`.
//!
//! The whole file is rendered in memory and written in one call, so an
//! existing file is replaced rather than appended to.

use crate::error::ScrapeError;
use crate::models::ExtractedColumn;
use ::csv::{QuoteStyle, Terminator, WriterBuilder};
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// UTF-8 byte-order mark.
pub const BOM: &[u8] = b"\xEF\xBB\xBF";

/// Render the column as CSV bytes, BOM included.
///
/// When `include_header` is set, the column's header label is written as
/// the first record.
pub fn render(column: &ExtractedColumn, include_header: bool) -> Result<Vec<u8>, ScrapeError> {
    let mut buf = Vec::with_capacity(BOM.len() + column.values.iter().map(|v| v.len() + 2).sum::<usize>());
    buf.extend_from_slice(BOM);

    let mut writer = WriterBuilder::new()
        .terminator(Terminator::CRLF)
        .quote_style(QuoteStyle::Necessary)
        .from_writer(buf);

    if include_header {
        writer.write_record([column.header.as_str()])?;
    }
    for value in &column.values {
        writer.write_record([value.as_str()])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ::csv::Error::from(e.into_error()))?;
    Ok(bytes)
}

/// Write the column to `path`, replacing any existing file.
///
/// # Returns
///
/// The number of value rows written (the header line is not counted).
///
/// # Errors
///
/// [`ScrapeError::Csv`] if encoding fails, [`ScrapeError::Io`] if the file
/// cannot be written.
#[instrument(level = "info", skip_all, fields(path = %path.display(), include_header = include_header))]
pub async fn write_column(
    column: &ExtractedColumn,
    path: &Path,
    include_header: bool,
) -> Result<usize, ScrapeError> {
    let bytes = render(column, include_header)?;
    fs::write(path, &bytes)
        .await
        .map_err(|e| ScrapeError::io(path, e))?;
    info!(rows = column.len(), bytes = bytes.len(), "Wrote CSV file");
    Ok(column.len())
}
