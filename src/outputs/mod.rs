//! Output generation for extracted columns.
//!
//! # Submodules
//!
//! - [`csv`]: Writes an [`ExtractedColumn`](crate::models::ExtractedColumn)
//!   as a single-column CSV file
//!
//! # Output Structure
//!
//! ```text
//! out_dir/
//! └── <last URL path segment>.csv   # UTF-8 with BOM, CRLF line endings
//! ```

pub mod csv;
