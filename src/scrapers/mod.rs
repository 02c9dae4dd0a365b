//! HTML scrapers that turn a fetched page into structured values.
//!
//! # Supported Extractions
//!
//! | Extraction | Module | Method | Notes |
//! |------------|--------|--------|-------|
//! | Table column | [`column`] | HTML table scan | First table whose header row names the column |
//!
//! Scrapers are pure functions over the page text: fetching happens in
//! [`crate::fetch`], writing in [`crate::outputs`].

pub mod column;
