//! Domain models for rate sheets.
//!
//! - [`Row`] - one record, column name to cell text, plus its derived error
//! - [`Table`] - ordered columns and ordered rows
//! - [`FileFormat`] - CSV or spreadsheet, picked from the file name
//! - [`REQUIRED_COLUMNS`] - the column contract with the receiving service

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

// =============================================================================
// Required Columns
// =============================================================================

/// Columns the receiving service requires, matched exactly (case-sensitive).
pub const REQUIRED_COLUMNS: [&str; 6] = [
    "Origin Port",
    "Destination Port",
    "Container Type",
    "Ocean Freight Rate",
    "Carrier",
    "Effective Date",
];

// =============================================================================
// File Format
// =============================================================================

/// Format of an uploaded file, which is also the format it is sent back in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    /// Comma (or auto-detected) separated text.
    Csv,
    /// Binary workbook (xlsx, xls, ods). Always written back as xlsx.
    Spreadsheet,
}

impl FileFormat {
    /// Pick the format from a file name: `.csv` (any case) is CSV,
    /// everything else is treated as a workbook.
    pub fn from_file_name(name: &str) -> Self {
        let ext = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match ext.as_deref() {
            Some("csv") => FileFormat::Csv,
            _ => FileFormat::Spreadsheet,
        }
    }

    /// File name used for the corrected upload.
    pub fn output_file_name(&self) -> &'static str {
        match self {
            FileFormat::Csv => "corrected_data.csv",
            FileFormat::Spreadsheet => "corrected_data.xlsx",
        }
    }

    /// MIME type of the corrected upload.
    pub fn mime_type(&self) -> &'static str {
        match self {
            FileFormat::Csv => "text/csv",
            FileFormat::Spreadsheet => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
        }
    }
}

// =============================================================================
// Row
// =============================================================================

/// A single record.
///
/// `error` is derived from the cells by the row validator and is never
/// serialized with the data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    cells: HashMap<String, String>,
    error: Option<String>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a row from `(column, value)` pairs. Later duplicates win.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let cells = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self { cells, error: None }
    }

    /// Cell value, or `None` when the row has no such column.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells.get(column).map(String::as_str)
    }

    /// Set a cell, returning the previous value.
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.cells.insert(column.into(), value.into())
    }

    pub fn contains(&self, column: &str) -> bool {
        self.cells.contains_key(column)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Combined validation message, `None` when the row is valid.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_valid(&self) -> bool {
        self.error.is_none()
    }

    pub(crate) fn set_error(&mut self, error: Option<String>) {
        self.error = error;
    }

    /// Cell values in the given column order; absent cells are empty.
    pub fn values_in<'a>(&'a self, columns: &'a [String]) -> impl Iterator<Item = &'a str> + 'a {
        columns.iter().map(move |c| self.get(c).unwrap_or(""))
    }
}

// =============================================================================
// Table
// =============================================================================

/// Ordered columns plus ordered rows.
///
/// Column order is display and serialization order only; validation never
/// depends on it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub(crate) columns: Vec<String>,
    pub(crate) rows: Vec<Row>,
}

impl Table {
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
