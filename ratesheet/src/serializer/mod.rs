//! Re-encoding of the corrected table.
//!
//! CSV output is a plain join: header line, then one line per row, comma
//! separated, `\n` terminated lines, no quoting. Cells containing a comma,
//! quote or line break therefore do not survive a round trip; they are
//! reported by [`csv_fidelity_gaps`] and logged, not rewritten.
//!
//! Spreadsheet output is a single-sheet xlsx workbook whose sheet is named
//! [`SHEET_NAME`]. Every cell is written as text.

use std::io::Cursor;

use crate::api::logs::log_warning;
use crate::error::{SerializeError, SerializeResult};
use crate::models::{FileFormat, Table};
use crate::parser::detect_delimiter;

/// Name of the only sheet in a serialized workbook.
pub const SHEET_NAME: &str = "New Correct Data";

/// A serialized table ready to be written or uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub mime: String,
    pub format: FileFormat,
}

/// A cell (or header) whose text cannot round-trip through plain CSV.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FidelityGap {
    /// Data row index, `None` for the header line.
    pub row: Option<usize>,
    pub column: String,
}

/// Serialize the table, with columns in their current order.
pub fn serialize(table: &Table, format: FileFormat) -> SerializeResult<Payload> {
    let bytes = match format {
        FileFormat::Csv => {
            for gap in csv_fidelity_gaps(table) {
                match gap.row {
                    Some(row) => log_warning(format!(
                        "Row {}, column '{}' contains a delimiter and will not survive CSV export",
                        row + 1,
                        gap.column
                    )),
                    None => log_warning(format!(
                        "Column name '{}' contains a delimiter and will break the CSV header",
                        gap.column
                    )),
                }
            }
            to_csv(table).into_bytes()
        }
        FileFormat::Spreadsheet => to_xlsx(table)?,
    };

    Ok(Payload {
        bytes,
        file_name: format.output_file_name().to_string(),
        mime: format.mime_type().to_string(),
        format,
    })
}

/// Plain CSV text for the table.
pub fn to_csv(table: &Table) -> String {
    let columns = table.columns();
    let mut lines = Vec::with_capacity(table.row_count() + 1);

    lines.push(columns.join(","));
    for row in table.rows() {
        lines.push(row.values_in(columns).collect::<Vec<_>>().join(","));
    }

    lines.join("\n")
}

/// Cells and headers that plain CSV output would corrupt.
pub fn csv_fidelity_gaps(table: &Table) -> Vec<FidelityGap> {
    let breaks_csv = |s: &str| s.contains([',', '"', '\n', '\r']);

    // The reader picks its delimiter from the header line alone
    let header_misdetected = detect_delimiter(&table.columns().join(",")) != ',';
    let breaks_header = |s: &str| {
        breaks_csv(s) || (header_misdetected && s.contains([';', '\t', '|']))
    };

    let mut gaps: Vec<FidelityGap> = table
        .columns()
        .iter()
        .filter(|c| breaks_header(c.as_str()))
        .map(|c| FidelityGap { row: None, column: c.clone() })
        .collect();

    for (index, row) in table.rows().iter().enumerate() {
        for column in table.columns() {
            if row.get(column).is_some_and(breaks_csv) {
                gaps.push(FidelityGap { row: Some(index), column: column.clone() });
            }
        }
    }

    gaps
}

/// Single-sheet xlsx workbook for the table.
pub fn to_xlsx(table: &Table) -> SerializeResult<Vec<u8>> {
    let mut book = umya_spreadsheet::new_file_empty_worksheet();
    let sheet = book
        .new_sheet(SHEET_NAME)
        .map_err(|e| SerializeError::Spreadsheet(e.to_string()))?;

    // Excel uses 1-based indexing
    for (col_idx, column) in table.columns().iter().enumerate() {
        let col_num = (col_idx + 1) as u32;
        sheet.get_cell_mut((col_num, 1)).set_value_string(column.as_str());
    }

    for (row_idx, row) in table.rows().iter().enumerate() {
        let row_num = (row_idx + 2) as u32;
        for (col_idx, value) in row.values_in(table.columns()).enumerate() {
            if value.is_empty() {
                continue;
            }
            let col_num = (col_idx + 1) as u32;
            sheet.get_cell_mut((col_num, row_num)).set_value_string(value);
        }
    }

    let mut buffer = Cursor::new(Vec::new());
    umya_spreadsheet::writer::xlsx::write_writer(&book, &mut buffer)
        .map_err(|e| SerializeError::Spreadsheet(e.to_string()))?;

    Ok(buffer.into_inner())
}
