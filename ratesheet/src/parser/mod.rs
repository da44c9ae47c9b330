//! Uploaded file decoding.
//!
//! Turns raw bytes into a [`Table`]: CSV goes through encoding and delimiter
//! auto-detection and the `csv` crate, workbooks go through `calamine`.
//! The whole file is decoded before anything is returned; there are no
//! partial results.

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader, Sheets};
use std::io::Cursor;
use std::path::Path;

use crate::error::{ParseError, ParseResult};
use crate::models::{FileFormat, Row, Table};

/// A decoded file with its metadata
#[derive(Debug, Clone)]
pub struct ParsedFile {
    pub table: Table,
    pub format: FileFormat,
    /// Detected encoding (CSV only)
    pub encoding: Option<String>,
    /// Detected delimiter (CSV only)
    pub delimiter: Option<char>,
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" | "" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to a string using the given encoding.
///
/// Unknown encodings and invalid UTF-8 fall back to lossy UTF-8. A leading
/// byte order mark is dropped.
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    let decoded = match encoding.to_lowercase().as_str() {
        // encoding_rs maps ISO-8859-1 to windows-1252, as browsers do
        "iso-8859-1" | "latin-1" | "latin1" | "windows-1252" | "cp1252" => {
            encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned()
        }
        _ => String::from_utf8_lossy(bytes).into_owned(),
    };

    match decoded.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => decoded,
    }
}

/// Detect the delimiter by counting occurrences in the first line.
///
/// Comma wins ties and is used when no candidate occurs.
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [',', ';', '\t', '|'];
    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Decode raw bytes of the declared format.
pub fn parse_bytes(bytes: &[u8], format: FileFormat) -> ParseResult<ParsedFile> {
    match format {
        FileFormat::Csv => parse_csv_bytes(bytes),
        FileFormat::Spreadsheet => parse_spreadsheet_bytes(bytes),
    }
}

/// Read and decode a file, picking the format from its extension.
pub fn parse_file<P: AsRef<Path>>(path: P) -> ParseResult<ParsedFile> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    parse_bytes(&bytes, FileFormat::from_file_name(name))
}

/// Decode CSV bytes with encoding and delimiter auto-detection.
pub fn parse_csv_bytes(bytes: &[u8]) -> ParseResult<ParsedFile> {
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding);
    let delimiter = detect_delimiter(&content);

    let table = parse_csv_str(&content, delimiter)?;

    Ok(ParsedFile {
        table,
        format: FileFormat::Csv,
        encoding: Some(encoding),
        delimiter: Some(delimiter),
    })
}

/// Decode CSV text with an explicit delimiter.
///
/// # Example
/// ```ignore
/// use ratesheet::parser::parse_csv_str;
///
/// let table = parse_csv_str("Carrier,Origin Port\nMSC,Shanghai", ',').unwrap();
/// assert_eq!(table.columns(), ["Carrier", "Origin Port"]);
/// assert_eq!(table.rows()[0].get("Origin Port"), Some("Shanghai"));
/// ```
pub fn parse_csv_str(content: &str, delimiter: char) -> ParseResult<Table> {
    let delimiter = u8::try_from(delimiter)
        .map_err(|_| ParseError::Csv(format!("unsupported delimiter '{}'", delimiter)))?;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let mut records = reader.records();

    let headers: Vec<String> = match records.next() {
        Some(record) => record?.iter().map(str::to_string).collect(),
        None => return Err(ParseError::EmptyOrInvalidFile),
    };

    let mut grid = Vec::new();
    for record in records {
        let record = record?;
        grid.push(record.iter().map(str::to_string).collect::<Vec<_>>());
    }

    build_table(headers, grid)
}

/// Decode a workbook (xlsx, xls, ods) held in memory. Only the first sheet
/// is read.
pub fn parse_spreadsheet_bytes(bytes: &[u8]) -> ParseResult<ParsedFile> {
    let mut workbook: Sheets<_> = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| ParseError::Spreadsheet(format!("Failed to open workbook: {}", e)))?;

    let first_sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(ParseError::EmptyOrInvalidFile)?;

    let range = workbook
        .worksheet_range(&first_sheet)
        .map_err(|e| ParseError::Spreadsheet(format!("Failed to read sheet '{}': {}", first_sheet, e)))?;

    let table = table_from_range(&range)?;

    Ok(ParsedFile {
        table,
        format: FileFormat::Spreadsheet,
        encoding: None,
        delimiter: None,
    })
}

fn table_from_range(range: &Range<Data>) -> ParseResult<Table> {
    let mut rows = range.rows();

    let headers: Vec<String> = match rows.next() {
        Some(cells) => cells.iter().map(cell_to_string).collect(),
        None => return Err(ParseError::EmptyOrInvalidFile),
    };

    let grid: Vec<Vec<String>> = rows
        .map(|cells| cells.iter().map(cell_to_string).collect())
        .collect();

    build_table(headers, grid)
}

/// Assemble rows from a header line and raw cell lines.
///
/// Blank header cells produce no column, blank lines produce no row, short
/// lines are padded with empty cells and extra cells are dropped. Columns
/// come from the first row's keys in header order; a repeated header name
/// keeps its first position and its last value.
fn build_table(headers: Vec<String>, grid: Vec<Vec<String>>) -> ParseResult<Table> {
    let headers: Vec<String> = headers.into_iter().map(|h| h.trim().to_string()).collect();

    if headers.iter().all(String::is_empty) {
        return Err(ParseError::NoHeaders);
    }

    let rows: Vec<Row> = grid
        .into_iter()
        .filter(|line| line.iter().any(|v| !v.trim().is_empty()))
        .map(|line| {
            Row::from_pairs(
                headers
                    .iter()
                    .enumerate()
                    .filter(|(_, h)| !h.is_empty())
                    .map(|(i, h)| (h.clone(), line.get(i).cloned().unwrap_or_default())),
            )
        })
        .collect();

    let first = rows.first().ok_or(ParseError::EmptyOrInvalidFile)?;

    let mut columns: Vec<String> = Vec::new();
    for header in &headers {
        if first.contains(header) && !columns.contains(header) {
            columns.push(header.clone());
        }
    }

    Ok(Table::new(columns, rows))
}

/// Render a workbook cell as text
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        Data::DateTime(dt) => format_excel_datetime(dt.as_f64()),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
        Data::Error(_) => "#ERR".to_string(),
    }
}

/// Last serial Excel can display (9999-12-31).
const MAX_EXCEL_SERIAL: f64 = 2_958_465.0;

/// Format an Excel serial date (days since 1899-12-30).
///
/// Whole days render as `YYYY-MM-DD` so date cells validate like typed text.
/// Serials outside Excel's date range render as the plain number.
fn format_excel_datetime(value: f64) -> String {
    if !(0.0..MAX_EXCEL_SERIAL + 1.0).contains(&value) {
        return value.to_string();
    }

    let days = value.floor() as i64;
    let total_seconds = (value.fract() * 86400.0).round() as u32;

    let date = chrono::NaiveDate::from_ymd_opt(1899, 12, 30)
        .zip(chrono::Duration::try_days(days))
        .and_then(|(epoch, offset)| epoch.checked_add_signed(offset));
    let Some(date) = date else {
        return value.to_string();
    };

    if total_seconds == 0 {
        return date.format("%Y-%m-%d").to_string();
    }

    let time = chrono::NaiveTime::from_num_seconds_from_midnight_opt(total_seconds.min(86399), 0)
        .unwrap_or_default();
    chrono::NaiveDateTime::new(date, time)
        .format("%Y-%m-%dT%H:%M:%S")
        .to_string()
}
