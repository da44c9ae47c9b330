//! Correction store.
//!
//! A [`Session`] owns the live table of the file being corrected. It is
//! replaced wholesale on every load, mutated in place by [`Session::set_cell`]
//! and [`Session::move_column`], and cleared after a successful upload.
//!
//! ```text
//! load ──▶ (missing columns, row errors) ──▶ set_cell / move_column ──▶ snapshot ──▶ upload
//!                                                   ▲                                  │
//!                                                   └──────────── failure ◀────────────┘
//! ```

pub mod order;

use std::path::Path;

use crate::api::client::UploadClient;
use crate::api::logs::{log_error, log_info, log_success, log_warning, LogEntry, LOG_BROADCASTER};
use crate::api::types::SubmitOutcome;
use crate::error::{
    ParseResult, StoreError, StoreResult, SubmitBlocked, SubmitError, SubmitResult,
};
use crate::models::{FileFormat, Row, Table};
use crate::parser::{self, ParsedFile};
use crate::serializer::{self, Payload};
use crate::validation::{self, revalidate};

pub use order::{move_column, ColumnDrag};

/// A file that decoded successfully, with its derived validation state
#[derive(Debug, Clone)]
pub struct LoadedFile {
    pub name: String,
    pub format: FileFormat,
    pub encoding: Option<String>,
    pub delimiter: Option<char>,
    table: Table,
    missing_columns: Vec<String>,
}

impl LoadedFile {
    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn missing_columns(&self) -> &[String] {
        &self.missing_columns
    }
}

/// A stable copy of the table, serialized for upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    /// Name of the file the table was loaded from
    pub source_name: String,
    pub payload: Payload,
}

/// The in-memory correction store
#[derive(Debug, Default)]
pub struct Session {
    loaded: Option<LoadedFile>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode `bytes` and replace the current table.
    ///
    /// Every row is validated and the missing required columns are computed.
    /// On failure the session is left empty.
    pub fn load(&mut self, name: &str, bytes: &[u8], format: FileFormat) -> ParseResult<&LoadedFile> {
        self.loaded = None;

        let parsed = match parser::parse_bytes(bytes, format) {
            Ok(parsed) => parsed,
            Err(e) => {
                log_error(e.to_string());
                return Err(e);
            }
        };

        Ok(self.install(name, parsed))
    }

    /// Read a file from disk and load it, picking the format from its
    /// extension.
    pub fn load_path<P: AsRef<Path>>(&mut self, path: P) -> ParseResult<&LoadedFile> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();

        self.loaded = None;
        let bytes = std::fs::read(path)?;
        self.load(&name, &bytes, FileFormat::from_file_name(&name))
    }

    fn install(&mut self, name: &str, parsed: ParsedFile) -> &LoadedFile {
        let ParsedFile { mut table, format, encoding, delimiter } = parsed;

        let mut invalid = 0;
        for row in &mut table.rows {
            if revalidate(row).is_some() {
                invalid += 1;
            }
        }

        let missing_columns = validation::missing_columns(table.columns());

        log_success(format!(
            "Loaded {} ({} rows, {} columns)",
            name,
            table.row_count(),
            table.columns().len()
        ));
        if !missing_columns.is_empty() {
            log_warning(format!("Missing required columns: {}", missing_columns.join(", ")));
        }
        if invalid > 0 {
            log_warning(format!("{} rows have validation errors", invalid));
        }

        self.loaded.insert(LoadedFile {
            name: name.to_string(),
            format,
            encoding,
            delimiter,
            table,
            missing_columns,
        })
    }

    /// Drop the current table.
    pub fn clear(&mut self) {
        self.loaded = None;
    }

    pub fn loaded(&self) -> Option<&LoadedFile> {
        self.loaded.as_ref()
    }

    pub fn table(&self) -> Option<&Table> {
        self.loaded.as_ref().map(|f| &f.table)
    }

    /// Required columns absent from the loaded file; empty when nothing is
    /// loaded.
    pub fn missing_columns(&self) -> &[String] {
        self.loaded
            .as_ref()
            .map(|f| f.missing_columns.as_slice())
            .unwrap_or(&[])
    }

    /// First `limit` rows, for display.
    pub fn preview(&self, limit: usize) -> &[Row] {
        match &self.loaded {
            Some(f) => &f.table.rows[..limit.min(f.table.rows.len())],
            None => &[],
        }
    }

    /// Indices of rows that currently carry an error.
    pub fn invalid_rows(&self) -> Vec<usize> {
        self.table()
            .map(|t| {
                t.rows()
                    .iter()
                    .enumerate()
                    .filter(|(_, r)| !r.is_valid())
                    .map(|(i, _)| i)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Replace one cell and revalidate its row only.
    ///
    /// Returns the row's error after the edit.
    pub fn set_cell(&mut self, row: usize, column: &str, value: impl Into<String>) -> StoreResult<Option<&str>> {
        let file = self.loaded.as_mut().ok_or(StoreError::NoFileLoaded)?;
        let table = &mut file.table;

        if !table.has_column(column) {
            return Err(StoreError::UnknownColumn(column.to_string()));
        }

        let len = table.rows.len();
        let target = table
            .rows
            .get_mut(row)
            .ok_or(StoreError::RowOutOfRange { index: row, len })?;

        let was_valid = target.is_valid();
        target.set(column, value);

        match revalidate(target) {
            Some(error) => {
                LOG_BROADCASTER.log(LogEntry::warning(error.to_string()).for_row(row));
            }
            None if !was_valid => {
                LOG_BROADCASTER.log(LogEntry::success("Row corrected").for_row(row));
            }
            None => {}
        }

        Ok(target.error())
    }

    /// Move a column in the display order. Row data is untouched.
    pub fn move_column(&mut self, from: usize, to: usize) -> StoreResult<()> {
        let file = self.loaded.as_mut().ok_or(StoreError::NoFileLoaded)?;
        order::move_column(&mut file.table.columns, from, to)
    }

    /// Continue a header drag: the pointer is now over position `over`.
    pub fn drag_hover(&mut self, drag: &mut ColumnDrag, over: usize) -> StoreResult<()> {
        let file = self.loaded.as_mut().ok_or(StoreError::NoFileLoaded)?;
        drag.hover(&mut file.table.columns, over)
    }

    /// Why the session cannot be submitted, if it cannot.
    pub fn check_submittable(&self) -> Result<(), SubmitBlocked> {
        let file = self.loaded.as_ref().ok_or(SubmitBlocked::NoFileLoaded)?;

        let invalid = file.table.rows().iter().filter(|r| !r.is_valid()).count();
        if invalid > 0 {
            return Err(SubmitBlocked::RowErrors { count: invalid });
        }

        if !file.missing_columns.is_empty() {
            return Err(SubmitBlocked::MissingRequiredColumns(file.missing_columns.clone()));
        }

        Ok(())
    }

    /// A file is loaded, no row has an error and no required column is missing.
    pub fn is_submittable(&self) -> bool {
        self.check_submittable().is_ok()
    }

    /// Serialize the current table in its original format.
    ///
    /// Fails when the session is not submittable. The returned submission
    /// owns its bytes, so later edits do not affect it.
    pub fn snapshot(&self) -> SubmitResult<Submission> {
        self.check_submittable()?;

        // check_submittable guarantees a loaded file
        let file = self.loaded.as_ref().ok_or(SubmitBlocked::NoFileLoaded)?;
        let payload = serializer::serialize(&file.table, file.format)?;

        Ok(Submission {
            source_name: file.name.clone(),
            payload,
        })
    }

    /// Apply the result of an upload: clear on success, keep everything on
    /// failure so the user can retry.
    pub fn complete_submission(&mut self, result: &SubmitResult<SubmitOutcome>) {
        match result {
            Ok(outcome) => {
                log_success(outcome.message.clone());
                self.clear();
            }
            Err(e) => {
                log_error(format!("Upload failed: {}", e));
            }
        }
    }

    /// Snapshot, upload and apply the result in one call.
    pub async fn submit(&mut self, client: &UploadClient) -> SubmitResult<SubmitOutcome> {
        let submission = match self.snapshot() {
            Ok(s) => s,
            Err(e) => {
                log_error(e.user_message());
                return Err(e);
            }
        };

        log_info(format!(
            "Submitting {} ({} bytes)",
            submission.payload.file_name,
            submission.payload.bytes.len()
        ));

        let result = client.submit(submission).await;
        self.complete_submission(&result);
        result
    }
}
