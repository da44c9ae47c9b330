//! Error types for the rate sheet pipeline.
//!
//! One enum per stage:
//!
//! - [`ParseError`] - decoding an uploaded file into a table
//! - [`StoreError`] - invalid edits or reorders against the live table
//! - [`SubmitBlocked`] - why the current table may not be submitted
//! - [`SerializeError`] - re-encoding the corrected table
//! - [`SubmitError`] - upload failures (transport or server)
//! - [`ConfigError`] - process configuration
//!
//! Missing required columns and per-row violations are *state* carried by
//! the session, not errors: they never abort a load.

use thiserror::Error;

// =============================================================================
// Parsing Errors
// =============================================================================

/// Errors while decoding an uploaded file.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The file decoded to zero data rows.
    #[error("File is empty or invalid!")]
    EmptyOrInvalidFile,

    /// Failed to read the file from disk.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// The header row is missing or blank.
    #[error("No headers found in file")]
    NoHeaders,

    /// Malformed CSV content.
    #[error("Invalid CSV content: {0}")]
    Csv(String),

    /// The workbook could not be opened or read.
    #[error("Invalid spreadsheet: {0}")]
    Spreadsheet(String),
}

impl From<csv::Error> for ParseError {
    fn from(e: csv::Error) -> Self {
        ParseError::Csv(e.to_string())
    }
}

// =============================================================================
// Store Errors
// =============================================================================

/// Programming errors against the correction store.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    /// No table is loaded.
    #[error("No file loaded")]
    NoFileLoaded,

    /// Row index past the end of the table.
    #[error("Row {index} out of range (table has {len} rows)")]
    RowOutOfRange { index: usize, len: usize },

    /// Column name not part of the table.
    #[error("Unknown column '{0}'")]
    UnknownColumn(String),

    /// Column position past the end of the column list.
    #[error("Column position {index} out of range (table has {len} columns)")]
    ColumnOutOfRange { index: usize, len: usize },
}

// =============================================================================
// Submission Gate
// =============================================================================

/// Reason the current session is not submittable.
///
/// The display strings are the messages shown to the user.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubmitBlocked {
    /// Nothing has been loaded.
    #[error("No file selected!")]
    NoFileLoaded,

    /// At least one row still carries a validation error.
    #[error("Fix the Error before submit ({count} invalid rows)")]
    RowErrors { count: usize },

    /// Required columns are absent from the file.
    #[error("Cannot submit. Missing required columns: {}", .0.join(", "))]
    MissingRequiredColumns(Vec<String>),
}

// =============================================================================
// Serialization Errors
// =============================================================================

/// Errors while re-encoding the corrected table.
#[derive(Debug, Error)]
pub enum SerializeError {
    /// The workbook writer failed.
    #[error("Failed to write spreadsheet: {0}")]
    Spreadsheet(String),
}

// =============================================================================
// Submission Errors
// =============================================================================

/// Upload failures. The table is left untouched so the user can retry.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// The session was not in a submittable state.
    #[error("{0}")]
    Blocked(#[from] SubmitBlocked),

    /// The payload could not be produced.
    #[error("Serialization failed: {0}")]
    Serialize(#[from] SerializeError),

    /// The request never got a response.
    #[error("HTTP request failed: {0}")]
    Transport(String),

    /// The endpoint answered with a non-2xx status.
    #[error("Server error ({status}): {body}")]
    Server { status: u16, body: String },
}

impl SubmitError {
    /// Message shown to the user for this failure.
    ///
    /// Gate failures keep their specific wording; every transport or server
    /// failure collapses to one generic retry message.
    pub fn user_message(&self) -> String {
        match self {
            SubmitError::Blocked(blocked) => blocked.to_string(),
            _ => "File upload failed. Please try again.".to_string(),
        }
    }
}

impl From<reqwest::Error> for SubmitError {
    fn from(e: reqwest::Error) -> Self {
        SubmitError::Transport(e.to_string())
    }
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors while resolving process configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The upload base URL is not configured.
    #[error("Missing {0} environment variable")]
    MissingBaseUrl(&'static str),

    /// The upload base URL is not an http(s) URL.
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),

    /// The timeout is not a positive number of seconds.
    #[error("Invalid upload timeout: {0}")]
    InvalidTimeout(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for parsing.
pub type ParseResult<T> = Result<T, ParseError>;

/// Result type for store mutations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type for serialization.
pub type SerializeResult<T> = Result<T, SerializeError>;

/// Result type for submission.
pub type SubmitResult<T> = Result<T, SubmitError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocked_converts_to_submit_error() {
        let blocked = SubmitBlocked::MissingRequiredColumns(vec![
            "Carrier".into(),
            "Effective Date".into(),
        ]);
        let err: SubmitError = blocked.into();
        assert_eq!(
            err.user_message(),
            "Cannot submit. Missing required columns: Carrier, Effective Date"
        );
    }

    #[test]
    fn test_transport_failure_has_generic_message() {
        let err = SubmitError::Server { status: 502, body: "bad gateway".into() };
        assert!(err.to_string().contains("502"));
        assert_eq!(err.user_message(), "File upload failed. Please try again.");
    }

    #[test]
    fn test_store_error_format() {
        let err = StoreError::RowOutOfRange { index: 7, len: 3 };
        let msg = err.to_string();
        assert!(msg.contains("Row 7"));
        assert!(msg.contains("3 rows"));
    }
}
