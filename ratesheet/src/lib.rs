//! # Ratesheet - ocean freight rate sheet correction and upload
//!
//! Ratesheet loads a rate sheet (CSV or spreadsheet), checks it against the
//! receiving service's column contract and field rules, lets the caller fix
//! cells and reorder columns, then re-serializes and uploads it.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────┐    ┌──────────┐    ┌────────────┐    ┌────────────┐    ┌──────────┐
//! │ CSV/XLSX  │───▶│  Parser  │───▶│ Validation │───▶│  Session   │───▶│Serializer│───▶ POST /upload
//! │  (bytes)  │    │(auto-enc)│    │(schema+row)│    │(edit/order)│    │(csv/xlsx)│
//! └───────────┘    └──────────┘    └────────────┘    └────────────┘    └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ratesheet::{Config, Session, UploadClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut session = Session::new();
//!     session.load_path("rates.csv")?;
//!     session.set_cell(0, "Origin Port", "Shanghai")?;
//!
//!     let client = UploadClient::new(&Config::from_env()?)?;
//!     let outcome = session.submit(&client).await?;
//!     println!("{}", outcome.message);
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types per stage
//! - [`config`] - Environment configuration
//! - [`models`] - Rows, tables, file formats, required columns
//! - [`parser`] - CSV / workbook decoding
//! - [`validation`] - Required columns and per-row rules
//! - [`store`] - Correction store and column ordering
//! - [`serializer`] - CSV / xlsx encoding
//! - [`api`] - Upload client and notifications

// Core modules
pub mod config;
pub mod error;
pub mod models;

// Pipeline
pub mod parser;
pub mod serializer;
pub mod store;
pub mod validation;

// Upload API
pub mod api;

// =============================================================================
// Re-exports - Errors
// =============================================================================

pub use error::{ConfigError, ParseError, SerializeError, StoreError, SubmitBlocked, SubmitError};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use config::Config;
pub use models::{FileFormat, Row, Table, REQUIRED_COLUMNS};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use parser::{parse_bytes, parse_file, ParsedFile};
pub use serializer::{csv_fidelity_gaps, serialize, FidelityGap, Payload};
pub use store::{ColumnDrag, LoadedFile, Session, Submission};
pub use validation::{missing_columns, row_error, validate_row, RowViolation};

// =============================================================================
// Re-exports - API
// =============================================================================

pub use api::client::UploadClient;
pub use api::logs::{LogEntry, LogLevel, LOG_BROADCASTER};
pub use api::types::SubmitOutcome;
