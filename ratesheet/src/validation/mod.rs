//! Schema and row validation for rate sheets.
//!
//! # Schema
//!
//! [`missing_columns`] compares a column list against [`REQUIRED_COLUMNS`].
//! It runs once per load; edits and reorders never change which columns
//! exist.
//!
//! # Rows
//!
//! [`validate_row`] checks the fields below, in this order, and only when
//! the field is present and non-empty:
//!
//! | Field                | Rule                                   |
//! |----------------------|----------------------------------------|
//! | `Origin Port`        | letters and whitespace only            |
//! | `Destination Port`   | letters and whitespace only            |
//! | `Ocean Freight Rate` | finite number strictly greater than 0  |
//! | `Effective Date`     | exactly `YYYY-MM-DD`, real calendar day |
//!
//! [`row_error`] joins every violation message into the single string
//! stored on the row.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

use crate::models::{Row, REQUIRED_COLUMNS};

pub const ORIGIN_PORT: &str = "Origin Port";
pub const DESTINATION_PORT: &str = "Destination Port";
pub const OCEAN_FREIGHT_RATE: &str = "Ocean Freight Rate";
pub const EFFECTIVE_DATE: &str = "Effective Date";

static PORT_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z\s]+$").unwrap());
static ISO_DATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());

/// Required columns absent from `columns`, in required order.
pub fn missing_columns<S: AsRef<str>>(columns: &[S]) -> Vec<String> {
    REQUIRED_COLUMNS
        .iter()
        .filter(|required| !columns.iter().any(|c| c.as_ref() == **required))
        .map(|required| required.to_string())
        .collect()
}

/// A single broken field rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowViolation {
    InvalidOriginPort,
    InvalidDestinationPort,
    NonPositiveFreightRate,
    InvalidEffectiveDate,
}

impl RowViolation {
    /// Column the violation is about.
    pub fn column(&self) -> &'static str {
        match self {
            RowViolation::InvalidOriginPort => ORIGIN_PORT,
            RowViolation::InvalidDestinationPort => DESTINATION_PORT,
            RowViolation::NonPositiveFreightRate => OCEAN_FREIGHT_RATE,
            RowViolation::InvalidEffectiveDate => EFFECTIVE_DATE,
        }
    }
}

impl fmt::Display for RowViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowViolation::InvalidOriginPort => {
                write!(f, "\"{}\" contains invalid characters.", ORIGIN_PORT)
            }
            RowViolation::InvalidDestinationPort => {
                write!(f, "\"{}\" contains invalid characters.", DESTINATION_PORT)
            }
            RowViolation::NonPositiveFreightRate => {
                write!(f, "\"{}\" must be a number greater than zero.", OCEAN_FREIGHT_RATE)
            }
            RowViolation::InvalidEffectiveDate => {
                write!(f, "\"{}\" is not a valid date (expected YYYY-MM-DD).", EFFECTIVE_DATE)
            }
        }
    }
}

/// Every rule the row breaks, in rule order.
pub fn validate_row(row: &Row) -> Vec<RowViolation> {
    let mut violations = Vec::new();

    if let Some(port) = present(row, ORIGIN_PORT) {
        if !is_port_name(port) {
            violations.push(RowViolation::InvalidOriginPort);
        }
    }

    if let Some(port) = present(row, DESTINATION_PORT) {
        if !is_port_name(port) {
            violations.push(RowViolation::InvalidDestinationPort);
        }
    }

    if let Some(rate) = present(row, OCEAN_FREIGHT_RATE) {
        if !is_positive_rate(rate) {
            violations.push(RowViolation::NonPositiveFreightRate);
        }
    }

    if let Some(date) = present(row, EFFECTIVE_DATE) {
        if !is_iso_date(date) {
            violations.push(RowViolation::InvalidEffectiveDate);
        }
    }

    violations
}

/// Combined message for the row, `None` when it is valid.
///
/// # Example
/// ```ignore
/// use ratesheet::{models::Row, validation::row_error};
///
/// let row = Row::from_pairs([("Origin Port", "NY123")]);
/// assert_eq!(row_error(&row).as_deref(), Some("\"Origin Port\" contains invalid characters."));
/// ```
pub fn row_error(row: &Row) -> Option<String> {
    let violations = validate_row(row);
    if violations.is_empty() {
        return None;
    }

    Some(
        violations
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" "),
    )
}

/// Recompute and store the row's error, returning it.
pub fn revalidate(row: &mut Row) -> Option<&str> {
    let error = row_error(row);
    row.set_error(error);
    row.error()
}

fn present<'a>(row: &'a Row, column: &str) -> Option<&'a str> {
    row.get(column).filter(|v| !v.is_empty())
}

fn is_port_name(value: &str) -> bool {
    PORT_NAME.is_match(value)
}

fn is_positive_rate(value: &str) -> bool {
    value
        .trim()
        .parse::<f64>()
        .map(|rate| rate.is_finite() && rate > 0.0)
        .unwrap_or(false)
}

fn is_iso_date(value: &str) -> bool {
    ISO_DATE.is_match(value) && NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> Row {
        Row::from_pairs(pairs.iter().copied())
    }

    #[test]
    fn test_missing_columns_order() {
        let columns = ["Carrier", "Destination Port", "Origin Port"];
        assert_eq!(
            missing_columns(&columns),
            vec!["Container Type", "Ocean Freight Rate", "Effective Date"]
        );
    }

    #[test]
    fn test_missing_columns_case_sensitive() {
        let columns = ["origin port"];
        assert!(missing_columns(&columns).contains(&"Origin Port".to_string()));
    }

    #[test]
    fn test_all_required_present() {
        assert!(missing_columns(&REQUIRED_COLUMNS).is_empty());
    }

    #[test]
    fn test_valid_row() {
        let r = row(&[
            ("Origin Port", "New York"),
            ("Destination Port", "Rotterdam"),
            ("Ocean Freight Rate", "1500.50"),
            ("Effective Date", "2023-01-01"),
        ]);
        assert!(validate_row(&r).is_empty());
        assert_eq!(row_error(&r), None);
    }

    #[test]
    fn test_absent_and_empty_fields_pass() {
        assert_eq!(row_error(&row(&[])), None);
        assert_eq!(row_error(&row(&[("Ocean Freight Rate", "")])), None);
    }

    #[test]
    fn test_port_with_digits() {
        let r = row(&[("Origin Port", "NY123")]);
        assert_eq!(validate_row(&r), vec![RowViolation::InvalidOriginPort]);
    }

    #[test]
    fn test_port_with_punctuation() {
        let r = row(&[("Destination Port", "St. Petersburg")]);
        assert_eq!(validate_row(&r), vec![RowViolation::InvalidDestinationPort]);
    }

    #[test]
    fn test_freight_rate_rules() {
        for bad in ["-5", "0", "abc", "NaN", "inf"] {
            let r = row(&[("Ocean Freight Rate", bad)]);
            assert_eq!(validate_row(&r), vec![RowViolation::NonPositiveFreightRate], "{}", bad);
        }
        for good in ["5", "0.01", " 12 "] {
            assert_eq!(row_error(&row(&[("Ocean Freight Rate", good)])), None, "{}", good);
        }
    }

    #[test]
    fn test_effective_date_strict() {
        for bad in ["2023/01/01", "2023-1-1", "2023-02-30", "01-01-2023", "2023-01-01T00:00:00"] {
            let r = row(&[("Effective Date", bad)]);
            assert_eq!(validate_row(&r), vec![RowViolation::InvalidEffectiveDate], "{}", bad);
        }
        assert_eq!(row_error(&row(&[("Effective Date", "2024-02-29")])), None);
    }

    #[test]
    fn test_messages_joined_in_rule_order() {
        let r = row(&[
            ("Effective Date", "soon"),
            ("Origin Port", "NY123"),
            ("Ocean Freight Rate", "-1"),
        ]);
        assert_eq!(
            row_error(&r).unwrap(),
            "\"Origin Port\" contains invalid characters. \
             \"Ocean Freight Rate\" must be a number greater than zero. \
             \"Effective Date\" is not a valid date (expected YYYY-MM-DD)."
        );
    }

    #[test]
    fn test_deterministic() {
        let r = row(&[("Origin Port", "1"), ("Destination Port", "2")]);
        assert_eq!(row_error(&r), row_error(&r.clone()));
    }

    #[test]
    fn test_revalidate_stores_error() {
        let mut r = row(&[("Origin Port", "NY123")]);
        assert!(revalidate(&mut r).is_some());
        r.set("Origin Port", "NY");
        assert_eq!(revalidate(&mut r), None);
        assert!(r.is_valid());
    }
}
