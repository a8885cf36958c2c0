//! Per-bank webhook format parsers
//!
//! Each bank delivers payment notifications as line-oriented text in its
//! own positional grammar. A parser is a stateless transformer from the
//! raw body to an ordered sequence of [`NormalizedTransaction`] records.
//!
//! Parsing is all-or-nothing: any line that violates the bank's grammar
//! fails the whole payload with a [`FormatError`], so a successful parse
//! guarantees every line was understood. Blank lines are dropped after
//! trimming; line order is preserved in the output.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::import::models::NormalizedTransaction;

pub mod acme;
pub mod foodics;
pub mod registry;

pub use acme::AcmeParser;
pub use foodics::FoodicsParser;
pub use registry::{ParserRegistry, UnsupportedBankError};

/// A line in a webhook payload did not match the bank's grammar
///
/// Caller-attributable and non-retryable: redelivering the same payload
/// cannot change the outcome. Line numbers are 1-based positions in the
/// raw body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("line {line}: expected {expected}, found {found} fields")]
    FieldCount {
        line: usize,
        expected: &'static str,
        found: usize,
    },

    #[error("line {line}: invalid amount {value:?}")]
    InvalidAmount { line: usize, value: String },

    #[error("line {line}: negative amount {value}")]
    NegativeAmount { line: usize, value: Decimal },

    #[error("line {line}: invalid date {value:?}")]
    InvalidDate { line: usize, value: String },
}

/// Parses one bank's webhook body into normalized transactions
pub trait BankParser: std::fmt::Debug + Send + Sync {
    fn parse(&self, raw_body: &str) -> Result<Vec<NormalizedTransaction>, FormatError>;
}

/// Trimmed, non-blank payload lines with their 1-based positions
fn non_blank_lines(raw_body: &str) -> impl Iterator<Item = (usize, &str)> {
    raw_body
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty())
}

/// Parse a `YYYYMMDD` date field into a calendar date
fn parse_date(value: &str, line: usize) -> Result<NaiveDate, FormatError> {
    NaiveDate::parse_from_str(value, "%Y%m%d").map_err(|_| FormatError::InvalidDate {
        line,
        value: value.to_string(),
    })
}

/// Parse an amount field using `,` as the fractional separator
///
/// No thousands-separator handling and no currency symbol tolerance.
fn parse_amount(value: &str, line: usize) -> Result<Decimal, FormatError> {
    let normalized = value.replace(',', ".");
    let amount: Decimal = normalized.parse().map_err(|_| FormatError::InvalidAmount {
        line,
        value: value.to_string(),
    })?;

    if amount.is_sign_negative() {
        return Err(FormatError::NegativeAmount { line, value: amount });
    }

    Ok(amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_date_valid() {
        let date = parse_date("20250615", 1).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2025, 6, 15).unwrap());
    }

    #[test]
    fn test_parse_date_rejects_month_13() {
        assert!(matches!(
            parse_date("20251315", 2),
            Err(FormatError::InvalidDate { line: 2, .. })
        ));
    }

    #[test]
    fn test_parse_date_rejects_short_input() {
        assert!(parse_date("2025615", 1).is_err());
    }

    #[test]
    fn test_parse_amount_comma_separator() {
        assert_eq!(parse_amount("156,50", 1).unwrap(), dec!(156.50));
    }

    #[test]
    fn test_parse_amount_rejects_garbage() {
        assert!(matches!(
            parse_amount("12x,50", 3),
            Err(FormatError::InvalidAmount { line: 3, .. })
        ));
    }

    #[test]
    fn test_parse_amount_rejects_negative() {
        assert!(matches!(
            parse_amount("-5,00", 1),
            Err(FormatError::NegativeAmount { line: 1, .. })
        ));
    }

    #[test]
    fn test_non_blank_lines_keeps_positions() {
        let lines: Vec<_> = non_blank_lines("a\n\n  \nb\n").collect();
        assert_eq!(lines, vec![(1, "a"), (4, "b")]);
    }
}
