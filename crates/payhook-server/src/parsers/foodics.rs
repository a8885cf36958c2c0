//! Foodics Bank webhook format
//!
//! One transaction per line, fields joined by `#`. The first field is
//! the date (`YYYYMMDD`) immediately followed by the amount with no
//! separator; the second field is the reference. An optional third field
//! carries `key/value` metadata pairs; pairs without a `/` are dropped
//! rather than treated as errors.
//!
//! Example: `20250615156,50#202506159000001#note/debt payment`

use std::collections::HashMap;

use super::{non_blank_lines, parse_amount, parse_date, BankParser, FormatError};
use crate::import::models::NormalizedTransaction;

const FIELD_DELIMITER: char = '#';

/// Length of the `YYYYMMDD` date prefix in the first field
const DATE_PREFIX_LEN: usize = 8;

/// Parser for the Foodics Bank grammar
#[derive(Debug, Default, Clone, Copy)]
pub struct FoodicsParser;

impl BankParser for FoodicsParser {
    fn parse(&self, raw_body: &str) -> Result<Vec<NormalizedTransaction>, FormatError> {
        non_blank_lines(raw_body)
            .map(|(line_no, line)| parse_line(line, line_no))
            .collect()
    }
}

fn parse_line(line: &str, line_no: usize) -> Result<NormalizedTransaction, FormatError> {
    let parts: Vec<&str> = line.split(FIELD_DELIMITER).collect();

    if parts.len() < 2 {
        return Err(FormatError::FieldCount {
            line: line_no,
            expected: "at least 2 '#'-delimited",
            found: parts.len(),
        });
    }

    let date_amount = parts[0].trim();
    let (date_str, amount_str) =
        date_amount
            .split_at_checked(DATE_PREFIX_LEN)
            .ok_or_else(|| FormatError::InvalidDate {
                line: line_no,
                value: date_amount.to_string(),
            })?;

    Ok(NormalizedTransaction {
        transaction_date: parse_date(date_str, line_no)?,
        amount: parse_amount(amount_str, line_no)?,
        reference: parts[1].trim().to_string(),
        metadata: parts.get(2).map(|s| parse_metadata(s)).unwrap_or_default(),
    })
}

/// Extract `key/value` pairs from the metadata field
///
/// The field may span several embedded lines; entries without a `/`
/// are silently dropped.
fn parse_metadata(raw: &str) -> HashMap<String, String> {
    raw.split('\n')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .filter_map(|pair| pair.split_once('/'))
        .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parses_single_transaction_with_metadata() {
        let result = FoodicsParser
            .parse("20250615156,50#202506159000001#note/debt payment")
            .unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].reference, "202506159000001");
        assert_eq!(result[0].amount, dec!(156.50));
        assert_eq!(
            result[0].transaction_date,
            NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
        );
        assert_eq!(result[0].metadata.get("note").map(String::as_str), Some("debt payment"));
    }

    #[test]
    fn test_parses_multiple_transactions() {
        let body = "20250615100,00#REF001#key1/value1\n20250616200,50#REF002#key2/value2";
        let result = FoodicsParser.parse(body).unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].reference, "REF001");
        assert_eq!(result[0].amount, dec!(100.00));
        assert_eq!(result[1].reference, "REF002");
        assert_eq!(result[1].amount, dec!(200.50));
    }

    #[test]
    fn test_missing_metadata_part_is_tolerated() {
        let result = FoodicsParser.parse("2025061550,00#REF003").unwrap();

        assert_eq!(result.len(), 1);
        assert!(result[0].metadata.is_empty());
    }

    #[test]
    fn test_metadata_pairs_without_slash_are_dropped() {
        let result = FoodicsParser
            .parse("20250615156,50#REF001#note/payment\nnot-a-pair")
            .unwrap_err();
        // The embedded second line has no '#', so the batch fails as a
        // whole; only a pair inside the third field is droppable.
        assert!(matches!(result, FormatError::FieldCount { line: 2, .. }));

        let result = FoodicsParser
            .parse("20250615156,50#REF001#note/debt payment")
            .unwrap();
        assert_eq!(result[0].metadata.len(), 1);
    }

    #[test]
    fn test_rejects_line_without_delimiter() {
        assert!(matches!(
            FoodicsParser.parse("invalid_format"),
            Err(FormatError::FieldCount { found: 1, .. })
        ));
    }

    #[test]
    fn test_rejects_first_field_shorter_than_date() {
        assert!(matches!(
            FoodicsParser.parse("2025#REF001"),
            Err(FormatError::InvalidDate { .. })
        ));
    }

    #[test]
    fn test_rejects_missing_amount_after_date() {
        assert!(matches!(
            FoodicsParser.parse("20250615#REF001"),
            Err(FormatError::InvalidAmount { .. })
        ));
    }

    #[test]
    fn test_malformed_line_yields_zero_records() {
        let body = "20250615100,00#REF001\nbroken";
        assert!(FoodicsParser.parse(body).is_err());
    }

    #[test]
    fn test_metadata_parsing_drops_malformed_pairs() {
        let metadata = parse_metadata("note/payment\ncategory/expense\nmalformed\n");
        assert_eq!(metadata.len(), 2);
        assert_eq!(metadata.get("note").map(String::as_str), Some("payment"));
        assert_eq!(metadata.get("category").map(String::as_str), Some("expense"));
    }
}
