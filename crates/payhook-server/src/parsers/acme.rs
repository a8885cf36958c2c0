//! Acme Bank webhook format
//!
//! One transaction per line, three fields joined by the literal `//`
//! delimiter: amount (comma as fractional separator), reference, date
//! (`YYYYMMDD`).
//!
//! Example: `156,50//202506159000001//20250615`

use std::collections::HashMap;

use super::{non_blank_lines, parse_amount, parse_date, BankParser, FormatError};
use crate::import::models::NormalizedTransaction;

const FIELD_DELIMITER: &str = "//";

/// Parser for the Acme Bank grammar. Acme never carries metadata.
#[derive(Debug, Default, Clone, Copy)]
pub struct AcmeParser;

impl BankParser for AcmeParser {
    fn parse(&self, raw_body: &str) -> Result<Vec<NormalizedTransaction>, FormatError> {
        non_blank_lines(raw_body)
            .map(|(line_no, line)| parse_line(line, line_no))
            .collect()
    }
}

fn parse_line(line: &str, line_no: usize) -> Result<NormalizedTransaction, FormatError> {
    let parts: Vec<&str> = line.split(FIELD_DELIMITER).collect();

    if parts.len() != 3 {
        return Err(FormatError::FieldCount {
            line: line_no,
            expected: "3 '//'-delimited",
            found: parts.len(),
        });
    }

    Ok(NormalizedTransaction {
        amount: parse_amount(parts[0].trim(), line_no)?,
        reference: parts[1].trim().to_string(),
        transaction_date: parse_date(parts[2].trim(), line_no)?,
        metadata: HashMap::new(),
    })
}
