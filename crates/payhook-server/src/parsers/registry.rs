//! Parser registry
//!
//! Immutable mapping from bank-type tokens to format parsers, built once
//! at process start and passed by reference into the import pipeline.
//! This is deliberately a closed lookup table, not a plugin system: each
//! bank grammar is bespoke, so supporting a new bank means adding a
//! parser and a registry entry.

use std::collections::HashMap;

use thiserror::Error;

use super::{AcmeParser, BankParser, FoodicsParser};

/// No parser is registered for the requested bank-type token
///
/// A configuration-attributable error, distinct from a parse failure:
/// the payload was never looked at.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("bank type {0:?} is not supported")]
pub struct UnsupportedBankError(pub String);

/// Immutable bank-type to parser mapping
pub struct ParserRegistry {
    parsers: HashMap<&'static str, Box<dyn BankParser>>,
}

impl ParserRegistry {
    /// Build the registry with all supported banks
    pub fn with_default_banks() -> Self {
        let mut parsers: HashMap<&'static str, Box<dyn BankParser>> = HashMap::new();
        parsers.insert("acme", Box::new(AcmeParser));
        parsers.insert("foodics", Box::new(FoodicsParser));
        Self { parsers }
    }

    /// Resolve a parser for a bank-type token, case-insensitively
    pub fn resolve(&self, bank_type: &str) -> Result<&dyn BankParser, UnsupportedBankError> {
        self.parsers
            .get(bank_type.to_lowercase().as_str())
            .map(|parser| parser.as_ref())
            .ok_or_else(|| UnsupportedBankError(bank_type.to_string()))
    }

    /// Registered canonical bank tokens
    pub fn bank_types(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.parsers.keys().copied()
    }
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::with_default_banks()
    }
}
