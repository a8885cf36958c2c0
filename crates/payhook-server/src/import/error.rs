//! Import pipeline error taxonomy
//!
//! Three failure classes with different retry semantics:
//!
//! - [`FormatError`]: malformed payload, caller-attributable, never
//!   retried
//! - [`UnsupportedBankError`]: no registered parser, configuration-
//!   attributable, never retried
//! - [`PersistenceError`]: non-duplicate storage failure, infrastructure-
//!   attributable, retryable
//!
//! Duplicate-key responses from storage are not errors at all; the
//! persister absorbs them as expected outcomes.

use thiserror::Error;

use crate::parsers::{FormatError, UnsupportedBankError};

/// A non-duplicate storage failure during bulk persistence
///
/// Rolls back the whole batch's transactional scope. Retryable: the
/// batch can be safely re-imported once the storage layer recovers.
#[derive(Debug, Error)]
#[error("storage failure during import: {0}")]
pub struct PersistenceError(#[from] sqlx::Error);

/// Any failure of a single import invocation
///
/// Parser and persister errors propagate unmodified; the job runner is
/// the sole place that decides retry versus permanent failure.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error(transparent)]
    UnsupportedBank(#[from] UnsupportedBankError),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

impl ImportError {
    /// Whether retrying the same payload could change the outcome
    pub fn is_retryable(&self) -> bool {
        matches!(self, ImportError::Persistence(_))
    }
}
