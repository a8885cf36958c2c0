//! Import job payload
//!
//! The payload carried through the job queue. It is fully self-contained
//! and replayable: no request-scoped state, just the raw body and its
//! routing attributes.

use serde::{Deserialize, Serialize};

/// One enqueued webhook payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookJob {
    /// Raw webhook body exactly as delivered by the bank
    pub raw_body: String,
    /// Owning tenant under which the transactions are recorded
    pub tenant_id: i64,
    /// Canonical (lower-cased) bank-type token
    pub bank_type: String,
}

impl WebhookJob {
    /// Create a job payload, canonicalizing the bank-type token
    pub fn new(raw_body: impl Into<String>, tenant_id: i64, bank_type: &str) -> Self {
        Self {
            raw_body: raw_body.into(),
            tenant_id,
            bank_type: bank_type.to_lowercase(),
        }
    }
}
