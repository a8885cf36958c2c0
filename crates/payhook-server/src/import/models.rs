//! Data models for the import pipeline
//!
//! Covers the bank-agnostic record shape produced by parsers, the
//! persisted transaction entity, and import job tracking.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Bank-agnostic transaction record produced by a format parser
///
/// Not yet persisted: carries no tenant or bank tag. `reference` is the
/// bank's own transaction identifier and becomes the global dedup key
/// at the storage layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedTransaction {
    pub reference: String,
    /// Non-negative, fixed-point amount. Never binary floating point.
    pub amount: Decimal,
    /// Calendar date with no time component
    pub transaction_date: NaiveDate,
    /// Bank-specific key/value annotations, possibly empty
    pub metadata: HashMap<String, String>,
}

/// Persisted transaction entity
///
/// Created once by the bulk persister on first successful insert and
/// never updated or deleted by this pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct StoredTransaction {
    pub id: i64,
    pub reference: String,
    pub tenant_id: i64,
    pub amount: Decimal,
    pub transaction_date: NaiveDate,
    /// Lower-cased canonical bank token
    pub bank_type: String,
    pub metadata: sqlx::types::Json<HashMap<String, String>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Per-invocation import result, never stored as-is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportOutcome {
    /// Records parsed from the payload
    pub total: u64,
    /// Records newly persisted
    pub inserted: u64,
    /// Records skipped because their reference already existed
    pub duplicates: u64,
}

impl ImportOutcome {
    /// Derive an outcome from parse and insert counts
    pub fn new(total: u64, inserted: u64) -> Self {
        Self {
            total,
            inserted,
            duplicates: total - inserted,
        }
    }
}

/// Import job lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Succeeded,
    Failed,
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Pending => write!(f, "pending"),
            JobStatus::Running => write!(f, "running"),
            JobStatus::Succeeded => write!(f, "succeeded"),
            JobStatus::Failed => write!(f, "failed"),
        }
    }
}

impl std::str::FromStr for JobStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(JobStatus::Pending),
            "running" => Ok(JobStatus::Running),
            "succeeded" => Ok(JobStatus::Succeeded),
            "failed" => Ok(JobStatus::Failed),
            _ => Err(anyhow::anyhow!("Invalid job status: {}", s)),
        }
    }
}

/// Import job record from the `import_jobs` table
///
/// One row per enqueued webhook payload. Terminal rows carry either the
/// import outcome counts or the last error text.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ImportJobRecord {
    pub id: Uuid,
    pub tenant_id: i64,
    pub bank_type: String,
    pub status: JobStatus,
    pub attempts: i32,
    pub max_attempts: i32,
    pub total: Option<i64>,
    pub inserted: Option<i64>,
    pub duplicates: Option<i64>,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl ImportJobRecord {
    /// Check if the job has reached a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self.status, JobStatus::Succeeded | JobStatus::Failed)
    }

    /// Check if the job failed permanently
    pub fn is_failed(&self) -> bool {
        self.status == JobStatus::Failed
    }

    /// Check if all delivery attempts were used up
    pub fn attempts_exhausted(&self) -> bool {
        self.attempts >= self.max_attempts
    }
}
