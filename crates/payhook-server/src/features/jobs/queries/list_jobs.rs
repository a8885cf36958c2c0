//! List import jobs query
//!
//! Operator view over the `import_jobs` table. The status filter is the
//! primary tool for spotting permanently failed payloads.

use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::import::{ImportJobRecord, JobStatus};

const DEFAULT_LIMIT: i64 = 100;
const MAX_LIMIT: i64 = 1000;

/// Query to list import jobs
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListJobsQuery {
    /// Filter by status ("pending", "running", "succeeded", "failed")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Filter by owning tenant
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<i64>,
    /// Filter by canonical bank token
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_type: Option<String>,
    /// Limit number of results
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
    /// Offset for pagination
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
}

/// Response for list jobs query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListJobsResponse {
    pub jobs: Vec<ImportJobRecord>,
    pub total: i64,
}

/// Error type for list jobs query
#[derive(Debug, thiserror::Error)]
pub enum ListJobsError {
    #[error("invalid status filter: {0}")]
    InvalidStatus(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

struct Filters {
    status: Option<JobStatus>,
    tenant_id: Option<i64>,
    bank_type: Option<String>,
}

impl Filters {
    fn parse(query: &ListJobsQuery) -> Result<Self, ListJobsError> {
        let status = query
            .status
            .as_deref()
            .map(|s| s.parse::<JobStatus>().map_err(|_| ListJobsError::InvalidStatus(s.to_string())))
            .transpose()?;

        Ok(Self {
            status,
            tenant_id: query.tenant_id,
            bank_type: query.bank_type.as_deref().map(str::to_lowercase),
        })
    }

    fn push(&self, builder: &mut QueryBuilder<'_, Postgres>) {
        if let Some(status) = self.status {
            builder.push(" AND status = ").push_bind(status);
        }
        if let Some(tenant_id) = self.tenant_id {
            builder.push(" AND tenant_id = ").push_bind(tenant_id);
        }
        if let Some(ref bank_type) = self.bank_type {
            builder.push(" AND bank_type = ").push_bind(bank_type.clone());
        }
    }
}

pub async fn handle(pool: PgPool, query: ListJobsQuery) -> Result<ListJobsResponse, ListJobsError> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let offset = query.offset.unwrap_or(0).max(0);
    let filters = Filters::parse(&query)?;

    let mut list_builder: QueryBuilder<Postgres> = QueryBuilder::new(
        "SELECT id, tenant_id, bank_type, status, attempts, max_attempts, \
         total, inserted, duplicates, last_error, created_at, finished_at \
         FROM import_jobs WHERE 1=1",
    );
    filters.push(&mut list_builder);
    list_builder.push(" ORDER BY created_at DESC");
    list_builder.push(" LIMIT ").push_bind(limit);
    list_builder.push(" OFFSET ").push_bind(offset);

    let jobs = list_builder
        .build_query_as::<ImportJobRecord>()
        .fetch_all(&pool)
        .await?;

    let mut count_builder: QueryBuilder<Postgres> =
        QueryBuilder::new("SELECT COUNT(*) FROM import_jobs WHERE 1=1");
    filters.push(&mut count_builder);

    let total: i64 = count_builder
        .build_query_scalar()
        .fetch_one(&pool)
        .await?;

    Ok(ListJobsResponse { jobs, total })
}
