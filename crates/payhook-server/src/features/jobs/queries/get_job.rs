//! Get import job query

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::import::ImportJobRecord;

/// Query to fetch one import job by id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetJobQuery {
    pub job_id: Uuid,
}

/// Error type for get job query
#[derive(Debug, thiserror::Error)]
pub enum GetJobError {
    #[error("import job {0} not found")]
    NotFound(Uuid),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub async fn handle(pool: PgPool, query: GetJobQuery) -> Result<ImportJobRecord, GetJobError> {
    let job: Option<ImportJobRecord> = sqlx::query_as(
        "SELECT id, tenant_id, bank_type, status, attempts, max_attempts, \
         total, inserted, duplicates, last_error, created_at, finished_at \
         FROM import_jobs WHERE id = $1",
    )
    .bind(query.job_id)
    .fetch_optional(&pool)
    .await?;

    job.ok_or(GetJobError::NotFound(query.job_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::JobStatus;

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_finds_job_by_id(pool: PgPool) {
        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO import_jobs (id, tenant_id, bank_type, status, attempts, max_attempts) \
             VALUES ($1, 1, 'acme', $2, 0, 3)",
        )
        .bind(id)
        .bind(JobStatus::Pending)
        .execute(&pool)
        .await
        .unwrap();

        let job = handle(pool, GetJobQuery { job_id: id }).await.unwrap();
        assert_eq!(job.id, id);
        assert_eq!(job.status, JobStatus::Pending);
        assert_eq!(job.bank_type, "acme");
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_missing_job_is_not_found(pool: PgPool) {
        let result = handle(pool, GetJobQuery { job_id: Uuid::new_v4() }).await;
        assert!(matches!(result, Err(GetJobError::NotFound(_))));
    }
}
