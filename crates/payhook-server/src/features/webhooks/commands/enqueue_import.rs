//! Enqueue import command
//!
//! Accepts a raw webhook body for a bank and tenant, records a pending
//! import job, and hands it to the worker queue. The payload is never
//! parsed here: a body the registry or parser rejects is still accepted
//! at the ingress and fails as a job, where operators can see it.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::import::{EnqueueError, JobQueue, WebhookJob};

/// Tenant used when the webhook carries no `client_id`
pub const DEFAULT_TENANT_ID: i64 = 1;

/// Command to enqueue a webhook payload for import
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnqueueImportCommand {
    /// Bank-type token from the webhook path
    pub bank_type: String,
    /// Tenant the transactions belong to
    pub tenant_id: i64,
    /// Raw webhook body exactly as delivered
    pub raw_body: String,
}

/// Response for the enqueue command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnqueueImportResponse {
    pub job_id: Uuid,
}

/// Error type for the enqueue command
#[derive(Debug, Error)]
pub enum EnqueueImportError {
    #[error("empty webhook body")]
    EmptyBody,

    #[error(transparent)]
    Queue(#[from] EnqueueError),
}

pub async fn handle(
    queue: &JobQueue,
    command: EnqueueImportCommand,
) -> Result<EnqueueImportResponse, EnqueueImportError> {
    if command.raw_body.trim().is_empty() {
        return Err(EnqueueImportError::EmptyBody);
    }

    let job = WebhookJob::new(command.raw_body, command.tenant_id, &command.bank_type);
    let job_id = queue.enqueue(job).await?;

    tracing::info!(%job_id, bank_type = %command.bank_type, tenant_id = command.tenant_id, "webhook accepted");

    Ok(EnqueueImportResponse { job_id })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ImportConfig;
    use crate::parsers::ParserRegistry;
    use sqlx::PgPool;
    use std::sync::Arc;

    fn queue(pool: &PgPool) -> JobQueue {
        JobQueue::start(
            &ImportConfig::default(),
            pool.clone(),
            Arc::new(ParserRegistry::with_default_banks()),
        )
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_enqueue_records_pending_job(pool: PgPool) {
        let queue = queue(&pool);

        let response = handle(
            &queue,
            EnqueueImportCommand {
                bank_type: "Acme".to_string(),
                tenant_id: 7,
                raw_body: "156,50//REF001//20250615".to_string(),
            },
        )
        .await
        .unwrap();

        let (bank_type, tenant_id): (String, i64) =
            sqlx::query_as("SELECT bank_type, tenant_id FROM import_jobs WHERE id = $1")
                .bind(response.job_id)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(bank_type, "acme");
        assert_eq!(tenant_id, 7);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_blank_body_is_rejected(pool: PgPool) {
        let queue = queue(&pool);

        let result = handle(
            &queue,
            EnqueueImportCommand {
                bank_type: "acme".to_string(),
                tenant_id: 1,
                raw_body: "  \n ".to_string(),
            },
        )
        .await;

        assert!(matches!(result, Err(EnqueueImportError::EmptyBody)));

        let jobs: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM import_jobs")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(jobs, 0);
    }
}
