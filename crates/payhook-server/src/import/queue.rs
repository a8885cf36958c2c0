//! In-process import job queue
//!
//! A bounded mpsc channel feeding a pool of worker tasks. Workers pull
//! jobs, run the orchestrator under a wall-clock deadline, and decide
//! retry versus permanent failure:
//!
//! - retryable failures (timeout, storage) are redelivered with an
//!   incremented attempt counter until `max_attempts` is exhausted
//! - non-retryable failures (unsupported bank, malformed payload) go
//!   permanent on the first attempt
//!
//! Every state change is written to the `import_jobs` table, which is
//! the operator-visible record of each payload's fate. Jobs for
//! different tenants and banks run fully in parallel; the storage
//! uniqueness constraint arbitrates cross-worker races.

use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;
use thiserror::Error;
use tokio::sync::{mpsc, Mutex};
use tokio::time::{sleep, timeout};
use uuid::Uuid;

use super::jobs::WebhookJob;
use super::models::{ImportOutcome, JobStatus};
use super::orchestrator;
use crate::config::ImportConfig;
use crate::parsers::ParserRegistry;

/// Delay before a retryable failure is redelivered
const RETRY_DELAY: Duration = Duration::from_secs(1);

/// Errors surfaced to the ingress when accepting a job
#[derive(Debug, Error)]
pub enum EnqueueError {
    #[error("failed to record import job: {0}")]
    Database(#[from] sqlx::Error),

    #[error("import queue is shut down")]
    QueueClosed,
}

/// A job plus its delivery state inside the queue
#[derive(Debug)]
struct QueuedJob {
    id: Uuid,
    /// Completed delivery attempts so far
    attempts: u32,
    job: WebhookJob,
}

/// Handle for enqueuing import jobs
#[derive(Clone)]
pub struct JobQueue {
    sender: mpsc::Sender<QueuedJob>,
    pool: PgPool,
    max_attempts: u32,
}

impl JobQueue {
    /// Spawn the worker pool and return the enqueue handle
    pub fn start(config: &ImportConfig, pool: PgPool, registry: Arc<ParserRegistry>) -> Self {
        let (sender, receiver) = mpsc::channel(config.queue_capacity);
        let receiver = Arc::new(Mutex::new(receiver));

        for worker_id in 0..config.workers {
            let ctx = WorkerContext {
                pool: pool.clone(),
                registry: registry.clone(),
                // Weak so that retries never keep the channel alive once
                // every enqueue handle is gone.
                retry_sender: sender.downgrade(),
                max_attempts: config.max_attempts,
                job_timeout: Duration::from_secs(config.job_timeout_secs),
            };
            tokio::spawn(run_worker(worker_id, ctx, receiver.clone()));
        }

        tracing::info!(workers = config.workers, "import queue started");

        Self {
            sender,
            pool,
            max_attempts: config.max_attempts,
        }
    }

    /// Record a pending job and hand it to the workers
    ///
    /// Returns the job id; the import result is observable only through
    /// the `import_jobs` record.
    pub async fn enqueue(&self, job: WebhookJob) -> Result<Uuid, EnqueueError> {
        let id = Uuid::new_v4();

        records::insert_pending(&self.pool, id, &job, self.max_attempts).await?;

        self.sender
            .send(QueuedJob {
                id,
                attempts: 0,
                job,
            })
            .await
            .map_err(|_| EnqueueError::QueueClosed)?;

        Ok(id)
    }
}

struct WorkerContext {
    pool: PgPool,
    registry: Arc<ParserRegistry>,
    retry_sender: mpsc::WeakSender<QueuedJob>,
    max_attempts: u32,
    job_timeout: Duration,
}

async fn run_worker(
    worker_id: usize,
    ctx: WorkerContext,
    receiver: Arc<Mutex<mpsc::Receiver<QueuedJob>>>,
) {
    tracing::debug!(worker_id, "import worker started");

    loop {
        // Hold the lock only while waiting for the next job, never while
        // processing one.
        let next = { receiver.lock().await.recv().await };
        let Some(queued) = next else { break };
        process_job(&ctx, queued).await;
    }

    tracing::debug!(worker_id, "import worker stopped");
}

async fn process_job(ctx: &WorkerContext, queued: QueuedJob) {
    let attempt = queued.attempts + 1;
    records::mark_running(&ctx.pool, queued.id, attempt).await;

    let result = timeout(
        ctx.job_timeout,
        orchestrator::import(
            &ctx.registry,
            &ctx.pool,
            &queued.job.raw_body,
            queued.job.tenant_id,
            &queued.job.bank_type,
        ),
    )
    .await;

    match result {
        Ok(Ok(outcome)) => {
            tracing::info!(
                job_id = %queued.id,
                attempt,
                inserted = outcome.inserted,
                duplicates = outcome.duplicates,
                "import job succeeded"
            );
            records::mark_succeeded(&ctx.pool, queued.id, outcome).await;
        },
        Ok(Err(err)) if !err.is_retryable() => {
            tracing::warn!(
                job_id = %queued.id,
                attempt,
                error = %err,
                "import job failed permanently"
            );
            records::mark_failed(&ctx.pool, queued.id, attempt, &err.to_string()).await;
        },
        Ok(Err(err)) => {
            retry_or_fail(ctx, queued, attempt, err.to_string()).await;
        },
        Err(_) => {
            let error = format!(
                "attempt exceeded the {}s deadline",
                ctx.job_timeout.as_secs()
            );
            retry_or_fail(ctx, queued, attempt, error).await;
        },
    }
}

/// Redeliver a retryable failure, or fail permanently once attempts run out
async fn retry_or_fail(ctx: &WorkerContext, mut queued: QueuedJob, attempt: u32, error: String) {
    if attempt >= ctx.max_attempts {
        tracing::error!(
            job_id = %queued.id,
            attempt,
            error = %error,
            "import job exhausted its attempts"
        );
        records::mark_failed(&ctx.pool, queued.id, attempt, &error).await;
        return;
    }

    tracing::warn!(
        job_id = %queued.id,
        attempt,
        max_attempts = ctx.max_attempts,
        error = %error,
        "import job attempt failed, will retry"
    );
    records::mark_pending_retry(&ctx.pool, queued.id, attempt, &error).await;

    queued.attempts = attempt;
    let retry_sender = ctx.retry_sender.clone();
    tokio::spawn(async move {
        sleep(RETRY_DELAY).await;
        let Some(sender) = retry_sender.upgrade() else {
            tracing::error!(job_id = %queued.id, "queue shut down, dropping retry");
            return;
        };
        if sender.send(queued).await.is_err() {
            tracing::error!("queue shut down, dropping retry");
        }
    });
}

/// Status writes for the `import_jobs` table
///
/// Updates after enqueue are best-effort: a failed status write is
/// logged but must not take the worker down with it.
mod records {
    use super::*;

    pub(super) async fn insert_pending(
        pool: &PgPool,
        id: Uuid,
        job: &WebhookJob,
        max_attempts: u32,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO import_jobs (id, tenant_id, bank_type, status, attempts, max_attempts)
            VALUES ($1, $2, $3, $4, 0, $5)
            "#,
        )
        .bind(id)
        .bind(job.tenant_id)
        .bind(&job.bank_type)
        .bind(JobStatus::Pending)
        .bind(max_attempts as i32)
        .execute(pool)
        .await?;

        Ok(())
    }

    pub(super) async fn mark_running(pool: &PgPool, id: Uuid, attempt: u32) {
        let result = sqlx::query("UPDATE import_jobs SET status = $2, attempts = $3 WHERE id = $1")
            .bind(id)
            .bind(JobStatus::Running)
            .bind(attempt as i32)
            .execute(pool)
            .await;

        if let Err(e) = result {
            tracing::error!(job_id = %id, error = %e, "failed to mark job running");
        }
    }

    pub(super) async fn mark_succeeded(pool: &PgPool, id: Uuid, outcome: ImportOutcome) {
        let result = sqlx::query(
            r#"
            UPDATE import_jobs
            SET status = $2, total = $3, inserted = $4, duplicates = $5,
                last_error = NULL, finished_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(JobStatus::Succeeded)
        .bind(outcome.total as i64)
        .bind(outcome.inserted as i64)
        .bind(outcome.duplicates as i64)
        .execute(pool)
        .await;

        if let Err(e) = result {
            tracing::error!(job_id = %id, error = %e, "failed to mark job succeeded");
        }
    }

    pub(super) async fn mark_failed(pool: &PgPool, id: Uuid, attempt: u32, error: &str) {
        let result = sqlx::query(
            r#"
            UPDATE import_jobs
            SET status = $2, attempts = $3, last_error = $4, finished_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(JobStatus::Failed)
        .bind(attempt as i32)
        .bind(error)
        .execute(pool)
        .await;

        if let Err(e) = result {
            tracing::error!(job_id = %id, error = %e, "failed to mark job failed");
        }
    }

    pub(super) async fn mark_pending_retry(pool: &PgPool, id: Uuid, attempt: u32, error: &str) {
        let result = sqlx::query(
            "UPDATE import_jobs SET status = $2, attempts = $3, last_error = $4 WHERE id = $1",
        )
        .bind(id)
        .bind(JobStatus::Pending)
        .bind(attempt as i32)
        .bind(error)
        .execute(pool)
        .await;

        if let Err(e) = result {
            tracing::error!(job_id = %id, error = %e, "failed to mark job for retry");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::models::ImportJobRecord;

    fn test_config() -> ImportConfig {
        ImportConfig {
            workers: 2,
            max_attempts: 3,
            job_timeout_secs: 30,
            queue_capacity: 64,
        }
    }

    fn start_queue(pool: &PgPool, config: &ImportConfig) -> JobQueue {
        JobQueue::start(
            config,
            pool.clone(),
            Arc::new(ParserRegistry::with_default_banks()),
        )
    }

    async fn wait_for_terminal(pool: &PgPool, id: Uuid) -> ImportJobRecord {
        for _ in 0..200 {
            let record: ImportJobRecord =
                sqlx::query_as("SELECT * FROM import_jobs WHERE id = $1")
                    .bind(id)
                    .fetch_one(pool)
                    .await
                    .unwrap();
            if record.is_terminal() {
                return record;
            }
            sleep(Duration::from_millis(50)).await;
        }
        panic!("job {id} never reached a terminal state");
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_successful_job_records_outcome(pool: PgPool) {
        let queue = start_queue(&pool, &test_config());

        let id = queue
            .enqueue(WebhookJob::new("156,50//REF001//20250615", 1, "acme"))
            .await
            .unwrap();

        let record = wait_for_terminal(&pool, id).await;
        assert_eq!(record.status, JobStatus::Succeeded);
        assert_eq!(record.attempts, 1);
        assert_eq!(record.total, Some(1));
        assert_eq!(record.inserted, Some(1));
        assert_eq!(record.duplicates, Some(0));
        assert!(record.finished_at.is_some());
        assert!(record.last_error.is_none());
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_malformed_payload_fails_on_first_attempt(pool: PgPool) {
        let queue = start_queue(&pool, &test_config());

        let id = queue
            .enqueue(WebhookJob::new("not a transaction", 1, "acme"))
            .await
            .unwrap();

        let record = wait_for_terminal(&pool, id).await;
        assert_eq!(record.status, JobStatus::Failed);
        assert_eq!(record.attempts, 1);
        assert!(record.last_error.unwrap().contains("line 1"));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_unknown_bank_fails_on_first_attempt(pool: PgPool) {
        let queue = start_queue(&pool, &test_config());

        let id = queue
            .enqueue(WebhookJob::new("156,50//REF001//20250615", 1, "sandbox"))
            .await
            .unwrap();

        let record = wait_for_terminal(&pool, id).await;
        assert_eq!(record.status, JobStatus::Failed);
        assert_eq!(record.attempts, 1);
        assert!(record.last_error.unwrap().contains("sandbox"));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_redelivered_payload_counts_duplicates(pool: PgPool) {
        let queue = start_queue(&pool, &test_config());
        let body = "20250615156,50#202506159000001#note/debt payment";

        let first = queue
            .enqueue(WebhookJob::new(body, 1, "foodics"))
            .await
            .unwrap();
        let first_record = wait_for_terminal(&pool, first).await;
        assert_eq!(first_record.inserted, Some(1));

        let second = queue
            .enqueue(WebhookJob::new(body, 1, "foodics"))
            .await
            .unwrap();
        let second_record = wait_for_terminal(&pool, second).await;

        assert_eq!(second_record.status, JobStatus::Succeeded);
        assert_eq!(second_record.total, Some(1));
        assert_eq!(second_record.inserted, Some(0));
        assert_eq!(second_record.duplicates, Some(1));

        let stored: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM transactions")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(stored, 1);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_retryable_failure_exhausts_attempts(pool: PgPool) {
        let config = ImportConfig {
            max_attempts: 2,
            ..test_config()
        };
        let queue = start_queue(&pool, &config);

        // Make every insert fail with a non-duplicate storage error
        // while leaving the job table intact.
        sqlx::query("ALTER TABLE transactions RENAME TO transactions_unavailable")
            .execute(&pool)
            .await
            .unwrap();

        let id = queue
            .enqueue(WebhookJob::new("156,50//REF001//20250615", 1, "acme"))
            .await
            .unwrap();

        let record = wait_for_terminal(&pool, id).await;
        assert_eq!(record.status, JobStatus::Failed);
        assert_eq!(record.attempts, 2);
        assert!(record.attempts_exhausted());
        assert!(record.last_error.is_some());
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_large_batch_completes_within_deadline(pool: PgPool) {
        let queue = start_queue(&pool, &test_config());

        let body = (1..=1000)
            .map(|i| format!("20250615{},{:02}#REF{:06}#note/transaction {}", i, i % 100, i, i))
            .collect::<Vec<_>>()
            .join("\n");

        let id = queue
            .enqueue(WebhookJob::new(body, 1, "foodics"))
            .await
            .unwrap();

        let record = wait_for_terminal(&pool, id).await;
        assert_eq!(record.status, JobStatus::Succeeded);
        assert_eq!(record.total, Some(1000));
        assert_eq!(record.inserted, Some(1000));
    }
}
