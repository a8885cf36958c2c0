//! Idempotent bulk persister
//!
//! Persists a parsed batch inside one transactional scope. Each record
//! is attempted individually; a record whose reference already exists is
//! an expected duplicate and is skipped, while any other storage error
//! aborts and rolls back the whole batch.
//!
//! The uniqueness constraint on `reference` is the sole arbiter under
//! concurrency: when two workers race on the same reference, exactly one
//! insert wins and the other observes a duplicate.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};

use super::error::PersistenceError;
use super::models::NormalizedTransaction;

/// Outcome of a single insert attempt within a batch
///
/// Fatal outcomes are expressed as the `Err` branch of the attempt so
/// they short-circuit the fold over the batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    Duplicate,
}

// `ON CONFLICT DO NOTHING` keeps the surrounding transaction usable
// after a duplicate, which a raised uniqueness error would not; zero
// affected rows is the typed duplicate signal.
const INSERT_TRANSACTION: &str = r#"
INSERT INTO transactions
    (reference, tenant_id, amount, transaction_date, bank_type, metadata, created_at, updated_at)
VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
ON CONFLICT (reference) DO NOTHING
"#;

/// Attempt to insert one record inside the batch's transaction
async fn insert_one(
    tx: &mut Transaction<'_, Postgres>,
    record: &NormalizedTransaction,
    tenant_id: i64,
    bank_type: &str,
    now: DateTime<Utc>,
) -> Result<InsertOutcome, PersistenceError> {
    let result = sqlx::query(INSERT_TRANSACTION)
        .bind(&record.reference)
        .bind(tenant_id)
        .bind(record.amount)
        .bind(record.transaction_date)
        .bind(bank_type)
        .bind(sqlx::types::Json(&record.metadata))
        .bind(now)
        .execute(&mut **tx)
        .await?;

    if result.rows_affected() == 0 {
        Ok(InsertOutcome::Duplicate)
    } else {
        Ok(InsertOutcome::Inserted)
    }
}

/// Persist a batch of normalized records, skipping duplicates
///
/// Returns the number of newly inserted records. Empty input returns 0
/// without opening a transaction. A non-duplicate storage error rolls
/// back every insert of the batch and propagates as
/// [`PersistenceError`].
#[tracing::instrument(skip(pool, records), fields(batch_size = records.len()))]
pub async fn bulk_insert(
    pool: &PgPool,
    records: &[NormalizedTransaction],
    tenant_id: i64,
    bank_type: &str,
) -> Result<u64, PersistenceError> {
    if records.is_empty() {
        return Ok(0);
    }

    let bank_type = bank_type.to_lowercase();
    let now = Utc::now();

    let mut tx = pool.begin().await?;
    let mut inserted = 0u64;

    for record in records {
        match insert_one(&mut tx, record, tenant_id, &bank_type, now).await {
            Ok(InsertOutcome::Inserted) => inserted += 1,
            Ok(InsertOutcome::Duplicate) => {
                tracing::debug!(reference = %record.reference, "skipping duplicate reference");
            },
            Err(e) => {
                tx.rollback().await.ok();
                return Err(e);
            },
        }
    }

    tx.commit().await?;

    Ok(inserted)
}

/// Check whether a reference has already been stored
pub async fn reference_exists(pool: &PgPool, reference: &str) -> Result<bool, PersistenceError> {
    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM transactions WHERE reference = $1)")
            .bind(reference)
            .fetch_one(pool)
            .await?;

    Ok(exists)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    fn record(reference: &str, amount: Decimal) -> NormalizedTransaction {
        NormalizedTransaction {
            reference: reference.to_string(),
            amount,
            transaction_date: NaiveDate::from_ymd_opt(2025, 6, 15).unwrap(),
            metadata: HashMap::new(),
        }
    }

    async fn count_transactions(pool: &PgPool) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM transactions")
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_empty_batch_inserts_nothing(pool: PgPool) {
        let inserted = bulk_insert(&pool, &[], 1, "acme").await.unwrap();
        assert_eq!(inserted, 0);
        assert_eq!(count_transactions(&pool).await, 0);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_inserts_whole_batch(pool: PgPool) {
        let records = vec![
            record("REF001", dec!(100.00)),
            record("REF002", dec!(200.50)),
        ];

        let inserted = bulk_insert(&pool, &records, 1, "acme").await.unwrap();
        assert_eq!(inserted, 2);
        assert_eq!(count_transactions(&pool).await, 2);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_reimport_is_a_noop(pool: PgPool) {
        let records = vec![
            record("REF001", dec!(100.00)),
            record("REF002", dec!(200.50)),
        ];

        let first = bulk_insert(&pool, &records, 1, "foodics").await.unwrap();
        let second = bulk_insert(&pool, &records, 1, "foodics").await.unwrap();

        assert_eq!(first, 2);
        assert_eq!(second, 0);
        assert_eq!(count_transactions(&pool).await, 2);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_duplicates_inside_one_batch_are_skipped(pool: PgPool) {
        let records = vec![
            record("REF001", dec!(100.00)),
            record("REF001", dec!(100.00)),
            record("REF002", dec!(50.25)),
        ];

        let inserted = bulk_insert(&pool, &records, 1, "acme").await.unwrap();
        assert_eq!(inserted, 2);
        assert_eq!(count_transactions(&pool).await, 2);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_duplicate_collision_is_global_across_tenants(pool: PgPool) {
        let records = vec![record("REF001", dec!(100.00))];

        let first = bulk_insert(&pool, &records, 1, "acme").await.unwrap();
        let second = bulk_insert(&pool, &records, 2, "foodics").await.unwrap();

        assert_eq!(first, 1);
        assert_eq!(second, 0);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_fatal_error_rolls_back_whole_batch(pool: PgPool) {
        // NUMERIC(15,2) overflows on this amount; the batch must not
        // partially commit.
        let records = vec![
            record("REF001", dec!(100.00)),
            record("REF002", Decimal::from(10_000_000_000_000_000i64)),
        ];

        let result = bulk_insert(&pool, &records, 1, "acme").await;
        assert!(result.is_err());
        assert_eq!(count_transactions(&pool).await, 0);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_bank_type_is_stored_lowercase(pool: PgPool) {
        bulk_insert(&pool, &[record("REF001", dec!(1.00))], 1, "Acme")
            .await
            .unwrap();

        let stored: String = sqlx::query_scalar("SELECT bank_type FROM transactions")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(stored, "acme");
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_concurrent_batches_with_shared_reference(pool: PgPool) {
        // Two workers racing on the same reference: the uniqueness
        // constraint must let exactly one insert win.
        let batch_a = vec![record("SHARED", dec!(10.00)), record("A-ONLY", dec!(1.00))];
        let batch_b = vec![record("SHARED", dec!(10.00)), record("B-ONLY", dec!(2.00))];

        let (a, b) = tokio::join!(
            bulk_insert(&pool, &batch_a, 1, "acme"),
            bulk_insert(&pool, &batch_b, 1, "acme"),
        );

        assert_eq!(a.unwrap() + b.unwrap(), 3);
        let shared_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM transactions WHERE reference = 'SHARED'")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(shared_count, 1);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_reference_exists(pool: PgPool) {
        assert!(!reference_exists(&pool, "REF001").await.unwrap());

        bulk_insert(&pool, &[record("REF001", dec!(1.00))], 1, "acme")
            .await
            .unwrap();

        assert!(reference_exists(&pool, "REF001").await.unwrap());
        assert!(!reference_exists(&pool, "REF002").await.unwrap());
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_metadata_round_trips_through_storage(pool: PgPool) {
        let mut metadata = HashMap::new();
        metadata.insert("note".to_string(), "debt payment".to_string());

        let records = vec![NormalizedTransaction {
            reference: "REF001".to_string(),
            amount: dec!(156.50),
            transaction_date: NaiveDate::from_ymd_opt(2025, 6, 15).unwrap(),
            metadata,
        }];

        bulk_insert(&pool, &records, 1, "foodics").await.unwrap();

        let stored: sqlx::types::Json<HashMap<String, String>> =
            sqlx::query_scalar("SELECT metadata FROM transactions WHERE reference = 'REF001'")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(stored.0.get("note").map(String::as_str), Some("debt payment"));
    }
}
