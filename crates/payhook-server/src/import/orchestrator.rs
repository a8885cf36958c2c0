//! Import orchestrator
//!
//! Composes the parser registry and the bulk persister into a single
//! import operation. Errors from either stage propagate unmodified;
//! retry policy is decided by the job queue, never here.

use sqlx::PgPool;

use super::error::ImportError;
use super::models::ImportOutcome;
use super::persister;
use crate::parsers::ParserRegistry;

/// Parse a raw webhook body and persist the resulting batch
///
/// Returns the per-invocation [`ImportOutcome`]; `duplicates` counts
/// records whose reference was already stored, which is an expected
/// result of redelivery, not a failure.
#[tracing::instrument(skip(registry, pool, raw_body), fields(body_bytes = raw_body.len()))]
pub async fn import(
    registry: &ParserRegistry,
    pool: &PgPool,
    raw_body: &str,
    tenant_id: i64,
    bank_type: &str,
) -> Result<ImportOutcome, ImportError> {
    let parser = registry.resolve(bank_type)?;
    let records = parser.parse(raw_body)?;

    let total = records.len() as u64;
    let inserted = persister::bulk_insert(pool, &records, tenant_id, bank_type).await?;

    let outcome = ImportOutcome::new(total, inserted);
    tracing::info!(
        tenant_id,
        bank_type,
        total = outcome.total,
        inserted = outcome.inserted,
        duplicates = outcome.duplicates,
        "import completed"
    );

    Ok(outcome)
}
