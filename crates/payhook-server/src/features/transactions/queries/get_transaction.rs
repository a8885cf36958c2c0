//! Get transaction query
//!
//! Looks up a single transaction by its bank reference. References are
//! globally unique, so no tenant scoping is needed here.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::import::StoredTransaction;

/// Query to fetch one transaction by reference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetTransactionQuery {
    pub reference: String,
}

/// Error type for get transaction query
#[derive(Debug, thiserror::Error)]
pub enum GetTransactionError {
    #[error("transaction {0:?} not found")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub async fn handle(
    pool: PgPool,
    query: GetTransactionQuery,
) -> Result<StoredTransaction, GetTransactionError> {
    let transaction: Option<StoredTransaction> = sqlx::query_as(
        "SELECT id, reference, tenant_id, amount, transaction_date, bank_type, \
         metadata, created_at, updated_at FROM transactions WHERE reference = $1",
    )
    .bind(&query.reference)
    .fetch_optional(&pool)
    .await?;

    transaction.ok_or(GetTransactionError::NotFound(query.reference))
}
