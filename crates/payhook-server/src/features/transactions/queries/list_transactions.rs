//! List transactions query
//!
//! Filterable, paginated listing of imported transactions.

use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::import::StoredTransaction;

const DEFAULT_LIMIT: i64 = 100;
const MAX_LIMIT: i64 = 1000;

/// Query to list imported transactions
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListTransactionsQuery {
    /// Filter by owning tenant
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<i64>,
    /// Filter by canonical bank token (e.g. "acme")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_type: Option<String>,
    /// Limit number of results
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
    /// Offset for pagination
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
}

/// Response for list transactions query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListTransactionsResponse {
    pub transactions: Vec<StoredTransaction>,
    pub total: i64,
}

/// Error type for list transactions query
#[derive(Debug, thiserror::Error)]
pub enum ListTransactionsError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, query: &ListTransactionsQuery) {
    if let Some(tenant_id) = query.tenant_id {
        builder.push(" AND tenant_id = ").push_bind(tenant_id);
    }
    if let Some(ref bank_type) = query.bank_type {
        builder
            .push(" AND bank_type = ")
            .push_bind(bank_type.to_lowercase());
    }
}

pub async fn handle(
    pool: PgPool,
    query: ListTransactionsQuery,
) -> Result<ListTransactionsResponse, ListTransactionsError> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let offset = query.offset.unwrap_or(0).max(0);

    let mut list_builder: QueryBuilder<Postgres> = QueryBuilder::new(
        "SELECT id, reference, tenant_id, amount, transaction_date, bank_type, \
         metadata, created_at, updated_at FROM transactions WHERE 1=1",
    );
    push_filters(&mut list_builder, &query);
    list_builder.push(" ORDER BY transaction_date DESC, id DESC");
    list_builder.push(" LIMIT ").push_bind(limit);
    list_builder.push(" OFFSET ").push_bind(offset);

    let transactions = list_builder
        .build_query_as::<StoredTransaction>()
        .fetch_all(&pool)
        .await?;

    let mut count_builder: QueryBuilder<Postgres> =
        QueryBuilder::new("SELECT COUNT(*) FROM transactions WHERE 1=1");
    push_filters(&mut count_builder, &query);

    let total: i64 = count_builder
        .build_query_scalar()
        .fetch_one(&pool)
        .await?;

    Ok(ListTransactionsResponse {
        transactions,
        total,
    })
}
