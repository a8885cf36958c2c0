//! Transaction routes
//!
//! Public read-only routes over imported transactions.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use sqlx::PgPool;

use super::queries::{
    get_transaction::handle as handle_get_transaction,
    list_transactions::handle as handle_list_transactions, GetTransactionError,
    GetTransactionQuery, ListTransactionsError, ListTransactionsQuery,
};
use crate::error::{AppError, AppResult};

/// Create transaction routes
pub fn transactions_routes() -> Router<PgPool> {
    Router::new()
        .route("/", get(list_transactions))
        .route("/:reference", get(get_transaction))
}

/// List imported transactions
///
/// GET /transactions?tenant_id=1&bank_type=acme&limit=100&offset=0
async fn list_transactions(
    State(db): State<PgPool>,
    Query(query): Query<ListTransactionsQuery>,
) -> AppResult<Response> {
    let response = handle_list_transactions(db, query).await.map_err(|e| {
        let ListTransactionsError::Database(e) = e;
        AppError::Database(e)
    })?;

    Ok((StatusCode::OK, Json(json!(response))).into_response())
}

/// Get one transaction by its bank reference
///
/// GET /transactions/:reference
async fn get_transaction(
    State(db): State<PgPool>,
    Path(reference): Path<String>,
) -> AppResult<Response> {
    let transaction = handle_get_transaction(db, GetTransactionQuery { reference })
        .await
        .map_err(|e| match e {
            GetTransactionError::NotFound(reference) => {
                AppError::NotFound(format!("transaction {reference:?} not found"))
            },
            GetTransactionError::Database(e) => AppError::Database(e),
        })?;

    Ok((StatusCode::OK, Json(json!(transaction))).into_response())
}
