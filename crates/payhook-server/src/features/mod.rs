//! Feature modules implementing the payhook API
//!
//! Each feature is a vertical slice with its own commands, queries, and
//! routes.
//!
//! # Features
//!
//! - **webhooks**: bank payment-notification ingress; enqueues import jobs
//! - **transactions**: read access to imported transaction records
//! - **jobs**: read access to import job status for operators
//! - **payments**: outbound payment-instruction XML generation
//!
//! # Architecture
//!
//! Each feature module follows the structure:
//! - `commands/` - Write operations
//! - `queries/` - Read operations
//! - `routes.rs` - HTTP route definitions
//!
//! Handlers stay thin: they extract, delegate to a command or query
//! `handle` function, and map its error to a status code.

pub mod jobs;
pub mod payments;
pub mod shared;
pub mod transactions;
pub mod webhooks;

use axum::Router;

use crate::import::JobQueue;

/// Shared state for all feature routes
#[derive(Clone)]
pub struct FeatureState {
    /// PostgreSQL connection pool for read queries
    pub db: sqlx::PgPool,
    /// Handle for enqueuing webhook import jobs
    pub queue: JobQueue,
}

/// Creates the main API router with all feature routes mounted
///
/// - `/webhooks` - Bank webhook ingress
/// - `/transactions` - Imported transaction queries
/// - `/import-jobs` - Import job status queries
/// - `/payments` - Payment XML generation
pub fn router(state: FeatureState) -> Router<()> {
    Router::new()
        .nest("/webhooks", webhooks::webhook_routes().with_state(state.queue.clone()))
        .nest(
            "/transactions",
            transactions::transactions_routes().with_state(state.db.clone()),
        )
        .nest("/import-jobs", jobs::jobs_routes().with_state(state.db.clone()))
        .nest("/payments", payments::payments_routes())
}
