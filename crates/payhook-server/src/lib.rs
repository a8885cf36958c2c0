//! Payhook Server Library
//!
//! HTTP server that ingests bank payment-notification webhooks and
//! imports them as canonical transaction records.
//!
//! # Overview
//!
//! - **Webhook ingress**: accepts raw, line-oriented bank payloads and
//!   acknowledges immediately; the import itself runs asynchronously.
//! - **Format parsers**: one stateless parser per bank grammar, selected
//!   through an immutable registry built at startup.
//! - **Idempotent persistence**: bulk insert with duplicate absorption,
//!   so redelivered payloads never create duplicate financial records.
//! - **Job queue**: in-process workers with bounded retries and a
//!   per-job deadline; every terminal outcome is recorded in the
//!   `import_jobs` table.
//! - **Payment documents**: builds outbound payment-instruction XML from
//!   validated transfer requests.
//!
//! # Architecture
//!
//! HTTP features follow a vertical-slice layout (`features/`), each with
//! its own commands, queries, and routes. The import pipeline itself
//! lives in `import/` and is independent of the HTTP layer: the webhook
//! route only enqueues a self-contained job payload.
//!
//! ## Framework Stack
//!
//! - **Axum**: HTTP routing and extraction
//! - **SQLx**: PostgreSQL access and migrations
//! - **Tokio**: async runtime and the worker queue

pub mod config;
pub mod error;
pub mod features;
pub mod import;
pub mod middleware;
pub mod parsers;

// Re-export commonly used types
pub use error::{AppError, AppResult};
