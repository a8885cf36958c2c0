//! Asynchronous webhook import pipeline
//!
//! Turns a raw bank payload into persisted transaction records, outside
//! the request path:
//!
//! - **models**: normalized and stored transaction shapes, job records
//! - **persister**: idempotent bulk insert with duplicate absorption
//! - **orchestrator**: parser selection + parse + persist in one call
//! - **jobs**: the self-contained job payload carried through the queue
//! - **queue**: in-process worker pool with bounded retries and a
//!   per-attempt deadline
//!
//! The pipeline guarantees that re-importing an already-imported payload
//! is a safe no-op, and that a payload is either fully parsed or not
//! imported at all.

pub mod error;
pub mod jobs;
pub mod models;
pub mod orchestrator;
pub mod persister;
pub mod queue;

pub use error::{ImportError, PersistenceError};
pub use jobs::WebhookJob;
pub use models::{
    ImportJobRecord, ImportOutcome, JobStatus, NormalizedTransaction, StoredTransaction,
};
pub use queue::{EnqueueError, JobQueue};
