//! Webhook commands

pub mod enqueue_import;

pub use enqueue_import::{EnqueueImportCommand, EnqueueImportError, EnqueueImportResponse};
