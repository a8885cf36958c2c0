//! Payhook Common Library
//!
//! Shared error handling and logging bootstrap for the Payhook workspace.
//!
//! # Overview
//!
//! This crate provides functionality used across all Payhook workspace members:
//!
//! - **Error Handling**: The [`PayhookError`] type and [`Result`] alias
//! - **Logging**: Environment-driven `tracing` subscriber initialization
//!
//! # Example
//!
//! ```no_run
//! use payhook_common::logging::{init_logging, LogConfig};
//!
//! fn main() -> payhook_common::Result<()> {
//!     let config = LogConfig::from_env()?;
//!     init_logging(&config)?;
//!     tracing::info!("started");
//!     Ok(())
//! }
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod error;
pub mod logging;

// Re-export commonly used types
pub use error::{PayhookError, Result};
