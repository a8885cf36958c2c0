//! Transactions feature
//!
//! Read-only access to imported transaction records.

pub mod queries;
pub mod routes;

pub use routes::transactions_routes;
