//! Payments feature
//!
//! Builds outbound payment-instruction XML documents from validated
//! transfer requests. Nothing here touches storage.

pub mod commands;
pub mod routes;

pub use routes::payments_routes;
