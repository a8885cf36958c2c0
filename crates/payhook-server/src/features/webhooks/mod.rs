//! Webhook ingress feature
//!
//! Accepts raw bank payloads and enqueues them for asynchronous import.

pub mod commands;
pub mod routes;

pub use routes::webhook_routes;
