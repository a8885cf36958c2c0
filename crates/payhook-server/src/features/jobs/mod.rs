//! Import jobs feature
//!
//! Read-only operator access to import job records. Jobs are created by
//! the webhook ingress and never triggered from here.

pub mod queries;
pub mod routes;

pub use routes::jobs_routes;
