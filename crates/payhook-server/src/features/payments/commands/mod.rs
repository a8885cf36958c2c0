//! Payment commands

pub mod build_transfer;

pub use build_transfer::{BuildTransferCommand, BuildTransferError};
