//! Shared feature utilities

pub mod validation;
