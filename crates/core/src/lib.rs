//! Pure domain logic for the Knect connection workflow.
//!
//! This crate has no I/O and no internal dependencies so it can be used
//! by the repository layer, the API server, and any future CLI tooling.

pub mod clock;
pub mod codes;
pub mod connection;
pub mod error;
pub mod privacy;
pub mod types;
