//! Authentication primitives: JWT configuration and token helpers.
//!
//! Session issuance and refresh live in the identity service; this crate
//! only validates Bearer tokens it is handed.

pub mod jwt;
