//! Workflow services behind the HTTP handlers.
//!
//! Each service is an explicit object over injected dependencies (pool,
//! clock, outbound clients) rather than a module-level singleton, so
//! tests can construct them with fakes.

pub mod geocode;
pub mod invitation;
pub mod mailer;
pub mod notify;
pub mod scan;
