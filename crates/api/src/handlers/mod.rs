//! HTTP request handlers, one module per resource.

pub mod codes;
pub mod contacts;
pub mod invitations;
pub mod notifications;
pub mod requests;
pub mod scan;
