//! Shared response envelope types for API handlers.
//!
//! All API responses use a `{ "data": ... }` envelope. Read/validate
//! endpoints signal "nothing matched" as `{ "data": null }` rather than
//! an error status, so clients branch on the absence of a value.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
