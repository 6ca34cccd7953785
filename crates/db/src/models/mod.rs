//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - `Deserialize` DTOs for the inserts/updates that table supports

pub mod connection_code;
pub mod connection_memory;
pub mod connection_request;
pub mod contact;
pub mod email_invitation;
pub mod notification;
pub mod scan_event;
pub mod user;
