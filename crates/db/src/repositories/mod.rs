//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` (or a transaction executor) as the first
//! argument. Multi-step writes that must land together or not at all
//! (invitation registration, request approval) own their transaction
//! here so callers cannot half-complete them.

pub mod connection_code_repo;
pub mod connection_memory_repo;
pub mod connection_request_repo;
pub mod contact_repo;
pub mod email_invitation_repo;
pub mod notification_repo;
pub mod scan_event_repo;
pub mod user_repo;

pub use connection_code_repo::ConnectionCodeRepo;
pub use connection_memory_repo::ConnectionMemoryRepo;
pub use connection_request_repo::ConnectionRequestRepo;
pub use contact_repo::ContactRepo;
pub use email_invitation_repo::EmailInvitationRepo;
pub use notification_repo::NotificationRepo;
pub use scan_event_repo::ScanEventRepo;
pub use user_repo::UserRepo;
