//! Status vocabularies and validation for the connection workflow.
//!
//! All statuses are stored as lowercase strings; these constants and
//! validators are shared by the DB and API layers so the vocabulary
//! lives in exactly one place.

// ---------------------------------------------------------------------------
// Connection request statuses
// ---------------------------------------------------------------------------

/// Request awaiting the target's decision. The only status `create` may set.
pub const REQUEST_PENDING: &str = "pending";

/// Request explicitly approved by the target; a Contact exists.
pub const REQUEST_APPROVED: &str = "approved";

/// Request explicitly declined by the target; no Contact exists.
pub const REQUEST_DECLINED: &str = "declined";

/// All valid connection request statuses.
pub const REQUEST_STATUSES: &[&str] = &[REQUEST_PENDING, REQUEST_APPROVED, REQUEST_DECLINED];

// ---------------------------------------------------------------------------
// Connection memory statuses
// ---------------------------------------------------------------------------

/// Memory created at scan time, counterpart not yet identified.
pub const MEMORY_PENDING: &str = "pending";

/// Counterpart identified; first-meeting context is complete.
pub const MEMORY_CONNECTED: &str = "connected";

/// Counterpart declined the connection.
pub const MEMORY_DECLINED: &str = "declined";

// ---------------------------------------------------------------------------
// Email invitation statuses
// ---------------------------------------------------------------------------

/// Invitation dispatched, not yet acted on.
pub const INVITATION_SENT: &str = "sent";

/// Registration page viewed with a valid token pair.
pub const INVITATION_OPENED: &str = "opened";

/// Terminal success: the recipient registered.
pub const INVITATION_REGISTERED: &str = "registered";

/// Terminal failure: the 7-day window elapsed.
pub const INVITATION_EXPIRED: &str = "expired";

/// Statuses from which an invitation may still be redeemed.
pub const INVITATION_REDEEMABLE: &[&str] = &[INVITATION_SENT, INVITATION_OPENED];

// ---------------------------------------------------------------------------
// First-meeting methods
// ---------------------------------------------------------------------------

/// Counterpart scanned a QR connection code.
pub const METHOD_QR_SCAN: &str = "qr_scan";

/// Connection proposed manually in the app.
pub const METHOD_MANUAL: &str = "manual";

/// Connection bootstrapped through an email invitation.
pub const METHOD_EMAIL_INVITATION: &str = "email_invitation";

/// All valid first-meeting methods.
pub const MEETING_METHODS: &[&str] = &[METHOD_QR_SCAN, METHOD_MANUAL, METHOD_EMAIL_INVITATION];

// ---------------------------------------------------------------------------
// Notification kinds
// ---------------------------------------------------------------------------

/// The target approved a connection request.
pub const NOTIFY_CONNECTION_ACCEPTED: &str = "connection_accepted";

/// An invited recipient completed registration.
pub const NOTIFY_INVITATION_REGISTERED: &str = "invitation_registered";

// ---------------------------------------------------------------------------
// Tiers
// ---------------------------------------------------------------------------

/// Closeness tiers assignable at approval time: 1=inner, 2=middle, 3=outer.
pub const TIER_MIN: i16 = 1;
pub const TIER_MAX: i16 = 3;

/// Validate a first-meeting method string.
pub fn validate_method(method: &str) -> Result<(), String> {
    if MEETING_METHODS.contains(&method) {
        Ok(())
    } else {
        Err(format!(
            "Invalid meeting method '{method}'. Must be one of: {}",
            MEETING_METHODS.join(", ")
        ))
    }
}

/// Validate a contact tier.
pub fn validate_tier(tier: i16) -> Result<(), String> {
    if (TIER_MIN..=TIER_MAX).contains(&tier) {
        Ok(())
    } else {
        Err(format!(
            "Invalid tier {tier}. Must be between {TIER_MIN} and {TIER_MAX}"
        ))
    }
}

/// Whether an invitation status is terminal (never reopened).
pub fn invitation_is_terminal(status: &str) -> bool {
    status == INVITATION_REGISTERED || status == INVITATION_EXPIRED
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_methods_accepted() {
        assert!(validate_method(METHOD_QR_SCAN).is_ok());
        assert!(validate_method(METHOD_MANUAL).is_ok());
        assert!(validate_method(METHOD_EMAIL_INVITATION).is_ok());
    }

    #[test]
    fn test_invalid_method_rejected() {
        let result = validate_method("telepathy");
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Invalid meeting method"));
    }

    #[test]
    fn test_tier_bounds() {
        assert!(validate_tier(1).is_ok());
        assert!(validate_tier(2).is_ok());
        assert!(validate_tier(3).is_ok());
        assert!(validate_tier(0).is_err());
        assert!(validate_tier(4).is_err());
    }

    #[test]
    fn test_terminal_invitation_statuses() {
        assert!(invitation_is_terminal(INVITATION_REGISTERED));
        assert!(invitation_is_terminal(INVITATION_EXPIRED));
        assert!(!invitation_is_terminal(INVITATION_SENT));
        assert!(!invitation_is_terminal(INVITATION_OPENED));
    }

    #[test]
    fn test_redeemable_excludes_terminal() {
        for status in INVITATION_REDEEMABLE {
            assert!(!invitation_is_terminal(status));
        }
    }

    #[test]
    fn test_request_statuses_contains_all_three() {
        assert_eq!(REQUEST_STATUSES.len(), 3);
        assert!(REQUEST_STATUSES.contains(&"pending"));
        assert!(REQUEST_STATUSES.contains(&"approved"));
        assert!(REQUEST_STATUSES.contains(&"declined"));
    }
}
