//! Code, token, and session-id minting plus scan-payload extraction.
//!
//! Connection codes and invitation tokens are shareable strings, so they
//! use a readable `{prefix}_{unix_millis}_{random}` shape rather than a
//! bare UUID. Row-level identifiers that never leave the server use
//! UUID v7.

use rand::Rng;

use crate::clock::Clock;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Prefix for QR connection codes (the shareable "connect with me" token).
pub const CONNECTION_CODE_PREFIX: &str = "conn";

/// Prefix for invitation-namespace codes. Deliberately distinct from
/// [`CONNECTION_CODE_PREFIX`] so an emailed invitation token can never be
/// replayed as a reusable profile-scan code.
pub const INVITATION_CODE_PREFIX: &str = "invc";

/// Prefix for invitation row identifiers embedded in registration URLs.
pub const INVITATION_ID_PREFIX: &str = "inv";

/// Prefix for scan event identifiers.
pub const SCAN_ID_PREFIX: &str = "scan";

/// Prefix for browsing-session identifiers.
pub const SESSION_ID_PREFIX: &str = "sess";

/// Length of the random alphanumeric suffix on minted tokens.
pub const TOKEN_SUFFIX_LENGTH: usize = 9;

/// Connection codes live for 24 hours from generation.
pub const CONNECTION_CODE_TTL_HOURS: i64 = 24;

/// Email invitations live for 7 days from dispatch.
pub const INVITATION_TTL_DAYS: i64 = 7;

// ---------------------------------------------------------------------------
// Minting
// ---------------------------------------------------------------------------

/// Mint a token of the form `{prefix}_{unix_millis}_{random}`.
///
/// The millisecond timestamp makes collisions need both the same
/// millisecond and the same 9-character random suffix; the database
/// additionally enforces uniqueness on every token column.
fn mint_token(prefix: &str, clock: &dyn Clock) -> String {
    let suffix: String = rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .take(TOKEN_SUFFIX_LENGTH)
        .map(char::from)
        .collect();
    format!(
        "{prefix}_{}_{}",
        clock.now().timestamp_millis(),
        suffix.to_ascii_lowercase()
    )
}

/// Mint a shareable QR connection code (`conn_...`).
pub fn mint_connection_code(clock: &dyn Clock) -> String {
    mint_token(CONNECTION_CODE_PREFIX, clock)
}

/// Mint an invitation-namespace code (`invc_...`).
pub fn mint_invitation_code(clock: &dyn Clock) -> String {
    mint_token(INVITATION_CODE_PREFIX, clock)
}

/// Mint an invitation identifier (`inv_...`).
pub fn mint_invitation_id(clock: &dyn Clock) -> String {
    mint_token(INVITATION_ID_PREFIX, clock)
}

/// Mint a scan event identifier (`scan_...`).
pub fn mint_scan_id(clock: &dyn Clock) -> String {
    mint_token(SCAN_ID_PREFIX, clock)
}

/// Mint a browsing-session identifier (`sess_...`).
///
/// Session ids are stable per browsing session: the client echoes the id
/// back on subsequent scans and a fresh one is minted only when none is
/// supplied.
pub fn mint_session_id(clock: &dyn Clock) -> String {
    mint_token(SESSION_ID_PREFIX, clock)
}

// ---------------------------------------------------------------------------
// Expiry
// ---------------------------------------------------------------------------

/// Expiry instant for a connection code generated at `now`.
pub fn connection_code_expiry(now: Timestamp) -> Timestamp {
    now + chrono::Duration::hours(CONNECTION_CODE_TTL_HOURS)
}

/// Expiry instant for an email invitation dispatched at `now`.
pub fn invitation_expiry(now: Timestamp) -> Timestamp {
    now + chrono::Duration::days(INVITATION_TTL_DAYS)
}

/// Whether a code row may still resolve to a profile view.
///
/// Inactive codes and codes at or past their expiry never resolve.
pub fn code_is_usable(is_active: bool, expires_at: Timestamp, now: Timestamp) -> bool {
    is_active && now < expires_at
}

// ---------------------------------------------------------------------------
// URL building
// ---------------------------------------------------------------------------

/// Canonical scan URL embedded in the QR image.
pub fn scan_url(origin: &str, scan_id: &str, code: &str) -> String {
    format!("{}/scan/{scan_id}?code={code}", origin.trim_end_matches('/'))
}

/// Registration URL embedded in an invitation email. Carries both tokens;
/// completing registration requires presenting the exact pair.
pub fn registration_url(origin: &str, invitation_id: &str, code: &str) -> String {
    format!(
        "{}/app/register?invitation={invitation_id}&code={code}",
        origin.trim_end_matches('/')
    )
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// Extract a connection code from whatever a scanner hands us.
///
/// Accepted shapes, in precedence order:
///
/// 1. Legacy JSON payload: `{"c": "<code>"}` (older QR images)
/// 2. Current scan URL: `.../scan/{scan_id}?code=<code>`
/// 3. Legacy share URL: `.../share/<code>`
/// 4. A raw code string
///
/// Malformed input yields `None`, never an error -- callers branch on the
/// absence of a value and the UI says "not found".
pub fn extract_code(raw: &str) -> Option<String> {
    let input = raw.trim();
    if input.is_empty() {
        return None;
    }

    // 1. Legacy JSON payload with a `c` field.
    if input.starts_with('{') {
        let value: serde_json::Value = serde_json::from_str(input).ok()?;
        let code = value.get("c")?.as_str()?.trim();
        return if code.is_empty() {
            None
        } else {
            Some(code.to_string())
        };
    }

    // 2. Current scan URL: the code travels in the query string.
    if input.contains("/scan/") {
        return extract_query_param(input, "code");
    }

    // 3. Legacy share URL: the code is the trailing path segment.
    if let Some(rest) = input.split("/share/").nth(1) {
        let code = rest
            .split(['?', '#'])
            .next()
            .unwrap_or("")
            .trim_end_matches('/');
        return if code.is_empty() {
            None
        } else {
            Some(code.to_string())
        };
    }

    // 4. Raw code string. Anything URL-shaped that did not match a known
    // route is malformed rather than a bare code.
    if input.contains("://") || input.contains('/') {
        return None;
    }
    Some(input.to_string())
}

/// Pull a single query parameter out of a URL-shaped string.
fn extract_query_param(input: &str, name: &str) -> Option<String> {
    let query = input.split('?').nth(1)?;
    for pair in query.split('&') {
        let mut parts = pair.splitn(2, '=');
        if parts.next() == Some(name) {
            let value = parts.next().unwrap_or("").trim();
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{FixedClock, SystemClock};

    fn fixed() -> FixedClock {
        FixedClock(chrono::DateTime::from_timestamp_millis(1_700_000_000_000).unwrap())
    }

    // -- Minting -----------------------------------------------------------

    #[test]
    fn connection_code_has_expected_shape() {
        let code = mint_connection_code(&fixed());
        let parts: Vec<&str> = code.splitn(3, '_').collect();
        assert_eq!(parts[0], "conn");
        assert_eq!(parts[1], "1700000000000");
        assert_eq!(parts[2].len(), TOKEN_SUFFIX_LENGTH);
        assert!(parts[2].chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn invitation_code_uses_distinct_namespace() {
        let clock = fixed();
        let conn = mint_connection_code(&clock);
        let invc = mint_invitation_code(&clock);
        assert!(conn.starts_with("conn_"));
        assert!(invc.starts_with("invc_"));
        assert!(!invc.starts_with("conn_"));
    }

    #[test]
    fn minted_tokens_are_unique() {
        let clock = SystemClock;
        let a = mint_connection_code(&clock);
        let b = mint_connection_code(&clock);
        assert_ne!(a, b);
    }

    #[test]
    fn scan_and_session_ids_carry_their_prefixes() {
        let clock = fixed();
        assert!(mint_scan_id(&clock).starts_with("scan_"));
        assert!(mint_session_id(&clock).starts_with("sess_"));
        assert!(mint_invitation_id(&clock).starts_with("inv_"));
    }

    // -- Expiry ------------------------------------------------------------

    #[test]
    fn connection_code_expires_after_24_hours() {
        let now = fixed().0;
        assert_eq!(connection_code_expiry(now), now + chrono::Duration::hours(24));
    }

    #[test]
    fn invitation_expires_after_7_days() {
        let now = fixed().0;
        assert_eq!(invitation_expiry(now), now + chrono::Duration::days(7));
    }

    #[test]
    fn usable_code_within_expiry() {
        let now = fixed().0;
        assert!(code_is_usable(true, now + chrono::Duration::hours(1), now));
    }

    #[test]
    fn inactive_code_is_never_usable() {
        let now = fixed().0;
        assert!(!code_is_usable(false, now + chrono::Duration::hours(1), now));
    }

    #[test]
    fn expired_code_is_never_usable() {
        let now = fixed().0;
        assert!(!code_is_usable(true, now - chrono::Duration::seconds(1), now));
        // Exactly at expiry counts as expired.
        assert!(!code_is_usable(true, now, now));
    }

    // -- URL building ------------------------------------------------------

    #[test]
    fn scan_url_has_canonical_shape() {
        let url = scan_url("https://knect.app", "scan_1_abc", "conn_1_xyz");
        assert_eq!(url, "https://knect.app/scan/scan_1_abc?code=conn_1_xyz");
    }

    #[test]
    fn registration_url_embeds_both_tokens() {
        let url = registration_url("https://knect.app/", "inv_1_a", "invc_1_b");
        assert_eq!(
            url,
            "https://knect.app/app/register?invitation=inv_1_a&code=invc_1_b"
        );
    }

    // -- Extraction --------------------------------------------------------

    #[test]
    fn extracts_from_json_payload() {
        let code = extract_code(r#"{"c": "conn_1700000000000_ab12cd34e"}"#);
        assert_eq!(code.as_deref(), Some("conn_1700000000000_ab12cd34e"));
    }

    #[test]
    fn json_payload_without_c_field_is_malformed() {
        assert_eq!(extract_code(r#"{"code": "conn_1_x"}"#), None);
        assert_eq!(extract_code(r#"{"c": ""}"#), None);
        assert_eq!(extract_code(r#"{"c": 42}"#), None);
    }

    #[test]
    fn invalid_json_is_malformed_not_a_panic() {
        assert_eq!(extract_code("{not json"), None);
    }

    #[test]
    fn extracts_from_scan_url_query() {
        let url = "https://knect.app/scan/scan_1_abc?code=conn_1_xyz&utm=qr";
        assert_eq!(extract_code(url).as_deref(), Some("conn_1_xyz"));
    }

    #[test]
    fn scan_url_without_code_param_is_malformed() {
        assert_eq!(extract_code("https://knect.app/scan/scan_1_abc"), None);
        assert_eq!(extract_code("https://knect.app/scan/scan_1_abc?code="), None);
    }

    #[test]
    fn extracts_from_legacy_share_url() {
        let url = "https://knect.app/share/conn_1_xyz";
        assert_eq!(extract_code(url).as_deref(), Some("conn_1_xyz"));
    }

    #[test]
    fn share_url_strips_query_and_fragment() {
        assert_eq!(
            extract_code("https://knect.app/share/conn_1_xyz?ref=mail#top").as_deref(),
            Some("conn_1_xyz")
        );
    }

    #[test]
    fn raw_code_passes_through() {
        assert_eq!(
            extract_code("  conn_1700000000000_ab12cd34e ").as_deref(),
            Some("conn_1700000000000_ab12cd34e")
        );
    }

    #[test]
    fn unknown_url_shape_is_malformed() {
        assert_eq!(extract_code("https://knect.app/profile/42"), None);
    }

    #[test]
    fn empty_input_is_malformed() {
        assert_eq!(extract_code(""), None);
        assert_eq!(extract_code("   "), None);
    }

    #[test]
    fn json_payload_wins_over_embedded_url() {
        // A JSON payload whose `c` value looks like a URL is still read as
        // the JSON field, not re-parsed as a URL.
        let code = extract_code(r#"{"c": "conn_1_json"}"#);
        assert_eq!(code.as_deref(), Some("conn_1_json"));
    }
}
