//! Privacy projection of a profile into what a scanner may see.
//!
//! Owners control visibility through an `allowed_fields` map (field name
//! to bool) and a `default_shared_links` selection naming which of their
//! social links travel with the profile. Fields missing from the map fall
//! back to a documented default; fields the map does not know at all are
//! hidden (fail closed).

use serde::Serialize;
use serde_json::{Map, Value};

use crate::types::DbId;

/// Fields hidden unless the owner explicitly enables them.
pub const DEFAULT_HIDDEN_FIELDS: &[&str] = &["email", "phone"];

/// Fields visible unless the owner explicitly disables them.
pub const DEFAULT_VISIBLE_FIELDS: &[&str] =
    &["company", "job_title", "bio", "interests", "location"];

/// The owner-side profile data the projection reads.
///
/// `allowed_fields` is a JSONB map of field name to bool; `shared_links`
/// a map of link name to URL; `default_shared_links` an array of link
/// names selected for sharing.
#[derive(Debug, Clone)]
pub struct OwnerProfile {
    pub user_id: DbId,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub job_title: Option<String>,
    pub bio: Option<String>,
    pub interests: Value,
    pub location: Option<String>,
    pub allowed_fields: Value,
    pub shared_links: Value,
    pub default_shared_links: Value,
}

/// The privacy-filtered view handed to a scanner.
///
/// `display_name` and `avatar_url` are identity basics and always
/// included; everything else is subject to `allowed_fields`.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileView {
    pub user_id: DbId,
    pub display_name: String,
    pub avatar_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interests: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub shared_links: Map<String, Value>,
}

/// Whether a field may appear in the projected view.
///
/// An explicit bool in the map wins; otherwise the field's documented
/// default applies; fields with no default are hidden.
pub fn field_is_allowed(allowed_fields: &Value, field: &str) -> bool {
    if let Some(explicit) = allowed_fields.get(field).and_then(Value::as_bool) {
        return explicit;
    }
    DEFAULT_VISIBLE_FIELDS.contains(&field)
}

/// Intersect a link map with a selection of link names.
///
/// Used both when projecting a profile (selection = owner's
/// `default_shared_links`) and when materializing a contact (selection =
/// the approver's chosen subset). Names absent from the map are ignored.
pub fn intersect_shared_links(shared_links: &Value, selection: &[String]) -> Map<String, Value> {
    let mut out = Map::new();
    let Some(links) = shared_links.as_object() else {
        return out;
    };
    for name in selection {
        if let Some(url) = links.get(name) {
            out.insert(name.clone(), url.clone());
        }
    }
    out
}

/// Link names in a JSONB array, skipping anything non-string.
pub fn link_selection(selection: &Value) -> Vec<String> {
    selection
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Project an owner profile into the view a scanner receives.
pub fn project_profile(owner: &OwnerProfile) -> ProfileView {
    let allowed = &owner.allowed_fields;
    let selection = link_selection(&owner.default_shared_links);

    ProfileView {
        user_id: owner.user_id,
        display_name: owner.display_name.clone(),
        avatar_url: owner.avatar_url.clone(),
        email: gated(allowed, "email", owner.email.clone()),
        phone: gated(allowed, "phone", owner.phone.clone()),
        company: gated(allowed, "company", owner.company.clone()),
        job_title: gated(allowed, "job_title", owner.job_title.clone()),
        bio: gated(allowed, "bio", owner.bio.clone()),
        interests: gated(allowed, "interests", non_null(&owner.interests)),
        location: gated(allowed, "location", owner.location.clone()),
        shared_links: intersect_shared_links(&owner.shared_links, &selection),
    }
}

fn gated<T>(allowed_fields: &Value, field: &str, value: Option<T>) -> Option<T> {
    if field_is_allowed(allowed_fields, field) {
        value
    } else {
        None
    }
}

fn non_null(value: &Value) -> Option<Value> {
    if value.is_null() {
        None
    } else {
        Some(value.clone())
    }
}
