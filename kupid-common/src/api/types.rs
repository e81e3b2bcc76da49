//! Shared API request/response types
//!
//! Payload shapes sent by the client to the gateway, and forwarded by the
//! gateway to the webhook or edge-function upstreams.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::matches::Match;

// ========================================
// Request Payloads
// ========================================

/// User record created at the end of onboarding (`/api/add-user`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewUser {
    pub uid: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub display_name: String,
    pub class_year: i32,
    pub gender: String,
    pub sexual_orientation: String,
    pub age: u32,
    pub race: String,
    pub religion: String,
    /// Comma-joined, e.g. `"art, sports, travel"`
    pub interests: String,
    pub dream_date: String,
    pub budget: String,
    pub instagram_handle: String,
}

/// Preference record keyed 1:1 to a user (`/api/update-preferences`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreferencesUpdate {
    pub user_uid: String,
    pub pref_class_year: i32,
    pub pref_gender: String,
    pub pref_sexual_orientation: String,
    /// `"NN"` or `"NN-MM"`
    pub pref_age: String,
    pub pref_race: String,
    pub pref_religion: String,
    pub pref_budget: String,
}

/// Invite from the viewer to a candidate (`/api/send-invite`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InviteRequest {
    pub user_id_1: String,
    pub user_id_2: String,
}

/// Profile lookup by uid (`/api/get-user`, `/api/get-preferences`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetUserRequest {
    pub user_uid: String,
}

/// Match search for a viewer (`/api/search-matches`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchMatchesRequest {
    pub user_uid: String,
}

/// Metadata-to-user lookup (`/api/document-to-user`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentLookup {
    pub document_metadata: String,
}

// ========================================
// Response Payloads
// ========================================

/// Normalized `/api/search-matches` reply
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchMatchesResponse {
    #[serde(default, deserialize_with = "crate::matches::null_as_default")]
    pub matches: Vec<Match>,
}

/// `/api/check-onboarding` reply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckOnboardingResponse {
    #[serde(rename = "onboardingComplete")]
    pub onboarding_complete: bool,
}

// ========================================
// JSON helpers
// ========================================

/// JavaScript-style truthiness of a JSON value
///
/// `null`, `false`, `0`, `""` are falsy; arrays and objects are always truthy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Keys from `required` that are absent or falsy in `body`
pub fn missing_keys<'a>(body: &Value, required: &[&'a str]) -> Vec<&'a str> {
    required
        .iter()
        .copied()
        .filter(|key| !body.get(*key).map(is_truthy).unwrap_or(false))
        .collect()
}
