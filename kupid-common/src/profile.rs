//! Onboarding completeness rule
//!
//! A profile counts as onboarded when every required field is truthy.
//! Used by `/api/check-onboarding` and by the client's post-login redirect.

use serde_json::Value;

use crate::api::types::is_truthy;

/// Fields a profile must carry (truthy) to count as onboarded
pub const REQUIRED_PROFILE_FIELDS: [&str; 6] = [
    "display_name",
    "class_year",
    "gender",
    "age",
    "interests",
    "dream_date",
];

/// Whether `profile` has every required field set to a truthy value
///
/// Non-object values are never complete.
pub fn is_onboarding_complete(profile: &Value) -> bool {
    let Some(object) = profile.as_object() else {
        return false;
    };
    REQUIRED_PROFILE_FIELDS
        .iter()
        .all(|field| object.get(*field).map(is_truthy).unwrap_or(false))
}

/// Pick the profile object out of a normalized get-user reply
///
/// The gateway returns profiles as an array; older callers may still see a
/// bare object.
pub fn first_profile(reply: &Value) -> Option<&Value> {
    match reply {
        Value::Array(items) => items.first().filter(|item| item.is_object()),
        Value::Object(_) => Some(reply),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn complete_profile() -> Value {
        json!({
            "uid": "u1",
            "display_name": "Ana",
            "class_year": 2027,
            "gender": "female",
            "age": 20,
            "interests": "art, music",
            "dream_date": "Picnic at the lake",
        })
    }

    #[test]
    fn test_complete_profile() {
        assert!(is_onboarding_complete(&complete_profile()));
    }

    #[test]
    fn test_each_missing_field_is_incomplete() {
        for field in REQUIRED_PROFILE_FIELDS {
            let mut profile = complete_profile();
            profile.as_object_mut().unwrap().remove(field);
            assert!(!is_onboarding_complete(&profile), "missing {} accepted", field);
        }
    }

    #[test]
    fn test_falsy_field_is_incomplete() {
        let mut profile = complete_profile();
        profile["dream_date"] = json!("");
        assert!(!is_onboarding_complete(&profile));

        let mut profile = complete_profile();
        profile["age"] = json!(0);
        assert!(!is_onboarding_complete(&profile));
    }

    #[test]
    fn test_non_object_is_incomplete() {
        assert!(!is_onboarding_complete(&json!([complete_profile()])));
        assert!(!is_onboarding_complete(&json!(null)));
    }

    #[test]
    fn test_first_profile() {
        let reply = json!([{"uid": "u1"}, {"uid": "u2"}]);
        assert_eq!(first_profile(&reply).unwrap()["uid"], "u1");
        assert_eq!(first_profile(&json!({"uid": "u3"})).unwrap()["uid"], "u3");
        assert!(first_profile(&json!([])).is_none());
    }
}
