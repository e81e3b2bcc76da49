//! Post-sign-in redirect decision

use serde_json::Value;
use std::fmt;
use tracing::{info, warn};

use crate::api::KupidApi;
use crate::error::{ClientError, ClientResult};
use kupid_common::profile::{first_profile, is_onboarding_complete};

/// Page a user is sent to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectTarget {
    Home,
    Onboarding,
    Matches,
}

impl RedirectTarget {
    pub fn path(self) -> &'static str {
        match self {
            RedirectTarget::Home => "/",
            RedirectTarget::Onboarding => "/onboarding",
            RedirectTarget::Matches => "/matches",
        }
    }
}

impl fmt::Display for RedirectTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Decide where a user lands given their session and profile lookup
///
/// - no session: home
/// - a complete profile: matches
/// - no profile, an incomplete one, or a gateway error reply: onboarding
/// - gateway unreachable: home
pub fn after_sign_in(has_session: bool, lookup: ClientResult<Option<Value>>) -> RedirectTarget {
    if !has_session {
        return RedirectTarget::Home;
    }
    match lookup {
        Ok(Some(reply)) => match first_profile(&reply) {
            Some(profile) if is_onboarding_complete(profile) => RedirectTarget::Matches,
            _ => RedirectTarget::Onboarding,
        },
        Ok(None) => RedirectTarget::Onboarding,
        Err(ClientError::Api { .. }) => RedirectTarget::Onboarding,
        Err(_) => RedirectTarget::Home,
    }
}

/// Redirect for a landing URL fragment carrying implicit-flow tokens
///
/// Returns `None` when the fragment has no `access_token` or no session
/// could be established from it.
pub fn from_fragment(fragment: &str, has_session: bool) -> Option<RedirectTarget> {
    let carries_token = fragment
        .trim_start_matches('#')
        .split('&')
        .any(|pair| pair.split('=').next() == Some("access_token"));
    (carries_token && has_session).then_some(RedirectTarget::Onboarding)
}

/// Look the user up and decide where they land
pub async fn resolve(api: &dyn KupidApi, session_uid: Option<&str>) -> RedirectTarget {
    let Some(uid) = session_uid.filter(|uid| !uid.is_empty()) else {
        info!("No session, redirecting to home");
        return RedirectTarget::Home;
    };

    let lookup = api.get_user(uid).await;
    if let Err(e) = &lookup {
        warn!(uid, error = %e, "Profile lookup failed");
    }
    let target = after_sign_in(true, lookup);
    info!(uid, target = %target, "Redirect decided");
    target
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn complete() -> Value {
        json!([{
            "display_name": "Sam",
            "class_year": 2027,
            "gender": "female",
            "age": 20,
            "interests": "art",
            "dream_date": "Picnic"
        }])
    }

    #[test]
    fn test_no_session_goes_home() {
        assert_eq!(after_sign_in(false, Ok(Some(complete()))), RedirectTarget::Home);
    }

    #[test]
    fn test_complete_profile_goes_to_matches() {
        assert_eq!(after_sign_in(true, Ok(Some(complete()))), RedirectTarget::Matches);
    }

    #[test]
    fn test_incomplete_or_missing_profile_goes_to_onboarding() {
        let incomplete = json!([{ "display_name": "Sam", "class_year": 2027 }]);
        assert_eq!(after_sign_in(true, Ok(Some(incomplete))), RedirectTarget::Onboarding);
        assert_eq!(after_sign_in(true, Ok(None)), RedirectTarget::Onboarding);

        let server_error = ClientError::Api { status: 500, message: "boom".into() };
        assert_eq!(after_sign_in(true, Err(server_error)), RedirectTarget::Onboarding);
    }

    #[test]
    fn test_unreachable_gateway_goes_home() {
        let err = ClientError::Transport("connection refused".into());
        assert_eq!(after_sign_in(true, Err(err)), RedirectTarget::Home);
    }

    #[test]
    fn test_fragment() {
        let fragment = "#access_token=abc&refresh_token=def&type=signup";
        assert_eq!(from_fragment(fragment, true), Some(RedirectTarget::Onboarding));
        assert_eq!(from_fragment(fragment, false), None);
        assert_eq!(from_fragment("#error=denied", true), None);
    }
}
