//! Proxy route table
//!
//! Every proxied route forwards to exactly one upstream: an n8n webhook or a
//! Supabase edge function. Which one is a deployment decision, see
//! [`crate::config::GatewayConfig::routes`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Upstream backend kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    /// `POST {webhook_base_url}/{slug}`, no auth header
    Webhook,
    /// `POST {supabase_url}/functions/v1/{name}`, bearer auth
    EdgeFunction,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Webhook => write!(f, "webhook"),
            Backend::EdgeFunction => write!(f, "edge_function"),
        }
    }
}

/// Routes served under `/api`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProxyRoute {
    AddUser,
    GetUser,
    UpdateUser,
    UpdatePreferences,
    GetPreferences,
    SearchMatches,
    SendInvite,
    DocumentToUser,
}

impl ProxyRoute {
    pub const ALL: [ProxyRoute; 8] = [
        ProxyRoute::AddUser,
        ProxyRoute::GetUser,
        ProxyRoute::UpdateUser,
        ProxyRoute::UpdatePreferences,
        ProxyRoute::GetPreferences,
        ProxyRoute::SearchMatches,
        ProxyRoute::SendInvite,
        ProxyRoute::DocumentToUser,
    ];

    /// Route name as used in config files and logs
    pub fn name(&self) -> &'static str {
        match self {
            ProxyRoute::AddUser => "add-user",
            ProxyRoute::GetUser => "get-user",
            ProxyRoute::UpdateUser => "update-user",
            ProxyRoute::UpdatePreferences => "update-preferences",
            ProxyRoute::GetPreferences => "get-preferences",
            ProxyRoute::SearchMatches => "search-matches",
            ProxyRoute::SendInvite => "send-invite",
            ProxyRoute::DocumentToUser => "document-to-user",
        }
    }

    /// HTTP path on the gateway
    pub fn path(&self) -> String {
        format!("/api/{}", self.name())
    }

    /// Webhook slug, if the webhook backend exposes this operation
    pub fn webhook_slug(&self) -> Option<&'static str> {
        match self {
            ProxyRoute::AddUser => Some("addnewuser"),
            ProxyRoute::GetUser => Some("getuser"),
            ProxyRoute::SearchMatches => Some("searchformatches"),
            ProxyRoute::SendInvite => Some("sendinvite"),
            ProxyRoute::UpdatePreferences => Some("updatepreferences"),
            ProxyRoute::DocumentToUser => Some("documenttouser"),
            ProxyRoute::UpdateUser | ProxyRoute::GetPreferences => None,
        }
    }

    /// Edge function name under `/functions/v1/`
    pub fn function_name(&self) -> &'static str {
        match self {
            ProxyRoute::AddUser => "add-new-user",
            ProxyRoute::GetUser => "get-user",
            ProxyRoute::UpdateUser => "update-user",
            ProxyRoute::UpdatePreferences => "update-preferences",
            ProxyRoute::GetPreferences => "get-preferences",
            ProxyRoute::SearchMatches => "search-for-matches",
            ProxyRoute::SendInvite => "send-invite",
            ProxyRoute::DocumentToUser => "document-to-user",
        }
    }

    /// Backend used when the config does not say otherwise
    pub fn default_backend(&self) -> Backend {
        match self {
            ProxyRoute::UpdateUser | ProxyRoute::UpdatePreferences | ProxyRoute::GetPreferences => {
                Backend::EdgeFunction
            }
            _ => Backend::Webhook,
        }
    }

    /// Routes that reject callers without an `Authorization` header
    pub fn requires_caller_auth(&self) -> bool {
        matches!(
            self,
            ProxyRoute::UpdateUser | ProxyRoute::UpdatePreferences | ProxyRoute::GetPreferences
        )
    }

    /// Correlation keys that must be truthy in the request body
    pub fn required_keys(&self) -> &'static [&'static str] {
        match self {
            ProxyRoute::AddUser | ProxyRoute::UpdateUser => &["uid"],
            ProxyRoute::GetUser
            | ProxyRoute::UpdatePreferences
            | ProxyRoute::GetPreferences
            | ProxyRoute::SearchMatches => &["user_uid"],
            ProxyRoute::SendInvite => &["user_id_1", "user_id_2"],
            ProxyRoute::DocumentToUser => &["document_metadata"],
        }
    }

    /// Whether `backend` has an endpoint for this route
    pub fn supports(&self, backend: Backend) -> bool {
        match backend {
            Backend::Webhook => self.webhook_slug().is_some(),
            Backend::EdgeFunction => true,
        }
    }
}

impl fmt::Display for ProxyRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ProxyRoute {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProxyRoute::ALL
            .iter()
            .copied()
            .find(|route| route.name() == s)
            .ok_or_else(|| Error::InvalidInput(format!("Unknown route: {}", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_names_round_trip() {
        for route in ProxyRoute::ALL {
            assert_eq!(route.name().parse::<ProxyRoute>().unwrap(), route);
        }
        assert!("delete-user".parse::<ProxyRoute>().is_err());
    }

    #[test]
    fn test_default_backends_are_supported() {
        for route in ProxyRoute::ALL {
            assert!(route.supports(route.default_backend()), "{} default unsupported", route);
        }
    }

    #[test]
    fn test_webhook_lacks_update_user_and_get_preferences() {
        assert!(!ProxyRoute::UpdateUser.supports(Backend::Webhook));
        assert!(!ProxyRoute::GetPreferences.supports(Backend::Webhook));
        assert!(ProxyRoute::UpdatePreferences.supports(Backend::Webhook));
    }

    #[test]
    fn test_paths() {
        assert_eq!(ProxyRoute::SearchMatches.path(), "/api/search-matches");
        assert_eq!(ProxyRoute::SearchMatches.function_name(), "search-for-matches");
        assert_eq!(ProxyRoute::AddUser.webhook_slug(), Some("addnewuser"));
    }
}
