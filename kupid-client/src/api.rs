//! Typed access to the gateway's proxy routes
//!
//! [`KupidApi`] is the seam every client flow talks through; [`HttpApi`]
//! implements it over HTTP against a running kupid-gw.

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::config::{ClientConfig, REQUEST_TIMEOUT};
use crate::error::{ClientError, ClientResult};
use kupid_common::api::{
    CheckOnboardingResponse, DocumentLookup, GetUserRequest, InviteRequest, NewUser, PreferencesUpdate,
    SearchMatchesRequest, SearchMatchesResponse,
};
use kupid_common::{Match, MatchDetails, ProxyRoute};

const USER_AGENT: &str = concat!("kupid-client/", env!("CARGO_PKG_VERSION"));

/// Gateway operations used by the onboarding wizard and match browser
#[async_trait]
pub trait KupidApi: Send + Sync {
    /// Create the user record (`/api/add-user`)
    async fn add_user(&self, user: &NewUser) -> ClientResult<Value>;

    /// Store the user's match preferences (`/api/update-preferences`)
    async fn update_preferences(&self, prefs: &PreferencesUpdate) -> ClientResult<Value>;

    /// Look up a profile (`/api/get-user`); `Ok(None)` when none exists
    async fn get_user(&self, uid: &str) -> ClientResult<Option<Value>>;

    /// Precomputed matches for a viewer (`/api/search-matches`), upstream order
    async fn search_matches(&self, uid: &str) -> ClientResult<Vec<Match>>;

    /// Full profile behind a candidate uid (`/api/document-to-user`)
    async fn document_to_user(&self, uid: &str) -> ClientResult<Option<MatchDetails>>;

    /// Invite a candidate (`/api/send-invite`)
    async fn send_invite(&self, invite: &InviteRequest) -> ClientResult<()>;

    /// Whether the session's user finished onboarding (`/api/check-onboarding`)
    async fn check_onboarding(&self) -> ClientResult<bool>;
}

/// [`KupidApi`] over HTTP
#[derive(Clone)]
pub struct HttpApi {
    http: reqwest::Client,
    base_url: Url,
    access_token: Option<String>,
}

impl HttpApi {
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            base_url: config.gateway_url.clone(),
            access_token: config.access_token.clone().filter(|t| !t.is_empty()),
        })
    }

    fn url(&self, path: &str) -> ClientResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| ClientError::Transport(format!("Invalid gateway URL: {}", e)))
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.access_token {
            Some(token) => request.header(AUTHORIZATION, format!("Bearer {}", token)),
            None => request,
        }
    }

    /// POST `body` to `route`; non-2xx becomes [`ClientError::Api`]
    async fn post<B: Serialize + Sync>(&self, route: ProxyRoute, body: &B) -> ClientResult<Value> {
        let request = self.authorize(self.http.post(self.url(&route.path())?).json(body));
        let response = request.send().await?;
        let status = response.status().as_u16();
        let text = response.text().await?;
        debug!(route = %route, status, body_len = text.len(), "Gateway responded");

        if !(200..300).contains(&status) {
            return Err(ClientError::Api {
                status,
                message: error_message(&text),
            });
        }
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }
}

/// Message out of a gateway error body: `error`, then `message`, then raw text
fn error_message(body: &str) -> String {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let field = parsed.as_ref().and_then(|value| {
        ["error", "message"].iter().find_map(|key| match value.get(*key) {
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            Some(Value::Null) | None => None,
            Some(other) => Some(other.to_string()),
        })
    });
    match field {
        Some(message) => message,
        None if body.trim().is_empty() => "Unknown error".to_string(),
        None => body.trim().to_string(),
    }
}

#[async_trait]
impl KupidApi for HttpApi {
    async fn add_user(&self, user: &NewUser) -> ClientResult<Value> {
        self.post(ProxyRoute::AddUser, user).await
    }

    async fn update_preferences(&self, prefs: &PreferencesUpdate) -> ClientResult<Value> {
        self.post(ProxyRoute::UpdatePreferences, prefs).await
    }

    async fn get_user(&self, uid: &str) -> ClientResult<Option<Value>> {
        let body = GetUserRequest { user_uid: uid.to_string() };
        match self.post(ProxyRoute::GetUser, &body).await {
            Ok(Value::Array(items)) if items.is_empty() => Ok(None),
            Ok(Value::Null) => Ok(None),
            Ok(value) => Ok(Some(value)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn search_matches(&self, uid: &str) -> ClientResult<Vec<Match>> {
        let body = SearchMatchesRequest { user_uid: uid.to_string() };
        let value = self.post(ProxyRoute::SearchMatches, &body).await?;
        let response: SearchMatchesResponse = serde_json::from_value(value)?;
        Ok(response.matches)
    }

    async fn document_to_user(&self, uid: &str) -> ClientResult<Option<MatchDetails>> {
        let body = DocumentLookup { document_metadata: uid.to_string() };
        let value = self.post(ProxyRoute::DocumentToUser, &body).await?;
        let first = match value {
            Value::Array(items) => items.into_iter().next(),
            Value::Null => None,
            other => Some(other),
        };
        first.map(serde_json::from_value).transpose().map_err(ClientError::from)
    }

    async fn send_invite(&self, invite: &InviteRequest) -> ClientResult<()> {
        self.post(ProxyRoute::SendInvite, invite).await.map(|_| ())
    }

    async fn check_onboarding(&self) -> ClientResult<bool> {
        let url = self.url("/api/check-onboarding")?;
        let response = self.authorize(self.http.get(url)).send().await?;
        let status = response.status().as_u16();
        let text = response.text().await?;
        if !(200..300).contains(&status) {
            warn!(status, "Onboarding check failed");
            return Err(ClientError::Api {
                status,
                message: error_message(&text),
            });
        }
        let reply: CheckOnboardingResponse = serde_json::from_str(&text)?;
        Ok(reply.onboarding_complete)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message() {
        assert_eq!(error_message(r#"{"error":"uid is required"}"#), "uid is required");
        assert_eq!(error_message(r#"{"success":false,"message":"User not found"}"#), "User not found");
        assert_eq!(error_message("bad gateway"), "bad gateway");
        assert_eq!(error_message(""), "Unknown error");
    }
}
