//! Upstream HTTP client
//!
//! Forwards proxied requests to the n8n webhook or the Supabase edge
//! function bound to each route, and talks to Supabase auth for the session
//! endpoints.

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::ApiError;
use crate::normalize::truncate;
use kupid_common::config::{GatewayConfig, SupabaseConfig};
use kupid_common::{Backend, ProxyRoute};

const USER_AGENT: &str = concat!("kupid-gw/", env!("CARGO_PKG_VERSION"));

/// Raw upstream answer: status plus body text
#[derive(Debug, Clone)]
pub struct RawReply {
    pub status: u16,
    pub body: String,
}

impl RawReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Non-2xx replies become [`ApiError::Upstream`] carrying status and body
    pub fn into_success(self) -> Result<String, ApiError> {
        if self.is_success() {
            Ok(self.body)
        } else {
            Err(ApiError::Upstream {
                status: self.status,
                body: self.body,
            })
        }
    }
}

/// Session returned by the PKCE code exchange
#[derive(Debug, Clone, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub user: Option<Value>,
}

/// HTTP client for every outbound call the gateway makes
#[derive(Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    config: Arc<GatewayConfig>,
}

impl UpstreamClient {
    pub fn new(config: Arc<GatewayConfig>) -> kupid_common::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.upstream_timeout)
            .build()
            .map_err(|e| kupid_common::Error::Internal(format!("HTTP client init failed: {}", e)))?;

        Ok(Self { http, config })
    }

    /// URL of the upstream bound to `route`
    pub fn endpoint(&self, route: ProxyRoute) -> Result<(Backend, String), ApiError> {
        let backend = self.config.backend_for(route);
        let url = match backend {
            Backend::Webhook => {
                let slug = route.webhook_slug().ok_or_else(|| {
                    ApiError::Config(format!("Route {} has no webhook endpoint", route))
                })?;
                self.config.webhook_url(slug)
            }
            Backend::EdgeFunction => self.config.supabase()?.function_url(route.function_name()),
        };
        Ok((backend, url))
    }

    /// POST `body` to the upstream bound to `route`
    ///
    /// Edge functions receive the caller's `Authorization` header when given,
    /// otherwise the anon key; webhooks receive no auth header.
    pub async fn forward(
        &self,
        route: ProxyRoute,
        body: &Value,
        caller_auth: Option<&str>,
    ) -> Result<RawReply, ApiError> {
        let (backend, url) = self.endpoint(route)?;

        let mut request = self.http.post(&url).json(body);
        if backend == Backend::EdgeFunction {
            let supabase = self.config.supabase()?;
            request = request.headers(edge_headers(&supabase, caller_auth)?);
            if caller_auth.is_some() {
                debug!(route = %route, "Forwarding caller's bearer token");
            }
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let text = response.text().await?;

        info!(
            route = %route,
            backend = %backend,
            status,
            body_len = text.len(),
            "Upstream responded"
        );
        debug!(route = %route, body = %truncate(&text, 500), "Upstream body");

        Ok(RawReply { status, body: text })
    }

    /// Resolve the Supabase user behind an access token
    pub async fn fetch_auth_user(&self, access_token: &str) -> Result<Value, ApiError> {
        let supabase = self.config.supabase()?;
        let bearer = format!("Bearer {}", access_token);

        let response = self
            .http
            .get(supabase.auth_url("user"))
            .headers(edge_headers(&supabase, Some(&bearer))?)
            .send()
            .await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        let body = RawReply { status, body }.into_success()?;
        serde_json::from_str(&body).map_err(|e| ApiError::InvalidUpstream(format!("Invalid auth user: {}", e)))
    }

    /// Exchange an OAuth code (PKCE flow) for a session
    pub async fn exchange_code(&self, code: &str, code_verifier: Option<&str>) -> Result<AuthSession, ApiError> {
        let supabase = self.config.supabase()?;

        let response = self
            .http
            .post(supabase.auth_url("token?grant_type=pkce"))
            .headers(edge_headers(&supabase, None)?)
            .json(&json!({
                "auth_code": code,
                "code_verifier": code_verifier.unwrap_or_default(),
            }))
            .send()
            .await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        if !(200..300).contains(&status) {
            return Err(ApiError::Upstream {
                status,
                body: auth_error_message(&body),
            });
        }

        serde_json::from_str(&body).map_err(|e| ApiError::InvalidUpstream(format!("Invalid session: {}", e)))
    }
}

fn edge_headers(supabase: &SupabaseConfig, caller_auth: Option<&str>) -> Result<HeaderMap, ApiError> {
    let invalid = |e: reqwest::header::InvalidHeaderValue| ApiError::Config(format!("Invalid header value: {}", e));

    let authorization = match caller_auth {
        Some(header) => header.to_string(),
        None => format!("Bearer {}", supabase.anon_key),
    };

    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, HeaderValue::from_str(&authorization).map_err(invalid)?);
    headers.insert("apikey", HeaderValue::from_str(&supabase.anon_key).map_err(invalid)?);
    Ok(headers)
}

/// Human-readable message out of a Supabase auth error body
fn auth_error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| {
            ["error_description", "msg", "message", "error"]
                .iter()
                .find_map(|key| value.get(*key).and_then(Value::as_str).map(str::to_string))
        })
        .unwrap_or_else(|| body.to_string())
}
