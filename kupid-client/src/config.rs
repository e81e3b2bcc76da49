//! Client configuration
//!
//! Resolved by clap: command-line flag, then environment variable, then the
//! compiled default.

use clap::Args;
use std::time::Duration;
use url::Url;

use crate::error::{ClientError, ClientResult};

pub const ENV_GATEWAY_URL: &str = "KUPID_GATEWAY_URL";
pub const ENV_ACCESS_TOKEN: &str = "KUPID_ACCESS_TOKEN";
pub const ENV_USER_ID: &str = "KUPID_USER_ID";
pub const ENV_EMAIL: &str = "KUPID_EMAIL";

pub const DEFAULT_GATEWAY_URL: &str = "http://127.0.0.1:3000";
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Gateway location and the signed-in user's session
#[derive(Debug, Clone, Args)]
pub struct ClientConfig {
    /// Base URL of the kupid-gw gateway
    #[arg(long, env = ENV_GATEWAY_URL, default_value = DEFAULT_GATEWAY_URL)]
    pub gateway_url: Url,

    /// Supabase access token of the signed-in user
    #[arg(long, env = ENV_ACCESS_TOKEN, hide_env_values = true)]
    pub access_token: Option<String>,

    /// Supabase user id of the signed-in user
    #[arg(long, env = ENV_USER_ID)]
    pub user_id: Option<String>,

    /// Email address of the signed-in user
    #[arg(long, env = ENV_EMAIL)]
    pub email: Option<String>,
}

impl ClientConfig {
    pub fn new(gateway_url: Url) -> Self {
        Self {
            gateway_url,
            access_token: None,
            user_id: None,
            email: None,
        }
    }

    /// Signed-in user's id; flows that act on the user's behalf need one
    pub fn require_user_id(&self) -> ClientResult<&str> {
        self.user_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| ClientError::Validation("User ID not found. Please sign in again.".to_string()))
    }

    pub fn has_session(&self) -> bool {
        self.access_token.as_deref().map(|t| !t.is_empty()).unwrap_or(false)
            && self.require_user_id().is_ok()
    }
}
