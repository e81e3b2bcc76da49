//! Onboarding completeness check
//!
//! GET /api/check-onboarding answers `{ onboardingComplete: bool }` for the
//! session's user. Any failure along the way (no session, auth rejected,
//! upstream error) answers `false` rather than an error status.

use axum::{
    extract::State,
    http::{
        header::{AUTHORIZATION, COOKIE},
        HeaderMap,
    },
    Json,
};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::error::{ApiError, ApiResult};
use crate::normalize::{normalize, policy_for};
use crate::AppState;
use kupid_common::api::{bearer_token, cookie_value, CheckOnboardingResponse, ACCESS_TOKEN_COOKIE};
use kupid_common::profile::{first_profile, is_onboarding_complete};
use kupid_common::ProxyRoute;

/// GET /api/check-onboarding
pub async fn check_onboarding(State(state): State<AppState>, headers: HeaderMap) -> Json<CheckOnboardingResponse> {
    let onboarding_complete = match onboarding_status(&state, &headers).await {
        Ok(complete) => complete,
        Err(e) => {
            warn!(error = %e, "Onboarding check failed, reporting incomplete");
            false
        }
    };

    Json(CheckOnboardingResponse { onboarding_complete })
}

async fn onboarding_status(state: &AppState, headers: &HeaderMap) -> ApiResult<bool> {
    let token = session_token(headers).ok_or(ApiError::Unauthorized)?;

    let user = state.upstream.fetch_auth_user(&token).await?;
    let uid = user
        .get("id")
        .and_then(Value::as_str)
        .ok_or_else(|| ApiError::InvalidUpstream("Auth user has no id".to_string()))?;
    info!(user_id = uid, "Checking onboarding");

    let bearer = format!("Bearer {}", token);
    let reply = state
        .upstream
        .forward(ProxyRoute::GetUser, &json!({ "user_uid": uid }), Some(&bearer))
        .await?;
    let profiles = normalize(policy_for(ProxyRoute::GetUser), &reply.into_success()?)?;

    Ok(first_profile(&profiles).map(is_onboarding_complete).unwrap_or(false))
}

/// Access token from the bearer header, else from the session cookie
fn session_token(headers: &HeaderMap) -> Option<String> {
    let from_header = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(bearer_token);
    if let Some(token) = from_header {
        return Some(token.to_string());
    }

    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(|cookies| cookie_value(cookies, ACCESS_TOKEN_COOKIE))
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}
