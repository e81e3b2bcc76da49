//! Proxy routes
//!
//! Every `/api/*` POST route follows the same contract:
//! 1. Body must be JSON with the route's correlation keys (400 otherwise)
//! 2. Routes that write or read preferences need an `Authorization` header (401)
//! 3. Forward to the one upstream bound to the route
//! 4. Non-2xx upstream → same status with `{ error: <upstream body> }`
//! 5. 2xx upstream → normalized per the route's reply policy

use axum::{
    body::Bytes,
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap},
    Json,
};
use serde_json::{json, Value};
use tracing::{debug, error, info};

use crate::error::{ApiError, ApiResult};
use crate::normalize::{normalize, policy_for};
use crate::AppState;
use kupid_common::api::missing_keys;
use kupid_common::ProxyRoute;

/// Validate, forward and normalize one proxied request
pub async fn proxy_request(
    route: ProxyRoute,
    state: &AppState,
    headers: &HeaderMap,
    body: &[u8],
) -> ApiResult<Value> {
    info!(route = %route, "API route called");

    let payload: Value = serde_json::from_slice(body).map_err(|e| {
        error!(route = %route, error = %e, "Request body is not JSON");
        ApiError::InvalidBody(e.to_string())
    })?;
    debug!(route = %route, payload = %payload, "Received payload");

    let missing = missing_keys(&payload, route.required_keys());
    if !missing.is_empty() {
        error!(route = %route, missing = ?missing, "Missing required fields");
        return Err(ApiError::MissingFields(missing.into_iter().map(str::to_string).collect()));
    }

    let caller_auth = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.trim().is_empty());
    if route.requires_caller_auth() && caller_auth.is_none() {
        error!(route = %route, "Missing Authorization header");
        return Err(ApiError::Unauthorized);
    }

    let outbound = outbound_body(route, payload);
    let reply = state.upstream.forward(route, &outbound, caller_auth).await?;

    let text = reply.into_success().map_err(|e| {
        error!(route = %route, error = %e, "Upstream error");
        e
    })?;

    let normalized = normalize(policy_for(route), &text)?;
    info!(route = %route, "Request completed");
    Ok(normalized)
}

/// Body sent upstream; invites forward only the two user ids
fn outbound_body(route: ProxyRoute, payload: Value) -> Value {
    match route {
        ProxyRoute::SendInvite => json!({
            "user_id_1": payload["user_id_1"],
            "user_id_2": payload["user_id_2"],
        }),
        _ => payload,
    }
}

/// POST /api/add-user
pub async fn add_user(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> ApiResult<Json<Value>> {
    proxy_request(ProxyRoute::AddUser, &state, &headers, &body).await.map(Json)
}

/// POST /api/get-user
///
/// 200 with an array of profile records, or 404 when the user does not exist.
pub async fn get_user(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> ApiResult<Json<Value>> {
    proxy_request(ProxyRoute::GetUser, &state, &headers, &body).await.map(Json)
}

/// POST /api/update-user
pub async fn update_user(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> ApiResult<Json<Value>> {
    proxy_request(ProxyRoute::UpdateUser, &state, &headers, &body).await.map(Json)
}

/// POST /api/update-preferences
pub async fn update_preferences(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<Value>> {
    proxy_request(ProxyRoute::UpdatePreferences, &state, &headers, &body).await.map(Json)
}

/// POST /api/get-preferences
pub async fn get_preferences(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<Value>> {
    proxy_request(ProxyRoute::GetPreferences, &state, &headers, &body).await.map(Json)
}

/// POST /api/search-matches
///
/// Always answers `{ matches: [...] }` on success.
pub async fn search_matches(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<Value>> {
    proxy_request(ProxyRoute::SearchMatches, &state, &headers, &body).await.map(Json)
}

/// POST /api/send-invite
pub async fn send_invite(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> ApiResult<Json<Value>> {
    proxy_request(ProxyRoute::SendInvite, &state, &headers, &body).await.map(Json)
}

/// POST /api/document-to-user
pub async fn document_to_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<Value>> {
    proxy_request(ProxyRoute::DocumentToUser, &state, &headers, &body).await.map(Json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invite_body_is_reduced_to_ids() {
        let body = outbound_body(
            ProxyRoute::SendInvite,
            json!({"user_id_1": "a", "user_id_2": "b", "note": "hi"}),
        );
        assert_eq!(body, json!({"user_id_1": "a", "user_id_2": "b"}));
    }

    #[test]
    fn test_other_bodies_forwarded_unchanged() {
        let payload = json!({"user_uid": "a", "extra": [1, 2]});
        assert_eq!(outbound_body(ProxyRoute::GetUser, payload.clone()), payload);
    }
}
