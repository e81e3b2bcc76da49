//! OAuth callback
//!
//! GET /auth/callback?code=..&next=.. exchanges the provider code for a
//! Supabase session, stores it in cookies and redirects into the app.

use axum::{
    extract::{Query, State},
    http::{
        header::{COOKIE, HOST, LOCATION, SET_COOKIE},
        HeaderMap, HeaderValue, StatusCode,
    },
    response::{IntoResponse, Response},
};
use cookie::{time::Duration, Cookie, SameSite};
use serde::Deserialize;
use tracing::{error, info};

use crate::error::ApiError;
use crate::upstream::AuthSession;
use crate::AppState;
use kupid_common::api::{cookie_with_suffix, ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE};

const DEFAULT_NEXT: &str = "/onboarding";
const CODE_VERIFIER_SUFFIX: &str = "-code-verifier";

/// Callback query parameters
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub next: Option<String>,
}

/// GET /auth/callback
pub async fn auth_callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
    headers: HeaderMap,
) -> Response {
    let origin = request_origin(&state, &headers);

    let Some(code) = query.code.filter(|c| !c.is_empty()) else {
        info!("No code provided, redirecting to home page");
        return redirect(&format!("{}/", origin), &[]);
    };

    let verifier = headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(|cookies| cookie_with_suffix(cookies, CODE_VERIFIER_SUFFIX))
        .map(str::to_string);

    match state.upstream.exchange_code(&code, verifier.as_deref()).await {
        Ok(session) => {
            let next = safe_next(query.next.as_deref());
            info!(next = %next, "Session created, redirecting");
            redirect(&format!("{}{}", origin, next), &session_cookies(&session))
        }
        Err(ApiError::Upstream { body, .. }) => {
            error!(error = %body, "Error exchanging code");
            redirect(&error_location(&origin, "auth_failed", &body), &[])
        }
        Err(e) => {
            error!(error = %e, "Auth callback error");
            redirect(&error_location(&origin, "callback_error", &e.to_string()), &[])
        }
    }
}

/// Public origin: configured site URL, else derived from the Host header
fn request_origin(state: &AppState, headers: &HeaderMap) -> String {
    if let Some(site) = &state.config.site_url {
        return site.as_str().trim_end_matches('/').to_string();
    }
    let host = headers
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");
    format!("http://{}", host)
}

/// `next` if it is a site-relative path, else the onboarding page
fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") => path,
        _ => DEFAULT_NEXT,
    }
}

fn error_location(origin: &str, kind: &str, message: &str) -> String {
    format!("{}/?error={}&message={}", origin, kind, urlencoding::encode(message))
}

fn session_cookies(session: &AuthSession) -> Vec<String> {
    let mut access = Cookie::build((ACCESS_TOKEN_COOKIE, session.access_token.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);
    if let Some(secs) = session.expires_in {
        access = access.max_age(Duration::seconds(secs as i64));
    }

    let mut cookies = vec![access.build().to_string()];
    if let Some(refresh) = &session.refresh_token {
        let refresh = Cookie::build((REFRESH_TOKEN_COOKIE, refresh.clone()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .build();
        cookies.push(refresh.to_string());
    }
    cookies
}

fn redirect(location: &str, cookies: &[String]) -> Response {
    let mut response = StatusCode::FOUND.into_response();
    let headers = response.headers_mut();

    match HeaderValue::from_str(location) {
        Ok(value) => {
            headers.insert(LOCATION, value);
        }
        Err(e) => {
            error!(error = %e, "Invalid redirect location");
            headers.insert(LOCATION, HeaderValue::from_static("/"));
        }
    }
    for cookie in cookies {
        if let Ok(value) = HeaderValue::from_str(cookie) {
            headers.append(SET_COOKIE, value);
        }
    }
    response
}
