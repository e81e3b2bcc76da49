//! kupid-gw library - proxy gateway between the Kupid front-end and its
//! external workflows (n8n webhooks, Supabase edge functions)
//!
//! Handlers are stateless: each validates the request, forwards it to one
//! upstream and normalizes the reply into the shape the client expects.

use axum::extract::DefaultBodyLimit;
use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use kupid_common::config::GatewayConfig;

pub mod api;
pub mod error;
pub mod normalize;
pub mod upstream;

pub use error::{ApiError, ApiResult};
pub use upstream::UpstreamClient;

/// Largest accepted request body
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Resolved gateway configuration
    pub config: Arc<GatewayConfig>,
    /// HTTP client for webhook / edge-function / auth calls
    pub upstream: UpstreamClient,
    /// Service startup timestamp for uptime reporting
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    /// Create new application state
    pub fn new(config: GatewayConfig) -> kupid_common::Result<Self> {
        let config = Arc::new(config);
        let upstream = UpstreamClient::new(Arc::clone(&config))?;
        Ok(Self {
            config,
            upstream,
            startup_time: Utc::now(),
        })
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    let proxy = Router::new()
        .route("/api/add-user", post(api::add_user))
        .route("/api/get-user", post(api::get_user))
        .route("/api/update-user", post(api::update_user))
        .route("/api/update-preferences", post(api::update_preferences))
        .route("/api/get-preferences", post(api::get_preferences))
        .route("/api/search-matches", post(api::search_matches))
        .route("/api/send-invite", post(api::send_invite))
        .route("/api/document-to-user", post(api::document_to_user))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES));

    let session = Router::new()
        .route("/api/check-onboarding", get(api::check_onboarding))
        .route("/auth/callback", get(api::auth_callback));

    Router::new()
        .merge(proxy)
        .merge(session)
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
