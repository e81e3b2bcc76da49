//! Error types for kupid-gw
//!
//! Each variant maps to one class of failure a proxy route can report:
//! bad request, missing auth, upstream failure, not found, unexpected
//! upstream shape, configuration.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Result alias for handlers
pub type ApiResult<T> = Result<T, ApiError>;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Required correlation keys absent or falsy (400)
    #[error("{}", missing_message(.0))]
    MissingFields(Vec<String>),

    /// Request body is not JSON (400)
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    /// Caller sent no Authorization header (401)
    #[error("Unauthorized - Missing token")]
    Unauthorized,

    /// Upstream answered non-2xx; status and body are forwarded
    #[error("Upstream returned {status}: {body}")]
    Upstream { status: u16, body: String },

    /// Upstream reports no such record (404)
    #[error("{0}")]
    NotFound(String),

    /// Upstream reply matched none of the known shapes (500)
    #[error("Unexpected response format")]
    UnexpectedFormat,

    /// Upstream reply was empty or not JSON where JSON is required (500)
    #[error("{0}")]
    InvalidUpstream(String),

    /// Missing or invalid configuration (500)
    #[error("{0}")]
    Config(String),

    /// Network failure talking to the upstream (500)
    #[error("{0}")]
    Transport(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),
}

fn missing_message(keys: &[String]) -> String {
    match keys {
        [single] => format!("{} is required", single),
        many => format!("{} are required", many.join(" and ")),
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingFields(_) | ApiError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::UnexpectedFormat
            | ApiError::InvalidUpstream(_)
            | ApiError::Config(_)
            | ApiError::Transport(_)
            | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<kupid_common::Error> for ApiError {
    fn from(err: kupid_common::Error) -> Self {
        match err {
            kupid_common::Error::Config(msg) => ApiError::Config(msg),
            kupid_common::Error::InvalidInput(msg) => ApiError::InvalidBody(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Transport(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ApiError::Upstream { body, .. } => json!({ "error": body }),
            ApiError::NotFound(message) => json!({ "success": false, "message": message }),
            ApiError::UnexpectedFormat => json!({
                "success": false,
                "message": ApiError::UnexpectedFormat.to_string(),
            }),
            other => json!({ "error": other.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}
