//! Error types for kupid-client

use thiserror::Error;

pub type ClientResult<T> = Result<T, ClientError>;

/// Client error type
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClientError {
    /// Input rejected by a wizard step; recoverable
    #[error("{0}")]
    Validation(String),

    /// Gateway answered non-2xx
    #[error("{message}")]
    Api { status: u16, message: String },

    /// Gateway unreachable
    #[error("Network error: {0}")]
    Transport(String),

    /// Gateway reply did not have the expected shape
    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl ClientError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::Api { status: 404, .. })
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err.to_string())
    }
}
