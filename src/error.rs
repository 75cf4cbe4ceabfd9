use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("missing authorization header")]
    AuthMissing,

    #[error("token exchange not configured: missing {0}")]
    ExchangeConfigMissing(String),

    #[error("token exchange rejected: {0}")]
    ExchangeRejected(String),

    #[error("backend request failed: {0}")]
    UpstreamUnreachable(#[from] reqwest::Error),

    #[error("invalid request body: {0}")]
    InvalidBody(#[from] serde_json::Error),

    #[error("failed to read request body: {0}")]
    BodyRead(String),

    #[error("invalid credential: {0}")]
    InvalidCredential(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        // Full detail goes to the log; callers only see a minimal error object.
        let (status, message) = match &self {
            ProxyError::AuthMissing => (StatusCode::UNAUTHORIZED, "Unauthorized"),
            ProxyError::UpstreamUnreachable(e) => {
                tracing::error!("Backend fetch failed: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to fetch from backend",
                )
            }
            other => {
                tracing::error!("Proxy error: {}", other);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

// Alias for Result to simplify handler signatures
pub type ProxyResult<T> = Result<T, ProxyError>;
