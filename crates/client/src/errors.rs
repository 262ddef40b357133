use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use common::types::ErrorBody;
use thiserror::Error;

/// Failure talking to the kv service.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("could not build upstream client: {0}")]
    Build(#[source] reqwest::Error),
    #[error("upstream call failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("invalid upstream base url: {0}")]
    BaseUrl(String),
    #[error("key {0:?} cannot be addressed as a path segment")]
    UnroutableKey(String),
}

impl UpstreamError {
    /// Only connection-level failures are worth retrying; an HTTP status from
    /// the kv service is an answer, not a failure.
    pub fn is_retryable(&self) -> bool {
        match self {
            UpstreamError::Transport(e) => e.is_connect() || e.is_timeout(),
            UpstreamError::Build(_) | UpstreamError::BaseUrl(_) | UpstreamError::UnroutableKey(_) => false,
        }
    }
}

/// Errors the proxy answers with directly, without an upstream status to mirror.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("could not decode JSON request")]
    BadRequest,
    #[error("key {0:?} cannot be forwarded")]
    UnroutableKey(String),
    #[error("call failed")]
    CallFailed,
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = match self {
            ProxyError::BadRequest | ProxyError::UnroutableKey(_) => StatusCode::BAD_REQUEST,
            ProxyError::CallFailed => StatusCode::BAD_GATEWAY,
        };
        (status, Json(ErrorBody::new(self.to_string()))).into_response()
    }
}
