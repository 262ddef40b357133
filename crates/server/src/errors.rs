use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use common::types::ErrorBody;
use store::StoreError;
use thiserror::Error;
use tracing::{error, warn};

/// Everything a kv handler can answer with other than success.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid body")]
    InvalidBody,
    #[error("key \"{0}\" not found")]
    KeyNotFound(String),
    #[error("deletion unsuccessful for key: {0}")]
    DeleteMissing(String),
    #[error("Method Not Allowed")]
    MethodNotAllowed,
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidBody => StatusCode::BAD_REQUEST,
            ApiError::KeyNotFound(_) | ApiError::DeleteMissing(_) => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Store(StoreError::Unavailable) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Store(StoreError::OwnerUnresponsive { .. }) => StatusCode::GATEWAY_TIMEOUT,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let msg = self.to_string();
        if status.is_server_error() {
            error!(error = %msg, %status, "store request failed");
        } else if status != StatusCode::NOT_FOUND {
            warn!(error = %msg, %status, "rejected request");
        }
        (status, Json(ErrorBody::new(msg))).into_response()
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}
