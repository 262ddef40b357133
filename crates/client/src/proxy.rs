use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use common::types::{ErrorBody, KvEntry, SetValueBody};
use tracing::{debug, warn};

use crate::errors::{ProxyError, UpstreamError};
use crate::routes::ClientState;
use crate::upstream::UpstreamResponse;

/// GET|PATCH|DELETE /kv/:key: forward to the kv service and mirror its status.
pub async fn forward(
    State(state): State<ClientState>,
    method: Method,
    Path(key): Path<String>,
    body: Bytes,
) -> Response {
    debug!(%method, %key, "forwarding request");

    let result = match method {
        Method::PATCH => {
            let payload: SetValueBody = match serde_json::from_slice(&body) {
                Ok(p) => p,
                Err(_) => return ProxyError::BadRequest.into_response(),
            };
            state.upstream.set(&key, &payload.value).await
        }
        Method::GET => state.upstream.get(&key).await,
        Method::DELETE => state.upstream.delete(&key).await,
        // the router only sends the three methods above
        _ => return StatusCode::METHOD_NOT_ALLOWED.into_response(),
    };

    match result {
        Ok(resp) => mirror(key, resp),
        Err(UpstreamError::UnroutableKey(key)) => ProxyError::UnroutableKey(key).into_response(),
        Err(e) => {
            warn!(%key, error = %e, "upstream call failed");
            ProxyError::CallFailed.into_response()
        }
    }
}

/// Re-shape the upstream reply: entries on success, the error text otherwise.
fn mirror(key: String, resp: UpstreamResponse) -> Response {
    let status = StatusCode::from_u16(resp.status).unwrap_or(StatusCode::BAD_GATEWAY);
    if resp.is_success() {
        let value = resp.value();
        (status, Json(KvEntry::new(key, value))).into_response()
    } else {
        (status, Json(ErrorBody::new(resp.error()))).into_response()
    }
}
