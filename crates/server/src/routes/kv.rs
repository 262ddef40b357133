use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use common::types::{KvEntry, SetValueBody};
use serde_json::{json, Value};
use tracing::info;

use crate::errors::ApiError;
use crate::state::ServerState;

/// PATCH /kv/:key: create or overwrite; always 201 on success.
pub async fn set_key(
    State(state): State<ServerState>,
    Path(key): Path<String>,
    body: Bytes,
) -> Result<(StatusCode, Json<KvEntry>), ApiError> {
    info!(%key, "set operation in progress");

    // decode regardless of content-type; an empty value is not storable
    let payload: SetValueBody = serde_json::from_slice(&body).map_err(|_| ApiError::InvalidBody)?;
    if payload.value.is_empty() {
        return Err(ApiError::InvalidBody);
    }

    let stored = state.store.set(key.clone(), payload.value).await?;
    Ok((StatusCode::CREATED, Json(KvEntry::new(key, stored))))
}

/// GET /kv/:key
pub async fn get_key(
    State(state): State<ServerState>,
    Path(key): Path<String>,
) -> Result<Json<KvEntry>, ApiError> {
    info!(%key, "get operation in progress");

    match state.store.get(key.clone()).await? {
        Some(value) => Ok(Json(KvEntry::new(key, value))),
        None => Err(ApiError::KeyNotFound(key)),
    }
}

/// DELETE /kv/:key: 404 when the key did not exist.
pub async fn delete_key(
    State(state): State<ServerState>,
    Path(key): Path<String>,
) -> Result<Json<Value>, ApiError> {
    info!(%key, "delete operation in progress");

    if state.store.delete(key.clone()).await? {
        Ok(Json(json!({ "deletion successful for key": key })))
    } else {
        Err(ApiError::DeleteMissing(key))
    }
}

pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}
