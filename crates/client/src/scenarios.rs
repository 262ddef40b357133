use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, info};

use crate::errors::UpstreamError;
use crate::routes::ClientState;

const DELETION_KEY: &str = "batman";
const OVERWRITE_KEY: &str = "robin";
const FIRST_VALUE: &str = "dick grayson";
const FINAL_VALUE: &str = "jason todd";

/// Why a canned scenario did not pass.
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("failed to {step} key")]
    Call {
        step: &'static str,
        #[source]
        source: UpstreamError,
    },
    #[error("failed to {step} key")]
    Rejected { step: &'static str, status: u16 },
    #[error("key still exists after deletion")]
    StillExists,
    #[error("overwrite test failed")]
    WrongValue { expected: &'static str, got: String },
}

impl ScenarioError {
    fn call(step: &'static str) -> impl FnOnce(UpstreamError) -> Self {
        move |source| ScenarioError::Call { step, source }
    }
}

impl IntoResponse for ScenarioError {
    fn into_response(self) -> Response {
        error!(error = %self, "scenario failed");
        let body = match &self {
            ScenarioError::Call { source, .. } => json!({"error": self.to_string(), "details": source.to_string()}),
            ScenarioError::Rejected { status, .. } => {
                json!({"error": self.to_string(), "details": format!("upstream status {status}")})
            }
            ScenarioError::StillExists => json!({"error": self.to_string()}),
            ScenarioError::WrongValue { expected, got } => {
                json!({"error": self.to_string(), "expected": expected, "got": got})
            }
        };
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

fn passed(name: &str) -> Json<serde_json::Value> {
    info!(scenario = name, "scenario passed");
    Json(json!({"message": format!("test {name} passed")}))
}

/// GET /test_deletion: set, delete, then expect the key to be gone.
pub async fn test_deletion(State(state): State<ClientState>) -> Result<Json<serde_json::Value>, ScenarioError> {
    let up = &state.upstream;

    let resp = up.set(DELETION_KEY, "bruce wayne").await.map_err(ScenarioError::call("set"))?;
    if !resp.is_success() {
        return Err(ScenarioError::Rejected { step: "set", status: resp.status });
    }

    let resp = up.delete(DELETION_KEY).await.map_err(ScenarioError::call("delete"))?;
    if !resp.is_success() {
        return Err(ScenarioError::Rejected { step: "delete", status: resp.status });
    }

    let resp = up.get(DELETION_KEY).await.map_err(ScenarioError::call("get"))?;
    if resp.status != StatusCode::NOT_FOUND.as_u16() {
        return Err(ScenarioError::StillExists);
    }

    Ok(passed("deletion"))
}

/// GET /test_overwrite: two sets on one key, the second must win.
pub async fn test_overwrite(State(state): State<ClientState>) -> Result<Json<serde_json::Value>, ScenarioError> {
    let up = &state.upstream;

    for value in [FIRST_VALUE, FINAL_VALUE] {
        let resp = up.set(OVERWRITE_KEY, value).await.map_err(ScenarioError::call("set"))?;
        if !resp.is_success() {
            return Err(ScenarioError::Rejected { step: "set", status: resp.status });
        }
    }

    let resp = up.get(OVERWRITE_KEY).await.map_err(ScenarioError::call("get"))?;
    let got = resp.value();
    if got != FINAL_VALUE {
        return Err(ScenarioError::WrongValue { expected: FINAL_VALUE, got });
    }

    Ok(passed("overwrite"))
}
