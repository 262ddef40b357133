use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::proxy;
use crate::scenarios;
use crate::upstream::KvServiceClient;

#[derive(Clone)]
pub struct ClientState {
    pub upstream: Arc<KvServiceClient>,
}

impl ClientState {
    pub fn new(upstream: KvServiceClient) -> Self {
        Self { upstream: Arc::new(upstream) }
    }
}

pub fn build_router(state: ClientState) -> Router {
    Router::new()
        .route(
            "/kv/:key",
            get(proxy::forward).patch(proxy::forward).delete(proxy::forward),
        )
        .route("/test_deletion", get(scenarios::test_deletion))
        .route("/test_overwrite", get(scenarios::test_overwrite))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
