use axum::{
    http::StatusCode,
    routing::{any, get},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{TraceLayer, DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, DefaultOnFailure},
};
use tracing::Level;

use common::{metrics, types::Health};

use crate::state::ServerState;

pub mod kv;

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

async fn metrics_handler() -> (StatusCode, String) {
    metrics::encode_metrics()
}

/// Build the full application router: health, metrics and the kv collection.
pub fn build_router(state: ServerState, cors: CorsLayer) -> Router {
    let kv_routes = Router::new()
        .route(
            "/kv/:key",
            get(kv::get_key)
                .patch(kv::set_key)
                .delete(kv::delete_key)
                .fallback(kv::method_not_allowed),
        )
        // the key is always known, so nothing is accepted on the collection itself
        .route("/kv", any(kv::method_not_allowed))
        .route("/kv/", any(kv::method_not_allowed));

    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics_handler))
        .merge(kv_routes)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                // 每次请求创建 span，包含方法和路径等，日志级别为 INFO
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(
                    DefaultOnRequest::new()
                        .level(Level::INFO),
                )
                // 响应返回时打点，包含状态码与耗时
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                // 失败（5xx 等）时以 ERROR 记录
                .on_failure(
                    DefaultOnFailure::new()
                        .level(Level::ERROR),
                )
        )
}
