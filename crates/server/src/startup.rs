use std::net::SocketAddr;

use axum::Router;
use common::utils::logging::init_logging_default;
use configs::AppConfig;
use dotenvy::dotenv;
use store::{observability, StoreOwner};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::errors::StartupError;
use crate::routes;
use crate::state::ServerState;

/// Initialize logging via shared common utils
fn init_logging() {
    init_logging_default();
}

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Load configuration from config.toml and env vars
pub fn load_config() -> Result<AppConfig, StartupError> {
    AppConfig::load_and_validate().map_err(|e| StartupError::InvalidConfig(e.to_string()))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl+C; serving until killed");
        std::future::pending::<()>().await;
    }
    info!(event = "shutdown_signal", "received Ctrl+C, shutting down");
}

/// Public entry: spawn the store owner, build the app and run the HTTP server
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging();

    let cfg = load_config()?;
    observability::init();

    // single owner of the map; the handle is the only way in
    let (handle, owner) = StoreOwner::spawn(cfg.store.channel_capacity, cfg.store.request_timeout());
    info!(
        channel_capacity = cfg.store.channel_capacity,
        request_timeout_ms = cfg.store.request_timeout_ms,
        "store owner spawned"
    );

    let app: Router = routes::build_router(ServerState::from_handle(handle), build_cors());

    let addr: SocketAddr = cfg.server.bind_addr().parse()?;
    info!(%addr, "KV service listening");
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // the router (and with it every handle) is gone, so the owner loop drains and exits
    if let Err(e) = owner.await {
        warn!(error = %e, "store owner task ended abnormally");
    }
    info!(event = "stop", "kv service stopped");
    Ok(())
}
