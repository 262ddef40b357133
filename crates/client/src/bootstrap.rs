use std::net::SocketAddr;

use common::utils::logging::init_logging_json;
use configs::AppConfig;
use dotenvy::dotenv;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::routes::{build_router, ClientState};
use crate::upstream::KvServiceClient;

fn init_tracing() { init_logging_json(); }

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl+C; serving until killed");
        std::future::pending::<()>().await;
    }
    info!(event = "shutdown_signal", "received Ctrl+C, shutting down");
}

pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    init_tracing();

    // Load configuration
    let config = AppConfig::load_and_validate()?;
    info!(upstream = %config.client.upstream_url, retry = ?config.client.retry, "Loaded configuration");

    let upstream = KvServiceClient::from_config(&config.client)?;
    let app = build_router(ClientState::new(upstream));

    let addr: SocketAddr = config.client.bind_addr().parse()?;
    info!(%addr, "Test Client listening");
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
