use std::collections::HashSet;
use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use reqwest::StatusCode as HttpStatusCode;
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

use server::{routes, ServerState};
use store::StoreOwner;

struct TestApp {
    base_url: String,
}

async fn start_server() -> anyhow::Result<TestApp> {
    let (handle, _owner) = StoreOwner::spawn(1, Duration::from_secs(5));
    let app: Router = routes::build_router(ServerState::from_handle(handle), CorsLayer::very_permissive());

    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    let base_url = format!("http://{}:{}", addr.ip(), addr.port());

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await { eprintln!("server error: {}", e); }
    });

    Ok(TestApp { base_url })
}

#[tokio::test]
async fn e2e_public_health() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = reqwest::get(format!("{}/health", app.base_url)).await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn e2e_set_get_delete_cycle() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = reqwest::Client::new();
    let url = format!("{}/kv/robin", app.base_url);

    let res = c.patch(&url).json(&json!({"value": "dickGrayson"})).send().await?;
    assert_eq!(res.status(), HttpStatusCode::CREATED);

    let res = c.patch(&url).json(&json!({"value": "jasonTodd"})).send().await?;
    assert_eq!(res.status(), HttpStatusCode::CREATED);

    let res = c.get(&url).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert_eq!(res.json::<serde_json::Value>().await?, json!({"key": "robin", "value": "jasonTodd"}));

    let res = c.delete(&url).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);

    let res = c.get(&url).send().await?;
    assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);

    let res = c.delete(&url).send().await?;
    assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn e2e_concurrent_writers_single_winner() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = reqwest::Client::new();
    let url = format!("{}/kv/gotham", app.base_url);
    let sent: HashSet<String> = (0..24).map(|i| format!("hero-{i}")).collect();

    let mut tasks = Vec::new();
    for value in sent.iter().cloned() {
        let c = c.clone();
        let url = url.clone();
        tasks.push(tokio::spawn(async move {
            c.patch(&url).json(&json!({ "value": value })).send().await
        }));
    }
    for task in tasks {
        let res = task.await??;
        assert_eq!(res.status(), HttpStatusCode::CREATED);
    }

    let body = c.get(&url).send().await?.json::<serde_json::Value>().await?;
    let winner = body["value"].as_str().unwrap_or_default().to_string();
    assert!(sent.contains(&winner), "unexpected winner {winner:?}");
    Ok(())
}
