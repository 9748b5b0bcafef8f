//! Serves the router on a real socket and talks to it over HTTP.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use sketch_server::{build_router, AppState, ServerConfig};

async fn spawn_server(config: ServerConfig) -> SocketAddr {
    let state = AppState::from_config(&config).expect("state");
    let handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .build_recorder()
        .handle();
    let app = build_router(state, config.port, Some(handle));
    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(addr).await.expect("bind");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    addr
}

fn local_config() -> ServerConfig {
    let port = portpicker::pick_unused_port().expect("free port");
    ServerConfig {
        port,
        bind: IpAddr::V4(Ipv4Addr::LOCALHOST),
        request_timeout: Duration::from_secs(2),
        ..ServerConfig::new()
    }
}

#[tokio::test]
#[cfg_attr(
    target_os = "macos",
    ignore = "wiremock/reqwest system-configuration issue on macOS"
)]
async fn test_live_server_answers_probes_and_prompts() {
    let addr = spawn_server(local_config()).await;
    let client = reqwest::Client::new();

    let live = client
        .get(format!("http://{addr}/health/live"))
        .send()
        .await
        .expect("live");
    assert!(live.status().is_success());

    let body: serde_json::Value = client
        .post(format!("http://{addr}/api/generate-sketch"))
        .json(&serde_json::json!({ "prompt": "url shortener" }))
        .send()
        .await
        .expect("generate")
        .json()
        .await
        .expect("json");
    assert_eq!(body["success"], true);
    assert_eq!(body["fallback"], true);

    let metrics = client
        .get(format!("http://{addr}/metrics"))
        .send()
        .await
        .expect("metrics");
    assert!(metrics.status().is_success());
}

#[tokio::test]
#[cfg_attr(
    target_os = "macos",
    ignore = "wiremock/reqwest system-configuration issue on macOS"
)]
async fn test_live_server_rejects_blank_prompt() {
    let addr = spawn_server(local_config()).await;
    let response = reqwest::Client::new()
        .post(format!("http://{addr}/api/generate-sketch"))
        .json(&serde_json::json!({ "prompt": "" }))
        .send()
        .await
        .expect("generate");
    assert_eq!(response.status().as_u16(), 400);
}
