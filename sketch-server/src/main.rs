//! # System Sketch Server
//!
//! Serves the web client and the diagram generation endpoint.
//! Binds to localhost by default.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use sketch_server::{build_router, metrics, AppState, CliArgs, ServerConfig};

/// Initialize structured tracing with optional JSON format.
///
/// Set `RUST_LOG` to control log levels (default: info,sketch_server=debug,tower_http=debug).
/// Set `RUST_LOG_FORMAT=json` for JSON output.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sketch_server=debug,tower_http=debug"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true);

    if std::env::var("RUST_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::from(CliArgs::parse());
    init_tracing();

    let metrics_handle = metrics::init_metrics()
        .map_err(|e| anyhow::anyhow!("Failed to initialize Prometheus metrics: {}", e))?;
    tracing::info!("Prometheus metrics initialized");

    let state = AppState::from_config(&config)?;
    if let Some(url) = &config.generator_url {
        tracing::info!("Diagram generator: {}", url);
    }

    let app = build_router(state, config.port, Some(metrics_handle));

    let addr = config.addr();
    if !addr.ip().is_loopback() {
        tracing::warn!("Binding to non-loopback address {}", addr);
    }
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("System Sketch server starting on http://{}", addr);
    tracing::info!("Open http://localhost:{} in your browser", config.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
