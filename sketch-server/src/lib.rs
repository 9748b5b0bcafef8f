//! # System Sketch Server Library
//!
//! Router, state and handlers for the sketch server.
//! This library is used by both the binary and integration tests.
//!
//! ## Routes
//!
//! | Method | Path                   | Purpose                              |
//! |--------|------------------------|--------------------------------------|
//! | POST   | `/api/generate-sketch` | Prompt to diagram (fallback on error) |
//! | GET    | `/health/live`         | Liveness probe                       |
//! | GET    | `/health/ready`        | Readiness probe                      |
//! | GET    | `/metrics`             | Prometheus exposition                |
//! | GET    | `/*`                   | Static web client                    |

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use sketch_core::DiagramGenerator;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

pub mod config;
pub mod generator;
pub mod health;
pub mod metrics;
pub mod routes;

pub use config::{CliArgs, ServerConfig};
pub use generator::{GeneratorConfigError, HttpGenerator, UnconfiguredGenerator};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Diagram source.
    pub generator: Arc<dyn DiagramGenerator>,
    /// Whether `generator` talks to a real upstream.
    pub generator_configured: bool,
    /// Static web client directory, if served.
    pub web_dir: Option<PathBuf>,
}

impl AppState {
    /// State around an explicit generator.
    #[must_use]
    pub fn new(generator: Arc<dyn DiagramGenerator>) -> Self {
        Self {
            generator,
            generator_configured: true,
            web_dir: None,
        }
    }

    /// Build state from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured generator URL is invalid.
    pub fn from_config(config: &ServerConfig) -> Result<Self, GeneratorConfigError> {
        let (generator, configured): (Arc<dyn DiagramGenerator>, bool) = match &config.generator_url {
            Some(url) => (
                Arc::new(HttpGenerator::new(
                    url,
                    config.generator_key.clone(),
                    config.request_timeout,
                )?),
                true,
            ),
            None => {
                tracing::warn!("No generator URL configured; every request will use the fallback diagram");
                (Arc::new(UnconfiguredGenerator), false)
            }
        };
        Ok(Self {
            generator,
            generator_configured: configured,
            web_dir: Some(config.web_dir.clone()),
        })
    }
}

/// Build a CORS layer that only allows localhost origins.
///
/// The server is designed to run on localhost only.
#[must_use]
pub fn build_cors_layer(port: u16) -> CorsLayer {
    let localhost_origins = [
        format!("http://localhost:{port}"),
        format!("http://127.0.0.1:{port}"),
        // Common development server ports
        "http://localhost:3000".to_string(),
        "http://localhost:5173".to_string(),
        "http://localhost:8080".to_string(),
        "http://127.0.0.1:3000".to_string(),
        "http://127.0.0.1:5173".to_string(),
        "http://127.0.0.1:8080".to_string(),
    ];

    let origins: Vec<HeaderValue> = localhost_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
}

/// Build the application router.
///
/// `/metrics` is only mounted when a Prometheus handle is given.
pub fn build_router(state: AppState, port: u16, metrics_handle: Option<PrometheusHandle>) -> Router {
    let mut app = Router::new()
        .route("/api/generate-sketch", post(routes::generate_sketch))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .route("/health", get(health::readiness));

    if let Some(handle) = metrics_handle {
        let metrics_router = Router::new()
            .route("/metrics", get(metrics::metrics_handler))
            .with_state(handle);
        app = app.merge(metrics_router);
    }

    if let Some(dir) = &state.web_dir {
        tracing::info!("Serving web files from: {:?}", dir);
        app = app.fallback_service(ServeDir::new(dir));
    }

    app.layer(middleware::from_fn(metrics::track_http))
        // Request ID for tracing correlation
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(build_cors_layer(port))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}
