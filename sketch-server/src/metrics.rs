//! Prometheus metrics for sketch-server.
//!
//! Provides metrics collection, a request-tracking middleware and a
//! Prometheus-compatible `/metrics` endpoint.

use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

// Metric names as constants for consistency
const HTTP_REQUESTS_TOTAL: &str = "sketch_http_requests_total";
const HTTP_REQUEST_DURATION: &str = "sketch_http_request_duration_seconds";
const GENERATIONS_TOTAL: &str = "sketch_generations_total";
const GENERATION_DURATION: &str = "sketch_generation_duration_seconds";
const INVALID_PROMPTS_TOTAL: &str = "sketch_invalid_prompts_total";
const UNMATCHED_ROUTE: &str = "fallback";

/// Initialize metrics and return the Prometheus handle.
///
/// # Errors
///
/// Returns an error if the Prometheus recorder cannot be installed
/// (e.g., if another recorder is already installed).
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Record an HTTP request.
///
/// # Arguments
///
/// * `method` - HTTP method (GET, POST, etc.)
/// * `path` - Route pattern, or the raw path when unrouted
/// * `status` - HTTP status code
/// * `duration_secs` - Request duration in seconds
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    counter!(
        HTTP_REQUESTS_TOTAL,
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!(
        HTTP_REQUEST_DURATION,
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .record(duration_secs);
}

/// Record a finished diagram generation.
///
/// # Arguments
///
/// * `fallback` - Whether the fallback diagram was served
/// * `duration_secs` - Time spent waiting on the generator
pub fn record_generation(fallback: bool, duration_secs: f64) {
    let outcome = if fallback { "fallback" } else { "generated" };
    counter!(GENERATIONS_TOTAL, "outcome" => outcome).increment(1);
    histogram!(GENERATION_DURATION, "outcome" => outcome).record(duration_secs);
}

/// Record a rejected prompt.
pub fn record_invalid_prompt() {
    counter!(INVALID_PROMPTS_TOTAL).increment(1);
}

/// Path label for a request. Unrouted paths share one label so scanners
/// cannot grow the series set.
fn route_label(matched: Option<&MatchedPath>) -> &str {
    matched.map_or(UNMATCHED_ROUTE, MatchedPath::as_str)
}

/// Middleware recording method, route, status and latency of every request.
pub async fn track_http(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let path = route_label(request.extensions().get::<MatchedPath>()).to_string();

    let response = next.run(request).await;
    record_http_request(
        &method,
        &path,
        response.status().as_u16(),
        start.elapsed().as_secs_f64(),
    );
    response
}

/// Prometheus metrics endpoint.
#[tracing::instrument(name = "metrics", skip(handle))]
pub async fn metrics_handler(State(handle): State<PrometheusHandle>) -> impl IntoResponse {
    handle.render()
}

#[cfg(test)]
mod tests {
    use super::*;
    use metrics_exporter_prometheus::PrometheusBuilder;

    #[test]
    fn generation_counters_render() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        metrics::with_local_recorder(&recorder, || {
            record_generation(false, 0.25);
            record_generation(true, 0.01);
            record_generation(true, 0.02);
            record_invalid_prompt();
        });

        let text = handle.render();
        assert!(text.contains("sketch_generations_total{outcome=\"generated\"} 1"));
        assert!(text.contains("sketch_generations_total{outcome=\"fallback\"} 2"));
        assert!(text.contains("sketch_invalid_prompts_total 1"));
    }

    #[test]
    fn http_counter_carries_labels() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        metrics::with_local_recorder(&recorder, || {
            record_http_request("POST", "/api/generate-sketch", 400, 0.001);
        });

        let text = handle.render();
        assert!(text.contains("sketch_http_requests_total{"));
        assert!(text.contains("path=\"/api/generate-sketch\""));
        assert!(text.contains("status=\"400\""));
    }

    #[test]
    fn unrouted_requests_share_one_label() {
        assert_eq!(route_label(None), "fallback");

        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        metrics::with_local_recorder(&recorder, || {
            for _ in 0..3 {
                record_http_request("GET", route_label(None), 404, 0.001);
            }
        });

        let text = handle.render();
        let series: Vec<&str> = text
            .lines()
            .filter(|l| l.starts_with("sketch_http_requests_total{"))
            .collect();
        assert_eq!(series.len(), 1);
        assert!(series[0].contains("path=\"fallback\""));
        assert!(series[0].ends_with(" 3"));
    }
}
