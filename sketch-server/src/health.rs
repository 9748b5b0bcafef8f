//! Health check endpoints for container probes.
//!
//! - `/health/live` - Liveness probe (restart if fails)
//! - `/health/ready` - Readiness probe (remove from LB if fails)
//! - `/health` - Same as ready

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::AppState;

/// Health status response.
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    /// Overall status: "healthy" or "degraded"
    pub status: &'static str,
    /// Server version
    pub version: &'static str,
    /// Individual component checks
    pub checks: HealthChecks,
}

/// Individual health checks.
#[derive(Debug, Serialize)]
pub struct HealthChecks {
    /// An upstream generator is configured
    pub generator: bool,
    /// Static web client directory exists
    pub web_dir: bool,
}

/// Liveness probe - is the server running?
#[tracing::instrument(name = "liveness_probe")]
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// Readiness probe - is the server ready to accept traffic?
///
/// Always 200: without a generator every request still gets the fallback
/// diagram. Missing pieces report `degraded`.
#[tracing::instrument(name = "readiness_probe", skip(state))]
pub async fn readiness(State(state): State<AppState>) -> (StatusCode, Json<HealthStatus>) {
    let checks = HealthChecks {
        generator: state.generator_configured,
        web_dir: state.web_dir.as_ref().is_some_and(|dir| dir.is_dir()),
    };
    let status = if checks.generator && checks.web_dir {
        "healthy"
    } else {
        "degraded"
    };

    (
        StatusCode::OK,
        Json(HealthStatus {
            status,
            version: env!("CARGO_PKG_VERSION"),
            checks,
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_status_serialization() {
        let status = HealthStatus {
            status: "healthy",
            version: "0.1.0",
            checks: HealthChecks {
                generator: true,
                web_dir: true,
            },
        };

        let json = serde_json::to_string(&status).expect("should serialize");
        assert!(json.contains("healthy"));
        assert!(json.contains("0.1.0"));
        assert!(json.contains("\"generator\":true"));
        assert!(json.contains("\"web_dir\":true"));
    }
}
