//! API route handlers.

use std::time::Instant;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sketch_core::{generate_or_fallback, AiResponse};

use crate::metrics;
use crate::AppState;

/// Longest prompt accepted, in characters.
pub const MAX_PROMPT_CHARS: usize = 4000;

/// Successful generation response.
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// Always `true`.
    pub success: bool,
    /// The diagram.
    pub data: AiResponse,
    /// Whether `data` is the fallback diagram.
    pub fallback: bool,
}

/// Error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Always `false`.
    pub success: bool,
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable message.
    pub message: String,
}

impl ErrorResponse {
    fn invalid_prompt() -> (StatusCode, Json<Self>) {
        (
            StatusCode::BAD_REQUEST,
            Json(Self {
                success: false,
                error: "INVALID_PROMPT".to_string(),
                message: "Please provide a valid prompt.".to_string(),
            }),
        )
    }
}

/// Extract a usable prompt from a request body.
///
/// The body must be a JSON object whose `prompt` is a non-blank string no
/// longer than [`MAX_PROMPT_CHARS`]. The prompt is trimmed.
#[must_use]
pub fn extract_prompt(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    let prompt = value.get("prompt")?.as_str()?.trim();
    if prompt.is_empty() || prompt.chars().count() > MAX_PROMPT_CHARS {
        return None;
    }
    Some(prompt.to_string())
}

/// `POST /api/generate-sketch`: turn a prompt into a diagram.
///
/// Generator failures never surface as errors; the fallback diagram is
/// served with `fallback: true`.
#[tracing::instrument(name = "generate_sketch", skip(state, body))]
pub async fn generate_sketch(State(state): State<AppState>, body: Bytes) -> Response {
    let Some(prompt) = extract_prompt(&body) else {
        tracing::debug!("Rejected generate request with invalid prompt");
        metrics::record_invalid_prompt();
        return ErrorResponse::invalid_prompt().into_response();
    };

    let start = Instant::now();
    let generation = generate_or_fallback(state.generator.as_ref(), &prompt).await;
    metrics::record_generation(generation.fallback, start.elapsed().as_secs_f64());

    Json(GenerateResponse {
        success: true,
        data: generation.response,
        fallback: generation.fallback,
    })
    .into_response()
}
