//! Upstream diagram generators.
//!
//! [`HttpGenerator`] posts the prompt to a configured endpoint and parses
//! whatever text comes back as a diagram. [`UnconfiguredGenerator`] stands in
//! when no endpoint is set, so every request gets the fallback diagram.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use sketch_core::{AiResponse, DiagramGenerator, GenerateError};
use thiserror::Error;
use url::Url;

/// Errors building a generator client.
#[derive(Debug, Error)]
pub enum GeneratorConfigError {
    /// The configured URL is invalid.
    #[error("invalid generator URL: {0}")]
    InvalidUrl(String),
    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    prompt: &'a str,
}

/// Calls an HTTP endpoint that answers a prompt with diagram JSON.
#[derive(Debug, Clone)]
pub struct HttpGenerator {
    http: Client,
    endpoint: Url,
    api_key: Option<String>,
}

impl HttpGenerator {
    /// Create a generator for `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorConfigError::InvalidUrl`] if the URL is malformed or
    /// not http(s), and [`GeneratorConfigError::Client`] if the HTTP client
    /// fails to build.
    pub fn new(
        endpoint: impl AsRef<str>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, GeneratorConfigError> {
        let endpoint = Url::parse(endpoint.as_ref())
            .map_err(|e| GeneratorConfigError::InvalidUrl(e.to_string()))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(GeneratorConfigError::InvalidUrl(format!(
                "unsupported scheme: {}",
                endpoint.scheme()
            )));
        }

        let http = Client::builder()
            .user_agent(concat!("sketch-server/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            endpoint,
            api_key,
        })
    }

    /// The endpoint requests go to.
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl DiagramGenerator for HttpGenerator {
    #[tracing::instrument(name = "http_generate", skip(self, prompt), fields(endpoint = %self.endpoint))]
    async fn generate(&self, prompt: &str) -> Result<AiResponse, GenerateError> {
        let mut request = self
            .http
            .post(self.endpoint.clone())
            .json(&GenerateRequest { prompt });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| GenerateError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GenerateError::Status(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| GenerateError::Transport(e.to_string()))?;
        tracing::debug!("Generator answered with {} bytes", body.len());

        Ok(AiResponse::parse(&body)?)
    }
}

/// Generator used when no upstream is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredGenerator;

#[async_trait]
impl DiagramGenerator for UnconfiguredGenerator {
    async fn generate(&self, _prompt: &str) -> Result<AiResponse, GenerateError> {
        Err(GenerateError::Unavailable)
    }
}
