//! Transport-level client trait and the default HTTP implementation.
//!
//! [`LlmClient`] is deliberately narrow — one method, a message list in,
//! raw text out — so the adapter's retry and gating logic never has to
//! know which provider it's talking to.

use async_trait::async_trait;
use thiserror::Error;

use crate::message::Message;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("rate limited")]
    RateLimited,
    #[error("server error ({status})")]
    ServerError { status: u16 },
    #[error("request timed out")]
    Timeout,
    #[error("transport error: {0}")]
    Other(String),
}

impl TransportError {
    /// Transport errors the adapter's own retry loop should retry on.
    /// Anything else (auth failures, malformed requests) is retried by
    /// the caller.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited | Self::ServerError { .. } | Self::Timeout)
    }
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, messages: &[Message]) -> Result<String, TransportError>;
}

/// Talks to an OpenAI-compatible chat-completions endpoint. The base
/// URL, model and API key are resolved from the environment by the CLI
/// layer and passed in here — this struct performs no env lookups
/// itself, so it stays trivially testable against a mock server.
pub struct HttpLlmClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl HttpLlmClient {
    #[must_use]
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }
}

#[async_trait]
impl LlmClient for HttpLlmClient {
    async fn complete(&self, messages: &[Message]) -> Result<String, TransportError> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": messages,
        });
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TransportError::Timeout
                } else {
                    TransportError::Other(e.to_string())
                }
            })?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(TransportError::RateLimited);
        }
        if status.is_server_error() {
            return Err(TransportError::ServerError { status: status.as_u16() });
        }
        if !status.is_success() {
            return Err(TransportError::Other(format!("unexpected status {status}")));
        }

        let payload: serde_json::Value = response
            .json()
            .await
            .map_err(|e| TransportError::Other(e.to_string()))?;
        payload["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| TransportError::Other("response missing choices[0].message.content".to_string()))
    }
}
