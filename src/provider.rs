//! Model Provider Abstraction
//!
//! Unified interface for the generative-text back-ends that produce turn content
//! (OpenAI-compatible services, Anthropic, Ollama, custom local servers). Every client
//! reports failures as [`TransportFailure`] so the orchestrator can degrade uniformly.

use crate::error::{ApiError, TransportFailure};
use crate::types::Role;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub mod clients;
pub mod profile;

pub use clients::{AnthropicClient, LocalCustomClient, OfflineClient, OllamaClient, OpenAIClient};
pub use profile::{ProviderConfig, ProviderFactory, ProviderType};

/// Chat message sent to a provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Completion options
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompletionOptions {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            temperature: Some(1.0),
            max_tokens: None,
        }
    }
}

/// Token usage information
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Completion response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub content: String,
    pub model: String,
    pub usage: TokenUsage,
    pub finish_reason: Option<String>,
}

/// Model provider client trait
#[async_trait]
pub trait ModelProviderClient: Send + Sync {
    /// Generate a completion from a list of messages
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        options: CompletionOptions,
    ) -> Result<CompletionResponse, TransportFailure>;

    /// Get the provider name
    fn provider_name(&self) -> &str;

    /// Get the model name
    fn model_name(&self) -> &str;
}

const PROVIDER_HTTP_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const PROVIDER_HTTP_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

pub(crate) fn build_provider_http_client() -> Result<Client, ApiError> {
    Client::builder()
        .no_proxy()
        .connect_timeout(PROVIDER_HTTP_CONNECT_TIMEOUT)
        .timeout(PROVIDER_HTTP_REQUEST_TIMEOUT)
        .build()
        .map_err(|e| ApiError::ProviderError(format!("Failed to create HTTP client: {}", e)))
}

/// Map a reqwest transport error to a [`TransportFailure`]
pub(crate) fn map_http_error(error: reqwest::Error) -> TransportFailure {
    if let Some(status) = error.status() {
        map_status(status.as_u16(), error.to_string())
    } else if error.is_timeout() {
        TransportFailure::Timeout(PROVIDER_HTTP_REQUEST_TIMEOUT)
    } else if error.is_decode() {
        TransportFailure::Decode(error.to_string())
    } else {
        TransportFailure::Unreachable(error.to_string())
    }
}

/// Map a non-success HTTP status and its body to a [`TransportFailure`]
pub(crate) fn map_status(status: u16, body: String) -> TransportFailure {
    match status {
        401 | 403 => TransportFailure::Auth(body),
        429 => TransportFailure::RateLimit(body),
        _ => TransportFailure::Status { status, body },
    }
}

/// Read the body of a failed response and map it.
pub(crate) async fn failure_from_response(response: reqwest::Response) -> TransportFailure {
    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    map_status(status, body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_map_to_failures() {
        assert!(matches!(map_status(401, "no".into()), TransportFailure::Auth(_)));
        assert!(matches!(map_status(403, "no".into()), TransportFailure::Auth(_)));
        assert!(matches!(
            map_status(429, "slow down".into()),
            TransportFailure::RateLimit(_)
        ));
        assert_eq!(
            map_status(503, "busy".into()),
            TransportFailure::Status {
                status: 503,
                body: "busy".into()
            }
        );
    }

    #[test]
    fn default_options_use_unit_temperature() {
        let options = CompletionOptions::default();
        assert_eq!(options.temperature, Some(1.0));
        assert_eq!(options.max_tokens, None);
    }
}
