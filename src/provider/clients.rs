//! Concrete provider clients.

use super::{
    build_provider_http_client, failure_from_response, map_http_error, ChatMessage,
    CompletionOptions, CompletionResponse, ModelProviderClient, TokenUsage,
};
use crate::error::{ApiError, TransportFailure};
use crate::types::Role;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com/v1";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const OLLAMA_BASE_URL: &str = "http://localhost:11434";

// OpenAI-compatible API request/response structures
#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    stream: bool,
}

#[derive(Serialize, Deserialize)]
struct OpenAIMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    model: String,
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: OpenAIMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

/// POST an OpenAI-style chat completion and unpack the first choice.
async fn complete_openai_compatible(
    client: &Client,
    url: &str,
    bearer: Option<&str>,
    model: &str,
    messages: Vec<ChatMessage>,
    options: CompletionOptions,
) -> Result<CompletionResponse, TransportFailure> {
    let request = ChatCompletionRequest {
        model,
        messages: messages
            .into_iter()
            .map(|msg| OpenAIMessage {
                role: msg.role.as_str().to_string(),
                content: Some(msg.content),
            })
            .collect(),
        temperature: options.temperature,
        max_tokens: options.max_tokens,
        stream: false,
    };

    let mut builder = client
        .post(url)
        .header("Content-Type", "application/json")
        .json(&request);
    if let Some(key) = bearer {
        builder = builder.header("Authorization", format!("Bearer {}", key));
    }
    let response = builder.send().await.map_err(map_http_error)?;

    if !response.status().is_success() {
        return Err(failure_from_response(response).await);
    }

    let completion: ChatCompletionResponse = response
        .json()
        .await
        .map_err(|e| TransportFailure::Decode(format!("Failed to parse response: {}", e)))?;

    let choice = completion
        .choices
        .into_iter()
        .next()
        .ok_or(TransportFailure::EmptyBody)?;

    let usage = completion
        .usage
        .map(|u| TokenUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        })
        .unwrap_or_default();

    Ok(CompletionResponse {
        content: choice.message.content.unwrap_or_default(),
        model: completion.model,
        usage,
        finish_reason: choice.finish_reason,
    })
}

/// OpenAI provider client (also any OpenAI-compatible endpoint through `base_url`)
pub struct OpenAIClient {
    client: Client,
    model: String,
    api_key: String,
    base_url: String,
}

impl OpenAIClient {
    pub fn new(model: String, api_key: String, base_url: Option<String>) -> Result<Self, ApiError> {
        let client = build_provider_http_client()?;
        let base_url = base_url.unwrap_or_else(|| OPENAI_BASE_URL.to_string());

        Ok(Self {
            client,
            model,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ModelProviderClient for OpenAIClient {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        options: CompletionOptions,
    ) -> Result<CompletionResponse, TransportFailure> {
        let url = format!("{}/chat/completions", self.base_url);
        complete_openai_compatible(
            &self.client,
            &url,
            Some(&self.api_key),
            &self.model,
            messages,
            options,
        )
        .await
    }

    fn provider_name(&self) -> &str {
        "openai"
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Anthropic messages API client
pub struct AnthropicClient {
    client: Client,
    model: String,
    api_key: String,
    base_url: String,
}

impl AnthropicClient {
    pub fn new(model: String, api_key: String, base_url: Option<String>) -> Result<Self, ApiError> {
        let client = build_provider_http_client()?;
        let base_url = base_url.unwrap_or_else(|| ANTHROPIC_BASE_URL.to_string());
        Ok(Self {
            client,
            model,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ModelProviderClient for AnthropicClient {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        options: CompletionOptions,
    ) -> Result<CompletionResponse, TransportFailure> {
        // System turns (instruction and summaries) travel in the top-level `system` field.
        let system: Vec<&str> = messages
            .iter()
            .filter(|m| m.role == Role::System)
            .map(|m| m.content.as_str())
            .collect();

        let turns: Vec<_> = messages
            .iter()
            .filter(|m| m.role != Role::System)
            .map(|m| json!({"role": m.role.as_str(), "content": m.content}))
            .collect();

        let mut request_body = json!({
            "model": self.model,
            "max_tokens": options.max_tokens.unwrap_or(1024),
            "messages": turns,
        });
        if !system.is_empty() {
            request_body["system"] = json!(system.join("\n\n"));
        }
        if let Some(temp) = options.temperature {
            request_body["temperature"] = json!(temp);
        }

        let url = format!("{}/messages", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("Content-Type", "application/json")
            .json(&request_body)
            .send()
            .await
            .map_err(map_http_error)?;

        if !response.status().is_success() {
            return Err(failure_from_response(response).await);
        }

        #[derive(Deserialize)]
        struct AnthropicResponse {
            #[serde(default)]
            content: Vec<AnthropicContent>,
            #[serde(default)]
            model: String,
            usage: Option<AnthropicUsage>,
            stop_reason: Option<String>,
        }

        #[derive(Deserialize)]
        struct AnthropicContent {
            #[serde(default)]
            text: String,
        }

        #[derive(Deserialize)]
        struct AnthropicUsage {
            input_tokens: u32,
            output_tokens: u32,
        }

        let completion: AnthropicResponse = response
            .json()
            .await
            .map_err(|e| TransportFailure::Decode(format!("Failed to parse response: {}", e)))?;

        let content = completion
            .content
            .into_iter()
            .map(|c| c.text)
            .collect::<Vec<_>>()
            .join("");

        let usage = completion
            .usage
            .map(|u| TokenUsage {
                prompt_tokens: u.input_tokens,
                completion_tokens: u.output_tokens,
                total_tokens: u.input_tokens + u.output_tokens,
            })
            .unwrap_or_default();

        Ok(CompletionResponse {
            content,
            model: completion.model,
            usage,
            finish_reason: completion.stop_reason,
        })
    }

    fn provider_name(&self) -> &str {
        "anthropic"
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Ollama provider client (local models)
pub struct OllamaClient {
    client: Client,
    model: String,
    base_url: String,
}

impl OllamaClient {
    pub fn new(model: String, base_url: Option<String>) -> Result<Self, ApiError> {
        let base_url = base_url.unwrap_or_else(|| OLLAMA_BASE_URL.to_string());
        let client = build_provider_http_client()?;

        Ok(Self {
            client,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ModelProviderClient for OllamaClient {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        options: CompletionOptions,
    ) -> Result<CompletionResponse, TransportFailure> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        complete_openai_compatible(&self.client, &url, None, &self.model, messages, options).await
    }

    fn provider_name(&self) -> &str {
        "ollama"
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Custom local server speaking the OpenAI chat format at a full endpoint URL
pub struct LocalCustomClient {
    client: Client,
    model: String,
    endpoint: String,
    api_key: Option<String>,
}

impl LocalCustomClient {
    pub fn new(model: String, endpoint: String, api_key: Option<String>) -> Result<Self, ApiError> {
        let client = build_provider_http_client()?;
        Ok(Self {
            client,
            model,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key,
        })
    }
}

#[async_trait]
impl ModelProviderClient for LocalCustomClient {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        options: CompletionOptions,
    ) -> Result<CompletionResponse, TransportFailure> {
        let url = format!("{}/chat/completions", self.endpoint);
        complete_openai_compatible(
            &self.client,
            &url,
            self.api_key.as_deref(),
            &self.model,
            messages,
            options,
        )
        .await
    }

    fn provider_name(&self) -> &str {
        "local"
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Client used when no provider is configured; every call is unreachable.
#[derive(Debug, Default)]
pub struct OfflineClient;

#[async_trait]
impl ModelProviderClient for OfflineClient {
    async fn complete(
        &self,
        _messages: Vec<ChatMessage>,
        _options: CompletionOptions,
    ) -> Result<CompletionResponse, TransportFailure> {
        Err(TransportFailure::Unreachable(
            "no provider configured".to_string(),
        ))
    }

    fn provider_name(&self) -> &str {
        "offline"
    }

    fn model_name(&self) -> &str {
        "none"
    }
}
