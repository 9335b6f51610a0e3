//! Provider profile: which back-end to call and how to reach it.

use super::{
    AnthropicClient, LocalCustomClient, ModelProviderClient, OfflineClient, OllamaClient,
    OpenAIClient,
};
use crate::error::ApiError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const OPENAI_KEY_ENV: &str = "OPENAI_API_KEY";
const ANTHROPIC_KEY_ENV: &str = "ANTHROPIC_API_KEY";

/// Provider back-end kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    OpenAI,
    Anthropic,
    Ollama,
    #[serde(rename = "local")]
    LocalCustom,
    /// No provider; every turn is produced by the fallback engine.
    #[default]
    Offline,
}

/// `[provider]` configuration section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub provider_type: ProviderType,

    #[serde(default = "default_model")]
    pub model: String,

    /// Falls back to OPENAI_API_KEY / ANTHROPIC_API_KEY
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL (OpenAI, Anthropic, Ollama) or full endpoint (local)
    #[serde(default)]
    pub endpoint: Option<String>,
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider_type: ProviderType::Offline,
            model: default_model(),
            api_key: None,
            endpoint: None,
        }
    }
}

impl ProviderConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.provider_type != ProviderType::Offline && self.model.trim().is_empty() {
            return Err("Model name cannot be empty".to_string());
        }
        if self.provider_type == ProviderType::LocalCustom && self.endpoint.is_none() {
            return Err("Local provider requires an endpoint".to_string());
        }
        if let Some(endpoint) = &self.endpoint {
            if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                return Err(format!("Endpoint must be an http(s) URL: {}", endpoint));
            }
        }
        Ok(())
    }

    /// Configured key, or the provider's conventional environment variable.
    pub fn resolve_api_key(&self) -> Option<String> {
        if let Some(key) = self.api_key.as_ref().filter(|k| !k.is_empty()) {
            return Some(key.clone());
        }
        let env_name = match self.provider_type {
            ProviderType::OpenAI | ProviderType::LocalCustom => OPENAI_KEY_ENV,
            ProviderType::Anthropic => ANTHROPIC_KEY_ENV,
            ProviderType::Ollama | ProviderType::Offline => return None,
        };
        std::env::var(env_name).ok().filter(|k| !k.is_empty())
    }
}

/// Builds provider clients from configuration
pub struct ProviderFactory;

impl ProviderFactory {
    pub fn create_client(config: &ProviderConfig) -> Result<Arc<dyn ModelProviderClient>, ApiError> {
        config.validate().map_err(ApiError::ConfigError)?;

        let client: Arc<dyn ModelProviderClient> = match config.provider_type {
            ProviderType::OpenAI => {
                let api_key = config.resolve_api_key().ok_or_else(|| {
                    ApiError::ProviderNotConfigured(format!(
                        "openai provider needs api_key or {}",
                        OPENAI_KEY_ENV
                    ))
                })?;
                Arc::new(OpenAIClient::new(
                    config.model.clone(),
                    api_key,
                    config.endpoint.clone(),
                )?)
            }
            ProviderType::Anthropic => {
                let api_key = config.resolve_api_key().ok_or_else(|| {
                    ApiError::ProviderNotConfigured(format!(
                        "anthropic provider needs api_key or {}",
                        ANTHROPIC_KEY_ENV
                    ))
                })?;
                Arc::new(AnthropicClient::new(
                    config.model.clone(),
                    api_key,
                    config.endpoint.clone(),
                )?)
            }
            ProviderType::Ollama => Arc::new(OllamaClient::new(
                config.model.clone(),
                config.endpoint.clone(),
            )?),
            ProviderType::LocalCustom => {
                let endpoint = config.endpoint.clone().ok_or_else(|| {
                    ApiError::ProviderNotConfigured("local provider needs endpoint".to_string())
                })?;
                Arc::new(LocalCustomClient::new(
                    config.model.clone(),
                    endpoint,
                    config.resolve_api_key(),
                )?)
            }
            ProviderType::Offline => Arc::new(OfflineClient),
        };
        Ok(client)
    }
}
