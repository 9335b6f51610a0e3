//! Generation client: one bounded-time provider call per request.

use crate::context::summarizer::{NarrativeCompressor, SummaryConfig};
use crate::error::TransportFailure;
use crate::generation::prompts;
use crate::provider::{ChatMessage, CompletionOptions, ModelProviderClient};
use crate::types::{ContextEntry, Role};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// `[generation]` configuration section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Opening turns build a whole world and get a longer deadline
    #[serde(default = "default_initial_timeout_secs")]
    pub initial_timeout_secs: u64,
    #[serde(default = "default_turn_timeout_secs")]
    pub turn_timeout_secs: u64,
}

fn default_temperature() -> f32 {
    0.85
}

fn default_max_tokens() -> u32 {
    16000
}

fn default_initial_timeout_secs() -> u64 {
    60
}

fn default_turn_timeout_secs() -> u64 {
    30
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            initial_timeout_secs: default_initial_timeout_secs(),
            turn_timeout_secs: default_turn_timeout_secs(),
        }
    }
}

impl GenerationConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(format!(
                "temperature must be in [0, 2], got {}",
                self.temperature
            ));
        }
        if self.max_tokens == 0 {
            return Err("max_tokens must be positive".to_string());
        }
        if self.initial_timeout_secs == 0 || self.turn_timeout_secs == 0 {
            return Err("timeouts must be positive".to_string());
        }
        Ok(())
    }

    pub fn initial_limits(&self) -> Limits {
        Limits {
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            timeout: Duration::from_secs(self.initial_timeout_secs),
        }
    }

    pub fn turn_limits(&self) -> Limits {
        Limits {
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            timeout: Duration::from_secs(self.turn_timeout_secs),
        }
    }
}

/// Per-call sampling and deadline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Limits {
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl From<&SummaryConfig> for Limits {
    fn from(config: &SummaryConfig) -> Self {
        Self {
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

pub struct GenerationClient {
    provider: Arc<dyn ModelProviderClient>,
    summary_limits: Limits,
}

impl GenerationClient {
    pub fn new(provider: Arc<dyn ModelProviderClient>, summary_limits: Limits) -> Self {
        Self {
            provider,
            summary_limits,
        }
    }

    pub fn provider(&self) -> &Arc<dyn ModelProviderClient> {
        &self.provider
    }

    /// Single attempt; no retries.
    pub async fn generate(
        &self,
        system_prompt: &str,
        context: &[ContextEntry],
        extra_instruction: Option<&str>,
        limits: Limits,
    ) -> Result<String, TransportFailure> {
        let mut messages = Vec::with_capacity(context.len() + 2);
        messages.push(ChatMessage::new(Role::System, system_prompt));
        messages.extend(
            context
                .iter()
                .map(|entry| ChatMessage::new(entry.role, entry.content.clone())),
        );
        if let Some(instruction) = extra_instruction {
            messages.push(ChatMessage::new(Role::User, instruction));
        }
        let options = CompletionOptions {
            temperature: Some(limits.temperature),
            max_tokens: Some(limits.max_tokens),
        };

        let started = Instant::now();
        let result = tokio::time::timeout(limits.timeout, self.provider.complete(messages, options))
            .await
            .map_err(|_| TransportFailure::Timeout(limits.timeout))
            .and_then(|inner| inner);
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match result {
            Ok(response) if response.content.trim().is_empty() => {
                warn!(
                    provider = self.provider.provider_name(),
                    elapsed_ms,
                    "Provider returned empty content"
                );
                Err(TransportFailure::EmptyBody)
            }
            Ok(response) => {
                debug!(
                    provider = self.provider.provider_name(),
                    model = self.provider.model_name(),
                    elapsed_ms,
                    completion_tokens = response.usage.completion_tokens,
                    "Provider call completed"
                );
                Ok(response.content)
            }
            Err(failure) => {
                warn!(
                    provider = self.provider.provider_name(),
                    elapsed_ms,
                    error = %failure,
                    "Provider call failed"
                );
                Err(failure)
            }
        }
    }
}

#[async_trait]
impl NarrativeCompressor for GenerationClient {
    async fn compress(&self, text: &str) -> Result<String, TransportFailure> {
        let instruction = prompts::summary_instruction(text);
        self.generate(
            prompts::SUMMARY_PROMPT,
            &[],
            Some(&instruction),
            self.summary_limits,
        )
        .await
    }
}
