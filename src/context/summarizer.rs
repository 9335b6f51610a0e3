//! Summarizer
//!
//! Compresses a prefix of a session's messages into one [`Summary`]. The summary text
//! combines the recorded player decisions (from the key-event trail) with a narrative
//! compression delegated to the provider.

use crate::context::token::TokenEstimator;
use crate::error::{StorageError, TransportFailure};
use crate::store::SessionStore;
use crate::types::{KeyEventKind, Message, Summary, SummaryKind};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// `[summary]` configuration section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryConfig {
    /// Disable to never compact (context may then exceed budget)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Fraction of the budget at which compaction starts
    #[serde(default = "default_trigger_ratio")]
    pub trigger_ratio: f64,

    /// Fewest unsummarized messages worth compacting
    #[serde(default = "default_min_messages")]
    pub min_messages: usize,

    /// Upper bound on compaction rounds per context build
    #[serde(default = "default_max_rounds")]
    pub max_rounds: usize,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_true() -> bool {
    true
}

fn default_trigger_ratio() -> f64 {
    0.8
}

fn default_min_messages() -> usize {
    5
}

fn default_max_rounds() -> usize {
    4
}

fn default_temperature() -> f32 {
    0.3
}

fn default_max_tokens() -> u32 {
    500
}

fn default_timeout_secs() -> u64 {
    15
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            trigger_ratio: default_trigger_ratio(),
            min_messages: default_min_messages(),
            max_rounds: default_max_rounds(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl SummaryConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !(self.trigger_ratio > 0.0 && self.trigger_ratio <= 1.0) {
            return Err(format!(
                "trigger_ratio must be in (0, 1], got {}",
                self.trigger_ratio
            ));
        }
        if self.min_messages < 2 {
            return Err("min_messages must be at least 2".to_string());
        }
        if self.timeout_secs == 0 {
            return Err("timeout_secs must be positive".to_string());
        }
        Ok(())
    }
}

/// Narrative compression collaborator (implemented by the generation client)
#[async_trait]
pub trait NarrativeCompressor: Send + Sync {
    async fn compress(&self, text: &str) -> Result<String, TransportFailure>;
}

/// Why a summarization attempt produced nothing
#[derive(Debug)]
pub enum SummarizeError {
    NothingToSummarize,
    /// Compression failed; compaction is skipped for this build
    Compression(TransportFailure),
    Storage(StorageError),
}

impl From<StorageError> for SummarizeError {
    fn from(err: StorageError) -> Self {
        SummarizeError::Storage(err)
    }
}

pub struct Summarizer {
    store: Arc<dyn SessionStore>,
    compressor: Arc<dyn NarrativeCompressor>,
    estimator: Arc<dyn TokenEstimator>,
}

impl Summarizer {
    pub fn new(
        store: Arc<dyn SessionStore>,
        compressor: Arc<dyn NarrativeCompressor>,
        estimator: Arc<dyn TokenEstimator>,
    ) -> Self {
        Self {
            store,
            compressor,
            estimator,
        }
    }

    /// Summarize `messages`, which must be the oldest unsummarized messages of the session.
    ///
    /// `previous` is the last message already covered by an earlier summary; decisions
    /// recorded up to it belong to that summary and are not repeated. The stored text is
    /// trimmed to at most `max_tokens`, dropping narrative before decisions.
    pub async fn summarize(
        &self,
        session_id: &str,
        previous: Option<&Message>,
        messages: &[Message],
        max_tokens: usize,
    ) -> Result<Summary, SummarizeError> {
        let Some(last) = messages.last() else {
            return Err(SummarizeError::NothingToSummarize);
        };
        let after = previous.map(|m| m.created_at);

        let decisions: Vec<String> = self
            .store
            .list_key_events_by_type(session_id, KeyEventKind::ActionChoice)?
            .into_iter()
            .filter(|event| event.created_at <= last.created_at)
            .filter(|event| after.map_or(true, |after| event.created_at > after))
            .map(|event| {
                event
                    .data
                    .get("choice_text")
                    .and_then(|v| v.as_str())
                    .unwrap_or("Unknown")
                    .to_string()
            })
            .collect();

        let transcript = messages
            .iter()
            .map(|m| format!("{}: {}", m.role, m.content))
            .collect::<Vec<_>>()
            .join("\n");

        let narrative = match self.compressor.compress(&transcript).await {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => return Err(SummarizeError::Compression(TransportFailure::EmptyBody)),
            Err(failure) => {
                warn!(session_id, error = %failure, "Narrative compression failed");
                return Err(SummarizeError::Compression(failure));
            }
        };

        let text = self.fit(&decisions, narrative.trim(), max_tokens);
        let tokens = self.estimator.estimate(&text);
        let summary = self.store.insert_summary(
            session_id,
            &text,
            tokens,
            messages.len(),
            SummaryKind::Auto,
        )?;

        info!(
            session_id,
            message_count = messages.len(),
            tokens,
            decisions = decisions.len(),
            "Summary created"
        );
        Ok(summary)
    }
}

impl Summarizer {
    /// Longest narrative prefix whose formatted summary stays within `max_tokens`.
    fn fit(&self, decisions: &[String], narrative: &str, max_tokens: usize) -> String {
        let full = format_summary(decisions, narrative);
        let estimate = self.estimator.estimate(&full);
        if estimate <= max_tokens {
            return full;
        }

        let chars: Vec<char> = narrative.chars().collect();
        let mut keep = chars.len() * max_tokens / estimate.max(1);
        loop {
            let prefix: String = chars[..keep].iter().collect();
            let text = format_summary(decisions, prefix.trim_end());
            if keep == 0 || self.estimator.estimate(&text) <= max_tokens {
                debug!(
                    kept_chars = keep,
                    total_chars = chars.len(),
                    max_tokens,
                    "Summary narrative trimmed"
                );
                return text;
            }
            keep -= 1;
        }
    }
}

/// Combine recorded decisions and the narrative into the stored summary text.
pub fn format_summary(decisions: &[String], narrative: &str) -> String {
    let mut parts = Vec::new();
    if !decisions.is_empty() {
        parts.push("Key events:".to_string());
        parts.extend(decisions.iter().map(|d| format!("- {}", d)));
        parts.push(String::new());
    }
    parts.push(format!("Story so far:\n{}", narrative));
    parts.join("\n")
}
