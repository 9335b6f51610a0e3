//! Context Builder
//!
//! Assembles the bounded provider context for a session: every summary (as a synthetic
//! system entry) followed by the most recent unsummarized messages. When the live window
//! approaches the budget, the oldest half of the unsummarized messages is summarized.

use crate::context::summarizer::{SummarizeError, Summarizer, SummaryConfig};
use crate::error::StorageError;
use crate::store::SessionStore;
use crate::types::{ContextEntry, Message, Role, Summary};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

pub const SUMMARY_PREFIX: &str = "[Summary] ";

/// `[context]` configuration section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextConfig {
    /// Default budget for a provider context, in estimated tokens
    #[serde(default = "default_token_budget")]
    pub token_budget: usize,

    /// Most recent unsummarized messages kept verbatim
    #[serde(default = "default_recent_window")]
    pub recent_window: usize,

    #[serde(default = "default_chars_per_token")]
    pub chars_per_token: usize,
}

fn default_token_budget() -> usize {
    12000
}

fn default_recent_window() -> usize {
    100
}

fn default_chars_per_token() -> usize {
    2
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            token_budget: default_token_budget(),
            recent_window: default_recent_window(),
            chars_per_token: default_chars_per_token(),
        }
    }
}

impl ContextConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.token_budget == 0 {
            return Err("token_budget must be positive".to_string());
        }
        if self.recent_window == 0 {
            return Err("recent_window must be positive".to_string());
        }
        if self.chars_per_token == 0 {
            return Err("chars_per_token must be positive".to_string());
        }
        Ok(())
    }
}

pub struct ContextBuilder {
    store: Arc<dyn SessionStore>,
    summarizer: Summarizer,
    config: ContextConfig,
    summary: SummaryConfig,
}

impl ContextBuilder {
    pub fn new(
        store: Arc<dyn SessionStore>,
        summarizer: Summarizer,
        config: ContextConfig,
        summary: SummaryConfig,
    ) -> Self {
        Self {
            store,
            summarizer,
            config,
            summary,
        }
    }

    pub fn config(&self) -> &ContextConfig {
        &self.config
    }

    /// Build the context for `session_id` within `budget`.
    ///
    /// Compression failures only disable compaction for this call; storage errors propagate.
    pub async fn build_context(
        &self,
        session_id: &str,
        budget: usize,
    ) -> Result<Vec<ContextEntry>, StorageError> {
        let mut summaries = self.store.list_summaries(session_id)?;
        let messages = self.store.list_messages(session_id, None)?;
        if messages.is_empty() {
            return Ok(assemble(&summaries, &[]));
        }

        let threshold = budget as f64 * self.summary.trigger_ratio;
        // Headroom above the trigger; a single summary never takes more.
        let summary_cap = (budget as f64 - threshold).floor() as usize;
        let mut rounds = 0;

        while self.summary.enabled && rounds < self.summary.max_rounds {
            let unsummarized = uncovered(&summaries, &messages);
            let window = recent(unsummarized, self.config.recent_window);
            let window_tokens: usize = window.iter().map(|m| m.tokens).sum();
            let summary_tokens: usize = summaries.iter().map(|s| s.tokens).sum();

            if (window_tokens + summary_tokens) as f64 <= threshold {
                break;
            }
            if unsummarized.len() < self.summary.min_messages {
                debug!(
                    session_id,
                    unsummarized = unsummarized.len(),
                    "Too few messages to summarize"
                );
                break;
            }

            warn!(
                session_id,
                window_tokens,
                summary_tokens,
                budget,
                "Context approaching budget; summarizing"
            );
            let covered = messages.len() - unsummarized.len();
            let previous = covered.checked_sub(1).map(|i| &messages[i]);
            let half = &unsummarized[..unsummarized.len() / 2];
            let half_tokens: usize = half.iter().map(|m| m.tokens).sum();
            let max_tokens = summary_cap.min(half_tokens / 2);
            match self
                .summarizer
                .summarize(session_id, previous, half, max_tokens)
                .await
            {
                Ok(summary) => summaries.push(summary),
                Err(SummarizeError::Storage(err)) => return Err(err),
                Err(_) => {
                    warn!(session_id, "Summarization skipped; returning unreduced context");
                    break;
                }
            }
            rounds += 1;
        }

        let window = recent(uncovered(&summaries, &messages), self.config.recent_window);
        let context = assemble(&summaries, window);
        debug!(
            session_id,
            summaries = summaries.len(),
            messages = window.len(),
            tokens = summaries.iter().map(|s| s.tokens).sum::<usize>()
                + window.iter().map(|m| m.tokens).sum::<usize>(),
            "Context built"
        );
        Ok(context)
    }

    /// Every summary followed by every unsummarized message; no window and no compaction.
    pub fn rebuild_full_context(&self, session_id: &str) -> Result<Vec<ContextEntry>, StorageError> {
        let summaries = self.store.list_summaries(session_id)?;
        let messages = self.store.list_messages(session_id, None)?;
        Ok(assemble(&summaries, uncovered(&summaries, &messages)))
    }
}

/// Messages after the prefix covered by `summaries`.
pub fn uncovered<'a>(summaries: &[Summary], messages: &'a [Message]) -> &'a [Message] {
    let covered: usize = summaries.iter().map(|s| s.message_count).sum();
    &messages[covered.min(messages.len())..]
}

fn recent(messages: &[Message], window: usize) -> &[Message] {
    &messages[messages.len().saturating_sub(window)..]
}

fn assemble(summaries: &[Summary], messages: &[Message]) -> Vec<ContextEntry> {
    summaries
        .iter()
        .map(|s| ContextEntry::new(Role::System, format!("{}{}", SUMMARY_PREFIX, s.summary_text)))
        .chain(
            messages
                .iter()
                .map(|m| ContextEntry::new(m.role, m.content.clone())),
        )
        .collect()
}
