//! Append-only message log with size estimates.

use crate::context::token::TokenEstimator;
use crate::error::StorageError;
use crate::store::SessionStore;
use crate::types::{Message, Role};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Per-session token totals
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TokenStats {
    pub total_messages: usize,
    pub total_tokens: usize,
    pub avg_tokens_per_message: f64,
}

/// Session-scoped ordered record of turns
#[derive(Clone)]
pub struct MessageLog {
    store: Arc<dyn SessionStore>,
    estimator: Arc<dyn TokenEstimator>,
}

impl MessageLog {
    pub fn new(store: Arc<dyn SessionStore>, estimator: Arc<dyn TokenEstimator>) -> Self {
        Self { store, estimator }
    }

    pub fn estimator(&self) -> &Arc<dyn TokenEstimator> {
        &self.estimator
    }

    /// Append a message, estimating its size. Returns the estimate.
    pub fn append(&self, session_id: &str, role: Role, text: &str) -> Result<usize, StorageError> {
        let size = self.estimator.estimate(text);
        self.append_sized(session_id, role, text, size)?;
        Ok(size)
    }

    /// Append a message whose size is already known.
    pub fn append_sized(
        &self,
        session_id: &str,
        role: Role,
        text: &str,
        size: usize,
    ) -> Result<Message, StorageError> {
        let message = self.store.append_message(session_id, role, text, size)?;
        debug!(
            session_id,
            role = %role,
            seq = message.seq,
            tokens = size,
            "Message appended"
        );
        Ok(message)
    }

    /// Messages oldest first; with `limit`, only the most recent `limit`.
    pub fn list(&self, session_id: &str, limit: Option<usize>) -> Result<Vec<Message>, StorageError> {
        self.store.list_messages(session_id, limit)
    }

    pub fn token_stats(&self, session_id: &str) -> Result<TokenStats, StorageError> {
        let messages = self.store.list_messages(session_id, None)?;
        let total_tokens: usize = messages.iter().map(|m| m.tokens).sum();
        let avg_tokens_per_message = if messages.is_empty() {
            0.0
        } else {
            total_tokens as f64 / messages.len() as f64
        };
        Ok(TokenStats {
            total_messages: messages.len(),
            total_tokens,
            avg_tokens_per_message,
        })
    }
}
