//! Session Store
//!
//! Narrow persistence interface consumed by the context manager and the orchestrator.
//! Every operation is keyed by session id and atomic at the single-record level; the
//! core never relies on cross-record transactions.

pub mod memory;
pub mod persistence;

pub use memory::InMemorySessionStore;
pub use persistence::SledSessionStore;

use crate::error::StorageError;
use crate::types::{
    KeyEvent, KeyEventKind, Message, Role, Seed, Session, SessionStatus, Summary, SummaryKind,
};
use serde_json::Value;
use std::collections::BTreeMap;

/// Persistence collaborator interface
pub trait SessionStore: Send + Sync {
    /// Create a new `active` session with the given seed.
    fn create_session(
        &self,
        seed: Seed,
        metadata: BTreeMap<String, Value>,
    ) -> Result<Session, StorageError>;

    fn get_session(&self, session_id: &str) -> Result<Option<Session>, StorageError>;

    /// Move a session to `status`. Rejects transitions out of a closed status.
    fn update_session_status(
        &self,
        session_id: &str,
        status: SessionStatus,
    ) -> Result<Session, StorageError>;

    /// Append a message; the store assigns id, sequence and timestamp.
    fn append_message(
        &self,
        session_id: &str,
        role: Role,
        content: &str,
        tokens: usize,
    ) -> Result<Message, StorageError>;

    /// Messages in append order. With `limit`, only the most recent `limit` are returned.
    fn list_messages(
        &self,
        session_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<Message>, StorageError>;

    /// Summaries in creation order.
    fn list_summaries(&self, session_id: &str) -> Result<Vec<Summary>, StorageError>;

    fn insert_summary(
        &self,
        session_id: &str,
        summary_text: &str,
        tokens: usize,
        message_count: usize,
        kind: SummaryKind,
    ) -> Result<Summary, StorageError>;

    fn insert_key_event(
        &self,
        session_id: &str,
        kind: KeyEventKind,
        data: Value,
    ) -> Result<KeyEvent, StorageError>;

    /// Key events of one kind in creation order.
    fn list_key_events_by_type(
        &self,
        session_id: &str,
        kind: KeyEventKind,
    ) -> Result<Vec<KeyEvent>, StorageError>;
}

/// Keep only the most recent `limit` items of an ordered list.
pub(crate) fn take_most_recent<T>(mut items: Vec<T>, limit: Option<usize>) -> Vec<T> {
    if let Some(limit) = limit {
        if items.len() > limit {
            items.drain(..items.len() - limit);
        }
    }
    items
}
