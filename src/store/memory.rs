//! In-process session store used by tests and offline runs.

use crate::error::StorageError;
use crate::store::{take_most_recent, SessionStore};
use crate::types::{
    KeyEvent, KeyEventKind, Message, Role, Seed, Session, SessionStatus, Summary, SummaryKind,
};
use chrono::Utc;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

#[derive(Default)]
struct SessionRecords {
    session: Option<Session>,
    messages: Vec<Message>,
    summaries: Vec<Summary>,
    key_events: Vec<KeyEvent>,
}

/// `SessionStore` backed by a map guarded by a single lock.
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, SessionRecords>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn not_found(session_id: &str) -> StorageError {
    StorageError::SessionNotFound(session_id.to_string())
}

impl SessionStore for InMemorySessionStore {
    fn create_session(
        &self,
        seed: Seed,
        metadata: BTreeMap<String, Value>,
    ) -> Result<Session, StorageError> {
        let now = Utc::now();
        let session = Session {
            id: Uuid::new_v4().to_string(),
            seed,
            status: SessionStatus::Active,
            metadata,
            created_at: now,
            updated_at: now,
        };
        self.sessions.write().insert(
            session.id.clone(),
            SessionRecords {
                session: Some(session.clone()),
                ..Default::default()
            },
        );
        Ok(session)
    }

    fn get_session(&self, session_id: &str) -> Result<Option<Session>, StorageError> {
        Ok(self
            .sessions
            .read()
            .get(session_id)
            .and_then(|records| records.session.clone()))
    }

    fn update_session_status(
        &self,
        session_id: &str,
        status: SessionStatus,
    ) -> Result<Session, StorageError> {
        let mut sessions = self.sessions.write();
        let session = sessions
            .get_mut(session_id)
            .and_then(|records| records.session.as_mut())
            .ok_or_else(|| not_found(session_id))?;
        if !session.status.can_transition_to(status) {
            return Err(StorageError::InvalidStatusTransition {
                session_id: session_id.to_string(),
                from: session.status.to_string(),
                to: status.to_string(),
            });
        }
        if session.status != status {
            session.status = status;
            session.updated_at = Utc::now();
        }
        Ok(session.clone())
    }

    fn append_message(
        &self,
        session_id: &str,
        role: Role,
        content: &str,
        tokens: usize,
    ) -> Result<Message, StorageError> {
        let mut sessions = self.sessions.write();
        let records = sessions
            .get_mut(session_id)
            .ok_or_else(|| not_found(session_id))?;
        let message = Message {
            id: Uuid::new_v4().to_string(),
            session_id: session_id.to_string(),
            seq: records.messages.len() as u64 + 1,
            role,
            content: content.to_string(),
            tokens,
            created_at: Utc::now(),
        };
        records.messages.push(message.clone());
        Ok(message)
    }

    fn list_messages(
        &self,
        session_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<Message>, StorageError> {
        let sessions = self.sessions.read();
        let messages = sessions
            .get(session_id)
            .map(|records| records.messages.clone())
            .unwrap_or_default();
        Ok(take_most_recent(messages, limit))
    }

    fn list_summaries(&self, session_id: &str) -> Result<Vec<Summary>, StorageError> {
        Ok(self
            .sessions
            .read()
            .get(session_id)
            .map(|records| records.summaries.clone())
            .unwrap_or_default())
    }

    fn insert_summary(
        &self,
        session_id: &str,
        summary_text: &str,
        tokens: usize,
        message_count: usize,
        kind: SummaryKind,
    ) -> Result<Summary, StorageError> {
        let mut sessions = self.sessions.write();
        let records = sessions
            .get_mut(session_id)
            .ok_or_else(|| not_found(session_id))?;
        let summary = Summary {
            id: Uuid::new_v4().to_string(),
            session_id: session_id.to_string(),
            summary_text: summary_text.to_string(),
            tokens,
            message_count,
            kind,
            created_at: Utc::now(),
        };
        records.summaries.push(summary.clone());
        Ok(summary)
    }

    fn insert_key_event(
        &self,
        session_id: &str,
        kind: KeyEventKind,
        data: Value,
    ) -> Result<KeyEvent, StorageError> {
        let mut sessions = self.sessions.write();
        let records = sessions
            .get_mut(session_id)
            .ok_or_else(|| not_found(session_id))?;
        let event = KeyEvent {
            id: Uuid::new_v4().to_string(),
            session_id: session_id.to_string(),
            seq: records.key_events.len() as u64 + 1,
            kind,
            data,
            created_at: Utc::now(),
        };
        records.key_events.push(event.clone());
        Ok(event)
    }

    fn list_key_events_by_type(
        &self,
        session_id: &str,
        kind: KeyEventKind,
    ) -> Result<Vec<KeyEvent>, StorageError> {
        Ok(self
            .sessions
            .read()
            .get(session_id)
            .map(|records| {
                records
                    .key_events
                    .iter()
                    .filter(|event| event.kind == kind)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}
