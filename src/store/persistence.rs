//! Durable sled-backed session store.

use std::collections::BTreeMap;
use std::io;
use std::path::Path;

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use sled::{Db, Tree};
use uuid::Uuid;

use crate::error::StorageError;
use crate::store::{take_most_recent, SessionStore};
use crate::types::{
    KeyEvent, KeyEventKind, Message, Role, Seed, Session, SessionStatus, Summary, SummaryKind,
};

const TREE_SESSIONS: &str = "sessions";
const TREE_MESSAGES: &str = "messages";
const TREE_SUMMARIES: &str = "summaries";
const TREE_KEY_EVENTS: &str = "key_events";
const TREE_COUNTERS: &str = "counters";
const SEQ_KEY_PAD: usize = 20;

/// `SessionStore` persisted in a sled database.
///
/// Each record lives in its own tree under `<session>/<seq>`; the zero-padded
/// sequence keeps prefix scans in append order.
#[derive(Clone)]
pub struct SledSessionStore {
    db: Db,
    sessions: Tree,
    messages: Tree,
    summaries: Tree,
    key_events: Tree,
    counters: Tree,
}

impl SledSessionStore {
    pub fn new(db: Db) -> Result<Self, StorageError> {
        let sessions = db.open_tree(TREE_SESSIONS).map_err(to_storage_io)?;
        let messages = db.open_tree(TREE_MESSAGES).map_err(to_storage_io)?;
        let summaries = db.open_tree(TREE_SUMMARIES).map_err(to_storage_io)?;
        let key_events = db.open_tree(TREE_KEY_EVENTS).map_err(to_storage_io)?;
        let counters = db.open_tree(TREE_COUNTERS).map_err(to_storage_io)?;
        Ok(Self {
            db,
            sessions,
            messages,
            summaries,
            key_events,
            counters,
        })
    }

    pub fn open(path: &Path) -> Result<Self, StorageError> {
        let db = sled::open(path).map_err(to_storage_io)?;
        Self::new(db)
    }

    pub fn db(&self) -> &Db {
        &self.db
    }

    pub fn flush(&self) -> Result<(), StorageError> {
        self.db.flush().map_err(to_storage_io)?;
        Ok(())
    }

    /// All sessions, newest first.
    pub fn list_sessions(&self) -> Result<Vec<Session>, StorageError> {
        let mut out = Vec::new();
        for result in self.sessions.iter() {
            let (_, value) = result.map_err(to_storage_io)?;
            out.push(decode::<Session>(&value)?);
        }
        out.sort_by_key(|s| std::cmp::Reverse(s.created_at));
        Ok(out)
    }

    fn require_session(&self, session_id: &str) -> Result<Session, StorageError> {
        self.get_session(session_id)?
            .ok_or_else(|| StorageError::SessionNotFound(session_id.to_string()))
    }

    fn next_seq(&self, session_id: &str, tree: &str) -> Result<u64, StorageError> {
        let counter_key = format!("{session_id}/{tree}");
        let updated = self
            .counters
            .update_and_fetch(counter_key.as_bytes(), increment)
            .map_err(to_storage_io)?;
        updated
            .as_deref()
            .and_then(read_counter)
            .ok_or_else(|| StorageError::Serialization(format!("counter {counter_key} missing")))
    }

    fn scan_session<T: DeserializeOwned>(
        tree: &Tree,
        session_id: &str,
    ) -> Result<Vec<T>, StorageError> {
        let prefix = format!("{session_id}/");
        let mut out = Vec::new();
        for result in tree.scan_prefix(prefix.as_bytes()) {
            let (_, value) = result.map_err(to_storage_io)?;
            out.push(decode(&value)?);
        }
        Ok(out)
    }
}

impl SessionStore for SledSessionStore {
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
        self.sessions
            .insert(session.id.as_bytes(), encode(&session)?)
            .map_err(to_storage_io)?;
        Ok(session)
    }

    fn get_session(&self, session_id: &str) -> Result<Option<Session>, StorageError> {
        let Some(raw) = self
            .sessions
            .get(session_id.as_bytes())
            .map_err(to_storage_io)?
        else {
            return Ok(None);
        };
        Ok(Some(decode(&raw)?))
    }

    fn update_session_status(
        &self,
        session_id: &str,
        status: SessionStatus,
    ) -> Result<Session, StorageError> {
        let mut session = self.require_session(session_id)?;
        if !session.status.can_transition_to(status) {
            return Err(StorageError::InvalidStatusTransition {
                session_id: session_id.to_string(),
                from: session.status.to_string(),
                to: status.to_string(),
            });
        }
        if session.status == status {
            return Ok(session);
        }
        session.status = status;
        session.updated_at = Utc::now();
        self.sessions
            .insert(session.id.as_bytes(), encode(&session)?)
            .map_err(to_storage_io)?;
        Ok(session)
    }

    fn append_message(
        &self,
        session_id: &str,
        role: Role,
        content: &str,
        tokens: usize,
    ) -> Result<Message, StorageError> {
        self.require_session(session_id)?;
        let seq = self.next_seq(session_id, TREE_MESSAGES)?;
        let message = Message {
            id: Uuid::new_v4().to_string(),
            session_id: session_id.to_string(),
            seq,
            role,
            content: content.to_string(),
            tokens,
            created_at: Utc::now(),
        };
        self.messages
            .insert(encode_seq_key(session_id, seq).as_bytes(), encode(&message)?)
            .map_err(to_storage_io)?;
        Ok(message)
    }

    fn list_messages(
        &self,
        session_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<Message>, StorageError> {
        let messages: Vec<Message> = Self::scan_session(&self.messages, session_id)?;
        Ok(take_most_recent(messages, limit))
    }

    fn list_summaries(&self, session_id: &str) -> Result<Vec<Summary>, StorageError> {
        Self::scan_session(&self.summaries, session_id)
    }

    fn insert_summary(
        &self,
        session_id: &str,
        summary_text: &str,
        tokens: usize,
        message_count: usize,
        kind: SummaryKind,
    ) -> Result<Summary, StorageError> {
        self.require_session(session_id)?;
        let seq = self.next_seq(session_id, TREE_SUMMARIES)?;
        let summary = Summary {
            id: Uuid::new_v4().to_string(),
            session_id: session_id.to_string(),
            summary_text: summary_text.to_string(),
            tokens,
            message_count,
            kind,
            created_at: Utc::now(),
        };
        self.summaries
            .insert(encode_seq_key(session_id, seq).as_bytes(), encode(&summary)?)
            .map_err(to_storage_io)?;
        Ok(summary)
    }

    fn insert_key_event(
        &self,
        session_id: &str,
        kind: KeyEventKind,
        data: Value,
    ) -> Result<KeyEvent, StorageError> {
        self.require_session(session_id)?;
        let seq = self.next_seq(session_id, TREE_KEY_EVENTS)?;
        let event = KeyEvent {
            id: Uuid::new_v4().to_string(),
            session_id: session_id.to_string(),
            seq,
            kind,
            data,
            created_at: Utc::now(),
        };
        self.key_events
            .insert(encode_seq_key(session_id, seq).as_bytes(), encode(&event)?)
            .map_err(to_storage_io)?;
        Ok(event)
    }

    fn list_key_events_by_type(
        &self,
        session_id: &str,
        kind: KeyEventKind,
    ) -> Result<Vec<KeyEvent>, StorageError> {
        let events: Vec<KeyEvent> = Self::scan_session(&self.key_events, session_id)?;
        Ok(events.into_iter().filter(|e| e.kind == kind).collect())
    }
}

fn encode_seq_key(session_id: &str, seq: u64) -> String {
    format!("{session_id}/{seq:0width$}", width = SEQ_KEY_PAD)
}

fn increment(old: Option<&[u8]>) -> Option<Vec<u8>> {
    let next = old.and_then(read_counter).unwrap_or(0) + 1;
    Some(next.to_be_bytes().to_vec())
}

fn read_counter(bytes: &[u8]) -> Option<u64> {
    let array: [u8; 8] = bytes.try_into().ok()?;
    Some(u64::from_be_bytes(array))
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, StorageError> {
    serde_json::to_vec(value).map_err(to_storage_data)
}

fn decode<T: DeserializeOwned>(raw: &[u8]) -> Result<T, StorageError> {
    serde_json::from_slice(raw).map_err(to_storage_data)
}

fn to_storage_io(err: sled::Error) -> StorageError {
    StorageError::IoError(io::Error::new(io::ErrorKind::Other, err.to_string()))
}

fn to_storage_data(err: serde_json::Error) -> StorageError {
    StorageError::Serialization(err.to_string())
}
