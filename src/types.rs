//! Core record types shared by the store, the context manager and the orchestrator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Session identifier (UUID string)
pub type SessionId = String;

/// Seed fixed at session creation; drives every reproducible random choice for the session.
pub type Seed = u64;

/// Role of a message in the conversation log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "system" => Ok(Role::System),
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// Session lifecycle. Transitions only leave `Active`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Active,
    Completed,
    Abandoned,
}

impl SessionStatus {
    /// Whether moving from `self` to `next` respects the monotone lifecycle.
    pub fn can_transition_to(self, next: SessionStatus) -> bool {
        self == next || self == SessionStatus::Active
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SessionStatus::Active => "active",
            SessionStatus::Completed => "completed",
            SessionStatus::Abandoned => "abandoned",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub seed: Seed,
    pub status: SessionStatus,
    #[serde(default)]
    pub metadata: BTreeMap<String, Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(Value::as_str)
    }
}

/// A single logged turn. Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub session_id: SessionId,
    /// Per-session append order
    pub seq: u64,
    pub role: Role,
    pub content: String,
    pub tokens: usize,
    pub created_at: DateTime<Utc>,
}

/// Provenance of a summary record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryKind {
    Auto,
    Manual,
}

/// Compressed stand-in for a contiguous prefix of a session's messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub id: String,
    pub session_id: SessionId,
    pub summary_text: String,
    pub tokens: usize,
    /// Number of messages this summary replaces
    pub message_count: usize,
    pub kind: SummaryKind,
    pub created_at: DateTime<Utc>,
}

/// Tag of an audit-trail event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyEventKind {
    ActionChoice,
    Milestone,
    Checkpoint,
    GameOver,
}

impl KeyEventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            KeyEventKind::ActionChoice => "action_choice",
            KeyEventKind::Milestone => "milestone",
            KeyEventKind::Checkpoint => "checkpoint",
            KeyEventKind::GameOver => "game_over",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyEvent {
    pub id: String,
    pub session_id: SessionId,
    pub seq: u64,
    pub kind: KeyEventKind,
    pub data: Value,
    pub created_at: DateTime<Utc>,
}

/// One entry of the ordered context handed to the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextEntry {
    pub role: Role,
    pub content: String,
}

impl ContextEntry {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}
