//! Error types for turn generation and its persistence collaborator.

use std::time::Duration;
use thiserror::Error;

/// Storage-related errors. Always fatal for a turn.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Invalid status transition for session {session_id}: {from} -> {to}")]
    InvalidStatusTransition {
        session_id: String,
        from: String,
        to: String,
    },

    #[error("Stored record is corrupt: {0}")]
    Serialization(String),

    #[error("Storage I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Failure to obtain raw text from the provider. Always degrades to fallback.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TransportFailure {
    #[error("Provider call timed out after {0:?}")]
    Timeout(Duration),

    #[error("Provider unreachable: {0}")]
    Unreachable(String),

    #[error("Provider returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Provider authentication failed: {0}")]
    Auth(String),

    #[error("Provider rate limit exceeded: {0}")]
    RateLimit(String),

    #[error("Provider returned an empty body")]
    EmptyBody,

    #[error("Provider response envelope could not be decoded: {0}")]
    Decode(String),
}

/// Extraction or decode failure of provider output. Degrades to fallback.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Malformed provider output: {reason}")]
pub struct MalformedOutput {
    pub reason: String,
}

impl MalformedOutput {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Top-level errors for configuration, client construction and the CLI.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Provider not configured: {0}")]
    ProviderNotConfigured(String),

    #[error("Provider error: {0}")]
    ProviderError(String),

    #[error("Session is not active: {0}")]
    SessionClosed(String),

    #[error("Unknown choice '{choice}' for session {session_id}")]
    UnknownChoice { session_id: String, choice: String },
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
