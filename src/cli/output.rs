//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::{ApiError, StorageError};

/// Map domain errors to a one-line message with a hint where one helps.
pub fn map_error(e: &ApiError) -> String {
    match e {
        ApiError::StorageError(StorageError::SessionNotFound(id)) => {
            format!("Session not found: {} (run `loafer sessions` to list sessions)", id)
        }
        ApiError::UnknownChoice { session_id, choice } => format!(
            "Unknown choice '{}' (run `loafer rebuild {}` to see the current choices)",
            choice, session_id
        ),
        ApiError::SessionClosed(id) => {
            format!("Session {} has ended; start a new one with `loafer start`", id)
        }
        other => other.to_string(),
    }
}
