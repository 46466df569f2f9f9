//! Error types for Silo
//!
//! This module defines all error types used throughout the crate,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for Silo operations
///
/// This enum encompasses all possible errors that can occur during
/// configuration loading, document storage, and session updates.
///
/// Expected "not found" and "already exists" outcomes are not errors:
/// point reads return `Option` and chunk-creation collisions are resolved
/// by adopting the existing document. Only genuine storage failures and
/// exhausted optimistic-concurrency retries surface here.
#[derive(Error, Debug)]
pub enum SiloError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Document storage errors (database operations)
    #[error("Storage error: {0}")]
    Storage(String),

    /// A stored document violated its structural invariants
    #[error("Invalid document {id}: {message}")]
    InvalidDocument {
        /// Id of the offending document
        id: String,
        /// What invariant was violated
        message: String,
    },

    /// Optimistic-concurrency update on a session document failed after
    /// the configured number of attempts.
    ///
    /// When this is returned from an append whose chunk write already
    /// landed, the message itself is durable and `message_id` identifies
    /// it; only the session's denormalized counter failed to update, and
    /// readers reconcile that drift on the next full load. `message_id` is
    /// `None` when the conflict hit chunk registration, before any message
    /// was written.
    #[error("Conflicting writes on session {session_id}: gave up after {attempts} attempts")]
    ConflictRetryExhausted {
        /// Session whose metadata update kept losing the race
        session_id: String,
        /// Id of the already-durable message, if the append got that far
        message_id: Option<String>,
        /// Number of attempts made before giving up
        attempts: u32,
    },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type alias for Silo operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;
