//! Session-scoped conversation storage
//!
//! Persists a conversation as one session document plus an append-only
//! sequence of fixed-capacity chunk documents, and reconstructs full or
//! partial history from them. The store holds no in-process locks;
//! concurrent writers coordinate through conditional writes on the session
//! document and create-or-adopt on chunk creation.

use crate::config::StoreConfig;
use crate::docstore::{CasOutcome, CreateOutcome, DocumentStore};
use crate::error::{Result, SiloError};
use chrono::Utc;
use metrics::increment_counter;
use std::path::PathBuf;

mod chunks;
mod reader;
pub mod types;

pub use types::{Attachment, ChunkDocument, Message, Role, SessionDocument};

/// Session-scoped chunked conversation store
///
/// Cheap to clone; clones share the underlying database handle, so one
/// store can serve many concurrent request-handling tasks.
///
/// # Examples
///
/// ```no_run
/// use silo::config::StoreConfig;
/// use silo::session::{Role, SessionStore};
///
/// # fn main() -> silo::error::Result<()> {
/// let store = SessionStore::new(StoreConfig::default())?;
/// let message_id = store.add_message("s1", Role::User, "how do I treat leaf rust?", "farmer-7", vec![])?;
/// assert!(!message_id.is_empty());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct SessionStore {
    docs: DocumentStore,
    config: StoreConfig,
}

impl SessionStore {
    /// Open a store at the default database location
    ///
    /// # Errors
    ///
    /// Returns `SiloError::Storage` if the database cannot be opened.
    pub fn new(config: StoreConfig) -> Result<Self> {
        Ok(Self {
            docs: DocumentStore::new()?,
            config,
        })
    }

    /// Open a store at the specified database path
    ///
    /// # Errors
    ///
    /// Returns `SiloError::Storage` if the database cannot be opened.
    pub fn new_with_path<P: Into<PathBuf>>(path: P, config: StoreConfig) -> Result<Self> {
        Ok(Self {
            docs: DocumentStore::new_with_path(path)?,
            config,
        })
    }

    /// Build a store over an existing document store handle
    ///
    /// This is the injection point for callers that already manage a
    /// database handle; nothing in the crate reaches for a global one.
    pub fn with_docs(docs: DocumentStore, config: StoreConfig) -> Self {
        Self { docs, config }
    }

    pub(crate) fn docs(&self) -> &DocumentStore {
        &self.docs
    }

    pub(crate) fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Create a session, or return the existing one untouched
    ///
    /// Creation is idempotent: racing writers converge on a single
    /// document and no field of an existing session is ever reset.
    ///
    /// # Errors
    ///
    /// Returns `SiloError::Storage` on write failure.
    pub fn create_session(&self, session_id: &str, user_id: &str) -> Result<SessionDocument> {
        let fresh = SessionDocument::new(session_id, user_id);
        match self.docs.create(session_id, &fresh)? {
            CreateOutcome::Created => {
                tracing::debug!("Session {} created for user {}", session_id, user_id);
                Ok(fresh)
            }
            CreateOutcome::Existing(existing) => Ok(existing),
        }
    }

    /// Point read of a session document
    ///
    /// An unknown session id is a normal outcome and returns `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns `SiloError::Storage` on read failure.
    pub fn get_session(&self, session_id: &str) -> Result<Option<SessionDocument>> {
        self.docs.read(session_id)
    }

    /// Point read of a chunk document by its full id
    ///
    /// Mostly useful for diagnostics; conversation access goes through
    /// the readers.
    ///
    /// # Errors
    ///
    /// Returns `SiloError::Storage` on read failure.
    pub fn get_chunk(&self, chunk_id: &str) -> Result<Option<ChunkDocument>> {
        self.docs.read(chunk_id)
    }

    /// Append a message to a session, creating session and chunk lazily
    ///
    /// The message is written to the writable chunk first and is durable
    /// once that write lands; the session's denormalized counter is then
    /// bumped under optimistic concurrency.
    ///
    /// # Returns
    ///
    /// The new message's id.
    ///
    /// # Errors
    ///
    /// Returns `SiloError::ConflictRetryExhausted` when the session
    /// counter update keeps losing to concurrent writers; the error carries
    /// the message id because the message itself is already stored. Other
    /// storage failures propagate as `SiloError::Storage`.
    pub fn add_message(
        &self,
        session_id: &str,
        role: Role,
        content: impl Into<String>,
        user_id: &str,
        attachments: Vec<Attachment>,
    ) -> Result<String> {
        let mut session = match self.get_session(session_id)? {
            Some(session) => session,
            None => self.create_session(session_id, user_id)?,
        };

        let mut chunk = chunks::resolve_writable_chunk(&self.docs, &self.config, &mut session)?;

        let message = Message::new(role, content, attachments);
        let message_id = message.id.clone();

        chunk.push(message);
        self.docs.upsert(&chunk.id, &chunk)?;

        let outcome = self.docs.update(
            session_id,
            self.config.session_update_attempts,
            |doc: &mut SessionDocument| {
                doc.message_count += 1;
                doc.updated_at = Utc::now();
                true
            },
        )?;

        if let CasOutcome::Contended { attempts } = outcome {
            increment_counter!("silo_session_conflicts_total");
            return Err(SiloError::ConflictRetryExhausted {
                session_id: session_id.to_string(),
                message_id: Some(message_id),
                attempts,
            }
            .into());
        }

        increment_counter!("silo_messages_appended_total");
        tracing::debug!(
            "Appended message {} to {} for session {}",
            message_id,
            chunk.id,
            session_id
        );

        Ok(message_id)
    }
}
