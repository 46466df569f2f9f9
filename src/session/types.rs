//! Document types persisted by the session store
//!
//! A conversation is stored as one session document plus an append-only
//! sequence of chunk documents, each holding a bounded run of messages.
//! All documents serialize to JSON; timestamps are UTC and serialize as
//! ISO-8601 strings.

use crate::error::{Result, SiloError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Author of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            other => Err(format!("invalid role: '{}'", other)),
        }
    }
}

/// File or image attached to a message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Unique attachment identifier
    pub id: String,
    /// Where the attachment content lives
    pub url: String,
    /// Human-readable description of the content
    pub description: String,
}

impl Attachment {
    /// Create an attachment with a fresh id
    pub fn new(url: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            url: url.into(),
            description: description.into(),
        }
    }
}

/// A single immutable conversation message
///
/// Messages are created once on append and never mutated or deleted
/// afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Unique message identifier (UUID)
    pub id: String,

    /// Who authored the message
    pub role: Role,

    /// Message text
    pub content: String,

    /// Creation time (UTC)
    pub timestamp: DateTime<Utc>,

    /// Attachments carried by the message, in caller order
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

impl Message {
    /// Construct a message with a fresh id and the current UTC timestamp
    pub fn new(role: Role, content: impl Into<String>, attachments: Vec<Attachment>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
            attachments,
        }
    }
}

/// Storage key for a chunk document
///
/// Chunk numbers are 1-based and contiguous within a session.
pub fn chunk_key(session_id: &str, chunk_number: usize) -> String {
    format!("{}_chunk_{}", session_id, chunk_number)
}

/// A bounded, ordered segment of a session's messages
///
/// `message_range` is the 1-based ordinal span the chunk covers within the
/// whole session. It exists for operators inspecting stored documents and
/// is not consulted by any read or write path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkDocument {
    /// Document id, `<session_id>_chunk_<n>`
    pub id: String,

    /// Owning session
    pub session_id: String,

    /// Position of this chunk in the session's chunk sequence (1-based)
    pub chunk_number: usize,

    /// Number of messages currently held
    pub message_count: usize,

    /// Ordinal span within the session, `"<first>-<last>"`
    pub message_range: String,

    /// Messages in append order
    pub messages: Vec<Message>,
}

impl ChunkDocument {
    /// Create an empty chunk
    ///
    /// `range_start` seeds the ordinal span; the first chunk of a session
    /// starts at 1, later chunks continue from the previous chunk's end.
    pub fn new(session_id: &str, chunk_number: usize, range_start: usize) -> Self {
        Self {
            id: chunk_key(session_id, chunk_number),
            session_id: session_id.to_string(),
            chunk_number,
            message_count: 0,
            message_range: format!("{}-{}", range_start, range_start),
            messages: Vec::new(),
        }
    }

    /// Append a message, keeping the count and ordinal span in step
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
        self.message_count = self.messages.len();
        let first = self.range_start();
        self.message_range = format!("{}-{}", first, first + self.message_count - 1);
    }

    /// First session ordinal covered by this chunk
    pub fn range_start(&self) -> usize {
        self.message_range
            .split('-')
            .next()
            .and_then(|s| s.parse().ok())
            .unwrap_or(1)
    }

    /// Last session ordinal covered by this chunk
    pub fn range_end(&self) -> usize {
        if self.message_count == 0 {
            self.range_start()
        } else {
            self.range_start() + self.message_count - 1
        }
    }

    /// Whether the chunk has reached capacity
    pub fn is_full(&self, max_messages_per_chunk: usize) -> bool {
        self.message_count >= max_messages_per_chunk
    }

    /// Check structural invariants of a stored chunk
    ///
    /// # Errors
    ///
    /// Returns `SiloError::InvalidDocument` if the counter disagrees with
    /// the message list or the chunk number is not positive.
    pub fn validate(&self) -> Result<()> {
        if self.message_count != self.messages.len() {
            return Err(SiloError::InvalidDocument {
                id: self.id.clone(),
                message: format!(
                    "message_count {} does not match {} stored messages",
                    self.message_count,
                    self.messages.len()
                ),
            }
            .into());
        }

        if self.chunk_number == 0 {
            return Err(SiloError::InvalidDocument {
                id: self.id.clone(),
                message: "chunk_number must be positive".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

/// Per-conversation metadata document
///
/// Tracks which chunks hold the session's messages and a denormalized
/// running message count. `chunks` lists every chunk id ever allocated, in
/// allocation order; `current_chunk` is always the last element (or `None`
/// before the first allocation).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionDocument {
    /// Document id == session id
    pub id: String,

    /// User owning the conversation
    pub user_id: String,

    /// Running message total across all chunks
    ///
    /// May transiently understate the true stored total under concurrent
    /// writers; readers reconcile it on full loads.
    pub message_count: usize,

    /// Chunk ids in allocation order
    pub chunks: Vec<String>,

    /// Id of the writable chunk, if one has been allocated
    pub current_chunk: Option<String>,

    /// Creation time (UTC)
    pub created_at: DateTime<Utc>,

    /// Last append time (UTC)
    pub updated_at: DateTime<Utc>,
}

impl SessionDocument {
    /// Create a fresh session with no chunks
    pub fn new(session_id: &str, user_id: &str) -> Self {
        let now = Utc::now();
        Self {
            id: session_id.to_string(),
            user_id: user_id.to_string(),
            message_count: 0,
            chunks: Vec::new(),
            current_chunk: None,
            created_at: now,
            updated_at: now,
        }
    }
}
