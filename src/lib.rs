//! Silo - chunked conversation history storage
//!
//! This library persists chat conversations as session-scoped, append-only
//! sequences of fixed-capacity chunks, and reconstructs full or partial
//! history from them. It tolerates concurrent writers without a central
//! lock manager: chunk creation is idempotent by id, and session metadata
//! updates use bounded optimistic concurrency.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `session`: the session store: create/get sessions, append messages,
//!   and the full/tail/paginated read paths
//! - `docstore`: embedded document store with the conditional-write
//!   primitives the session layer is built on
//! - `config`: configuration management and validation
//! - `error`: error types and result aliases
//! - `cli`, `commands`: command-line interface and handlers
//! - `metrics`: store counters and exporter bootstrap
//!
//! # Example
//!
//! ```no_run
//! use silo::config::StoreConfig;
//! use silo::session::{Role, SessionStore};
//!
//! fn main() -> anyhow::Result<()> {
//!     let store = SessionStore::new(StoreConfig::default())?;
//!
//!     store.add_message("field-visit-42", Role::User, "my maize leaves are yellowing", "farmer-7", vec![])?;
//!     let recent = store.get_n_messages("field-visit-42", 6)?;
//!     assert!(!recent.is_empty());
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod docstore;
pub mod error;
pub mod metrics;
pub mod session;

// Re-export commonly used types
pub use config::{Config, StoreConfig};
pub use docstore::DocumentStore;
pub use error::{Result, SiloError};
pub use session::{Attachment, Message, Role, SessionStore};
