//! Command handlers for the Silo CLI

pub mod append;
pub mod history;

use crate::config::Config;
use crate::docstore;
use crate::error::Result;
use crate::session::SessionStore;

/// Build the session store the handlers operate on
///
/// Honors the configured database path; with none set, the store falls
/// back to the platform data directory (or `SILO_DB`).
pub fn open_store(config: &Config) -> Result<SessionStore> {
    let docs = docstore::open(config.storage.path.as_deref())?;
    Ok(SessionStore::with_docs(docs, config.store.clone()))
}
