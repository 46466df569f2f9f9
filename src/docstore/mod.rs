//! Embedded document store backing the session store
//!
//! Documents are serde_json-encoded values keyed by string id in a `sled`
//! database. The store exposes the three primitives the session layer is
//! built on: point reads, insert-if-absent ("create or adopt"), and a
//! bounded compare-and-swap update loop for optimistic concurrency.

use crate::error::{Result, SiloError};
use anyhow::Context;
use directories::ProjectDirs;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sled::Db;
use std::path::{Path, PathBuf};

/// Outcome of an insert-if-absent call
#[derive(Debug)]
pub enum CreateOutcome<T> {
    /// The document was inserted by this call
    Created,
    /// Another writer inserted the document first; their copy is returned
    Existing(T),
}

/// Outcome of a bounded compare-and-swap update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CasOutcome {
    /// The mutation was applied and persisted
    Applied {
        /// Number of attempts used, starting at 1
        attempts: u32,
    },
    /// The mutation closure declined to change the document
    Skipped,
    /// Every attempt lost the conditional write to a concurrent writer
    Contended {
        /// Number of attempts made before giving up
        attempts: u32,
    },
}

/// Document store over an embedded `sled` database
///
/// Handles are cheap to clone and safe to share across threads; the store
/// itself holds no locks. Concurrent writers coordinate only through the
/// conditional-write primitives below.
#[derive(Clone)]
pub struct DocumentStore {
    db: Db,
}

impl DocumentStore {
    /// Open the store at the default location
    ///
    /// The database lives in the platform data directory. The `SILO_DB`
    /// environment variable overrides the location, which makes it easy to
    /// point the binary at a test database without touching the user's
    /// application data.
    ///
    /// # Errors
    ///
    /// Returns `SiloError::Storage` if the database cannot be opened.
    pub fn new() -> Result<Self> {
        if let Ok(override_path) = std::env::var("SILO_DB") {
            return Self::new_with_path(override_path);
        }

        let proj_dirs = ProjectDirs::from("com", "xbcsmith", "silo")
            .ok_or_else(|| SiloError::Storage("Could not determine data directory".into()))?;

        let data_dir = proj_dirs.data_dir();
        std::fs::create_dir_all(data_dir)
            .context("Failed to create data directory")
            .map_err(|e| SiloError::Storage(e.to_string()))?;

        Self::new_with_path(data_dir.join("sessions.db"))
    }

    /// Open the store at the specified path
    ///
    /// Primarily useful for tests where the default application data
    /// directory is not desirable (for example, a temporary directory).
    ///
    /// # Errors
    ///
    /// Returns `SiloError::Storage` if the database cannot be opened.
    pub fn new_with_path<P: Into<PathBuf>>(path: P) -> Result<Self> {
        let path = path.into();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create parent directory for database")
                .map_err(|e| SiloError::Storage(e.to_string()))?;
        }

        let db = sled::open(&path)
            .map_err(|e| SiloError::Storage(format!("Failed to open database: {}", e)))?;
        Ok(Self { db })
    }

    /// Point read of a document by key
    ///
    /// A missing key is a normal outcome and returns `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns `SiloError::Storage` on read failure and
    /// `SiloError::Serialization` if the stored bytes do not decode.
    pub fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self
            .db
            .get(key.as_bytes())
            .map_err(|e| SiloError::Storage(format!("Get failed: {}", e)))?
        {
            Some(bytes) => {
                let doc = serde_json::from_slice(&bytes).map_err(SiloError::Serialization)?;
                Ok(Some(doc))
            }
            None => Ok(None),
        }
    }

    /// Unconditionally write a document, replacing any existing value
    ///
    /// # Errors
    ///
    /// Returns `SiloError::Storage` if serialization or insertion fails.
    pub fn upsert<T: Serialize>(&self, key: &str, doc: &T) -> Result<()> {
        let value = serde_json::to_vec(doc).map_err(SiloError::Serialization)?;

        self.db
            .insert(key.as_bytes(), value)
            .map_err(|e| SiloError::Storage(format!("Insert failed: {}", e)))?;

        self.flush()
    }

    /// Insert a document only if the key is absent
    ///
    /// On collision the existing document is decoded and returned instead
    /// of failing, so two writers racing to create the same document both
    /// observe a single winner.
    ///
    /// # Errors
    ///
    /// Returns `SiloError::Storage` on write failure.
    pub fn create<T>(&self, key: &str, doc: &T) -> Result<CreateOutcome<T>>
    where
        T: Serialize + DeserializeOwned,
    {
        let value = serde_json::to_vec(doc).map_err(SiloError::Serialization)?;

        let swap = self
            .db
            .compare_and_swap(key.as_bytes(), None as Option<&[u8]>, Some(value))
            .map_err(|e| SiloError::Storage(format!("Create failed: {}", e)))?;

        match swap {
            Ok(()) => {
                self.flush()?;
                Ok(CreateOutcome::Created)
            }
            Err(cas_err) => {
                let current = cas_err.current.ok_or_else(|| {
                    SiloError::Storage(format!("Create collision on {} lost its value", key))
                })?;
                let existing =
                    serde_json::from_slice(&current).map_err(SiloError::Serialization)?;
                Ok(CreateOutcome::Existing(existing))
            }
        }
    }

    /// Bounded compare-and-swap update of an existing document
    ///
    /// Each attempt re-reads the document, applies `mutate`, and writes the
    /// result conditionally on the stored bytes being unchanged since the
    /// read. The closure returns `false` to signal that no write is needed
    /// (for example, a concurrent writer already applied the change).
    ///
    /// The caller decides what a `Contended` outcome means; this helper
    /// never maps it to an error itself.
    ///
    /// # Errors
    ///
    /// Returns `SiloError::Storage` if the document is missing or a
    /// non-conflict storage failure occurs.
    pub fn update<T, F>(&self, key: &str, max_attempts: u32, mut mutate: F) -> Result<CasOutcome>
    where
        T: Serialize + DeserializeOwned,
        F: FnMut(&mut T) -> bool,
    {
        for attempt in 1..=max_attempts {
            let current = self
                .db
                .get(key.as_bytes())
                .map_err(|e| SiloError::Storage(format!("Get failed: {}", e)))?
                .ok_or_else(|| {
                    SiloError::Storage(format!("Document {} vanished during update", key))
                })?;

            let mut doc: T =
                serde_json::from_slice(&current).map_err(SiloError::Serialization)?;

            if !mutate(&mut doc) {
                return Ok(CasOutcome::Skipped);
            }

            let value = serde_json::to_vec(&doc).map_err(SiloError::Serialization)?;

            let swap = self
                .db
                .compare_and_swap(key.as_bytes(), Some(current), Some(value))
                .map_err(|e| SiloError::Storage(format!("Conditional write failed: {}", e)))?;

            match swap {
                Ok(()) => {
                    self.flush()?;
                    return Ok(CasOutcome::Applied { attempts: attempt });
                }
                Err(_) => {
                    tracing::warn!(
                        "Conditional write on {} lost to a concurrent writer (attempt {}/{})",
                        key,
                        attempt,
                        max_attempts
                    );
                }
            }
        }

        Ok(CasOutcome::Contended {
            attempts: max_attempts,
        })
    }

    fn flush(&self) -> Result<()> {
        self.db
            .flush()
            .map_err(|e| SiloError::Storage(format!("Flush failed: {}", e)))?;
        Ok(())
    }
}

/// Open a store honoring an optional explicit path
///
/// The CLI threads its `--db`/config path through here; library callers
/// with no opinion get the default location.
pub fn open(path: Option<&Path>) -> Result<DocumentStore> {
    match path {
        Some(p) => DocumentStore::new_with_path(p),
        None => DocumentStore::new(),
    }
}
