//! Chunk allocation and rollover
//!
//! A session's writable chunk moves through three states: no chunk yet,
//! active (below capacity), and full. This module resolves the chunk the
//! next append should land in, allocating chunk 1 lazily and rolling over
//! to chunk N+1 when the current chunk reaches capacity.
//!
//! Allocation is idempotent by id: when two writers race to create the
//! same chunk, the loser adopts the winner's document instead of failing.
//! Registering the chunk on the session document goes through the bounded
//! conditional-write loop, with a membership re-check on each attempt so a
//! rival's registration counts as success.

use crate::config::StoreConfig;
use crate::docstore::{CasOutcome, CreateOutcome, DocumentStore};
use crate::error::{Result, SiloError};
use metrics::increment_counter;

use super::types::{ChunkDocument, SessionDocument};

/// Resolve the chunk the next message should be appended to
///
/// Reloads `session` from storage whenever an allocation changes it, so
/// the caller always continues with the registered state.
pub(crate) fn resolve_writable_chunk(
    docs: &DocumentStore,
    config: &StoreConfig,
    session: &mut SessionDocument,
) -> Result<ChunkDocument> {
    let current_id = match &session.current_chunk {
        None => return allocate(docs, config, session, 1, 1),
        Some(id) => id.clone(),
    };

    let chunk = match docs.read::<ChunkDocument>(&current_id)? {
        Some(chunk) => chunk,
        None => {
            // The session references a chunk that was never written
            // (partially failed allocation). Re-create it empty under the
            // same id; create-or-adopt keeps this idempotent.
            tracing::warn!(
                "Current chunk {} missing for session {}, re-creating",
                current_id,
                session.id
            );
            let number = session.chunks.len().max(1);
            return allocate(docs, config, session, number, session.message_count + 1);
        }
    };

    chunk.validate()?;

    if chunk.is_full(config.max_messages_per_chunk) {
        let number = session.chunks.len() + 1;
        let range_start = chunk.range_end() + 1;
        increment_counter!("silo_chunk_rollovers_total");
        tracing::debug!(
            "Chunk {} full at {} messages, rolling session {} over to chunk {}",
            chunk.id,
            chunk.message_count,
            session.id,
            number
        );
        return allocate(docs, config, session, number, range_start);
    }

    Ok(chunk)
}

/// Create (or adopt) chunk `chunk_number` and register it on the session
fn allocate(
    docs: &DocumentStore,
    config: &StoreConfig,
    session: &mut SessionDocument,
    chunk_number: usize,
    range_start: usize,
) -> Result<ChunkDocument> {
    let fresh = ChunkDocument::new(&session.id, chunk_number, range_start);
    let chunk_id = fresh.id.clone();

    let chunk = match docs.create(&chunk_id, &fresh)? {
        CreateOutcome::Created => fresh,
        CreateOutcome::Existing(existing) => {
            tracing::debug!("Chunk {} already exists, adopting it", chunk_id);
            existing
        }
    };

    let registered_id = chunk_id.clone();
    let outcome = docs.update(
        &session.id,
        config.session_update_attempts,
        move |doc: &mut SessionDocument| {
            if doc.chunks.iter().any(|c| c == &registered_id) {
                // A rival writer registered this chunk already
                return false;
            }
            doc.chunks.push(registered_id.clone());
            doc.current_chunk = Some(registered_id.clone());
            true
        },
    )?;

    if let CasOutcome::Contended { attempts } = outcome {
        increment_counter!("silo_session_conflicts_total");
        return Err(SiloError::ConflictRetryExhausted {
            session_id: session.id.clone(),
            message_id: None,
            attempts,
        }
        .into());
    }

    // Continue with the registered state, whether we or a rival wrote it
    *session = docs.read(&session.id)?.ok_or_else(|| {
        SiloError::Storage(format!("Session {} vanished during allocation", session.id))
    })?;

    Ok(chunk)
}
