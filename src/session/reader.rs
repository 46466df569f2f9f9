//! Read paths over the chunk sequence
//!
//! Three access patterns with different traversal strategies: full
//! reconstruction walks every chunk in order, the tail window walks chunks
//! in reverse and stops as soon as enough messages are gathered, and
//! pagination windows the full chronological list. All readers re-sort by
//! timestamp rather than trusting storage order, and a missing chunk is
//! skipped, never fatal.

use crate::docstore::CasOutcome;
use crate::error::Result;

use super::types::{ChunkDocument, Message, SessionDocument};
use super::SessionStore;

impl SessionStore {
    /// Reconstruct the complete conversation, oldest first
    ///
    /// Returns an empty list for an unknown session. When the loaded
    /// message total disagrees with the session's denormalized counter
    /// (possible after conflicting concurrent appends), the counter is
    /// reconciled back to the observed total, best-effort.
    ///
    /// # Errors
    ///
    /// Returns `SiloError::Storage` on read failure; a chunk referenced
    /// by the session but absent from storage is skipped instead.
    pub fn get_conversation(&self, session_id: &str) -> Result<Vec<Message>> {
        let session = match self.get_session(session_id)? {
            Some(session) => session,
            None => return Ok(Vec::new()),
        };

        let mut messages = Vec::with_capacity(session.message_count);
        for chunk_id in &session.chunks {
            match self.docs().read::<ChunkDocument>(chunk_id)? {
                Some(chunk) => messages.extend(chunk.messages),
                None => {
                    tracing::warn!("Chunk {} not found, skipping", chunk_id);
                }
            }
        }

        messages.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));

        self.reconcile_message_count(&session, messages.len())?;

        tracing::debug!(
            "Loaded {} messages for session {}",
            messages.len(),
            session_id
        );
        Ok(messages)
    }

    /// Read the last `n` messages, chronological
    ///
    /// Walks the chunk list newest-first and stops gathering as soon as
    /// `n` messages are on hand, so long conversations never load their
    /// full history for the common recent-context case. `n == 0` returns
    /// empty immediately.
    ///
    /// # Errors
    ///
    /// Returns `SiloError::Storage` on read failure; missing chunks are
    /// skipped.
    pub fn get_n_messages(&self, session_id: &str, n: usize) -> Result<Vec<Message>> {
        if n == 0 {
            return Ok(Vec::new());
        }

        let session = match self.get_session(session_id)? {
            Some(session) => session,
            None => return Ok(Vec::new()),
        };

        // Gather newest-first, then restore chronological chunk order
        let mut tail_chunks: Vec<Vec<Message>> = Vec::new();
        let mut gathered = 0;
        for chunk_id in session.chunks.iter().rev() {
            match self.docs().read::<ChunkDocument>(chunk_id)? {
                Some(chunk) => {
                    gathered += chunk.messages.len();
                    tail_chunks.push(chunk.messages);
                }
                None => {
                    tracing::warn!("Chunk {} not found, skipping", chunk_id);
                }
            }
            if gathered >= n {
                break;
            }
        }

        let mut messages: Vec<Message> = tail_chunks.into_iter().rev().flatten().collect();
        messages.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));

        let start = messages.len().saturating_sub(n);
        Ok(messages.split_off(start))
    }

    /// Read one page of history, `offset` messages back from the newest
    ///
    /// `offset == 0` is the most recent page; larger offsets step further
    /// back in time. Offsets at or beyond the conversation length yield a
    /// clipped or empty result, never an error, and `limit == 0` returns
    /// empty immediately.
    ///
    /// # Errors
    ///
    /// Returns `SiloError::Storage` on read failure.
    pub fn get_messages_paginated(
        &self,
        session_id: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Message>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let messages = self.get_conversation(session_id)?;
        let total = messages.len();

        let end = total.saturating_sub(offset);
        if end == 0 {
            return Ok(Vec::new());
        }
        let start = end.saturating_sub(limit);

        Ok(messages[start..end].to_vec())
    }

    /// Write an observed message total back to a drifted session counter
    ///
    /// Concurrent appends can leave `session.message_count` understating
    /// the stored total when a counter update exhausts its conditional
    /// writes. A full load knows the real total, so it repairs the counter
    /// here. Losing this write to yet another concurrent writer is fine;
    /// a later read gets another chance.
    fn reconcile_message_count(&self, session: &SessionDocument, observed: usize) -> Result<()> {
        if session.message_count == observed {
            return Ok(());
        }

        tracing::debug!(
            "Session {} counter {} disagrees with {} stored messages, reconciling",
            session.id,
            session.message_count,
            observed
        );

        let outcome = self.docs().update(
            &session.id,
            self.config().session_update_attempts,
            |doc: &mut SessionDocument| {
                if doc.message_count == observed {
                    return false;
                }
                doc.message_count = observed;
                true
            },
        )?;

        if let CasOutcome::Contended { .. } = outcome {
            tracing::debug!(
                "Reconciliation of session {} lost to concurrent writers, leaving it",
                session.id
            );
        }

        Ok(())
    }
}
