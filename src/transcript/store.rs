use std::sync::Mutex;

use tokio::sync::watch;
use tracing::debug;

use crate::session::SessionState;

use super::TranscriptEntry;

/// Ordered, append-only log of finalized utterances.
///
/// Live appends are gated on `SessionState::Recording`; the gate holds even
/// if a caller bypasses the command surface. Entries never mutate or reorder
/// after insertion. Replay re-inserts entries through a dedicated path that
/// skips the gate, since replay is an explicit, deliberate operation.
pub struct TranscriptStore {
    entries: Mutex<Vec<TranscriptEntry>>,
    state: watch::Receiver<SessionState>,
}

impl TranscriptStore {
    pub fn new(state: watch::Receiver<SessionState>) -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            state,
        }
    }

    /// Append a finalized utterance. Returns the inserted entry, or `None`
    /// when the session is not recording (the utterance is dropped).
    pub fn append(
        &self,
        source_text: &str,
        speaker_id: u32,
        translated_text: Option<String>,
    ) -> Option<TranscriptEntry> {
        if *self.state.borrow() != SessionState::Recording {
            debug!("transcript append rejected outside of recording");
            return None;
        }

        let entry = TranscriptEntry::new(source_text, speaker_id, translated_text);
        self.entries.lock().unwrap().push(entry.clone());
        Some(entry)
    }

    /// Re-insert a replayed entry, minting a fresh id and timestamp.
    /// Skips the recording gate.
    pub fn replay_append(&self, entry: &TranscriptEntry) -> TranscriptEntry {
        let fresh = TranscriptEntry::new(
            &entry.source_text,
            entry.speaker_id,
            entry.translated_text.clone(),
        );
        self.entries.lock().unwrap().push(fresh.clone());
        fresh
    }

    /// Point-in-time copy of all entries, in insertion order
    pub fn snapshot(&self) -> Vec<TranscriptEntry> {
        self.entries.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.entries.lock().unwrap().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().unwrap().is_empty()
    }
}
