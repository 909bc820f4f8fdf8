use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use tracing::{info, warn};

use crate::transcript::{TranscriptEntry, TranscriptStore};

/// Replays a finished session's transcript at a fixed cadence.
///
/// `capture` freezes the store's content at Stop; `play` clears the live
/// store and re-inserts the frozen entries one per interval. The playing
/// flag exists solely to reject concurrent replay triggers.
pub struct ReplayEngine {
    interval: Duration,
    buffer: Mutex<Vec<TranscriptEntry>>,
    playing: AtomicBool,
}

impl ReplayEngine {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            buffer: Mutex::new(Vec::new()),
            playing: AtomicBool::new(false),
        }
    }

    /// Snapshot the store. Later store mutations do not affect the buffer.
    pub fn capture(&self, store: &TranscriptStore) {
        let snapshot = store.snapshot();
        info!("Captured {} transcript entries for replay", snapshot.len());
        *self.buffer.lock().unwrap() = snapshot;
    }

    /// The frozen buffer content, in original order
    pub fn captured(&self) -> Vec<TranscriptEntry> {
        self.buffer.lock().unwrap().clone()
    }

    /// Replay the captured buffer into the store. No-op (returns false)
    /// when the buffer is empty or a replay is already in progress.
    ///
    /// Re-inserted entries keep their text, speaker and translation but get
    /// a fresh id and timestamp.
    pub async fn play(&self, store: &TranscriptStore) -> bool {
        let entries = self.buffer.lock().unwrap().clone();
        if entries.is_empty() {
            return false;
        }

        if self
            .playing
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            warn!("Replay already in progress");
            return false;
        }

        info!("Replaying {} transcript entries", entries.len());
        store.clear();

        for entry in &entries {
            tokio::time::sleep(self.interval).await;
            let fresh = store.replay_append(entry);
            info!("[{}] {}", fresh.speaker_label, fresh.display_text());
        }

        self.playing.store(false, Ordering::SeqCst);
        true
    }
}
