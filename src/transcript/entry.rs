use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single finalized utterance in the transcript
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptEntry {
    /// Unique entry id; replay mints a fresh one per re-inserted entry
    pub id: Uuid,

    /// Text as emitted by the recognition backend
    pub source_text: String,

    /// Translated text, if a translation was performed. Falls back to the
    /// source text when the translation backend fails.
    pub translated_text: Option<String>,

    /// Diarized speaker identity from the recognition backend
    pub speaker_id: u32,

    /// Display label derived from the speaker id
    pub speaker_label: String,

    /// When the entry was inserted
    pub created_at: DateTime<Utc>,
}

impl TranscriptEntry {
    pub fn new(source_text: &str, speaker_id: u32, translated_text: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            source_text: source_text.to_string(),
            translated_text,
            speaker_id,
            speaker_label: speaker_label(speaker_id),
            created_at: Utc::now(),
        }
    }

    /// Text to present: the translation when one exists, the source otherwise
    pub fn display_text(&self) -> &str {
        self.translated_text.as_deref().unwrap_or(&self.source_text)
    }
}

/// Speaker ids are 0-based; labels are 1-based ("Speaker 1", "Speaker 2", ...)
pub fn speaker_label(speaker_id: u32) -> String {
    format!("Speaker {}", speaker_id + 1)
}
