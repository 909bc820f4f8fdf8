use serde::{Deserialize, Serialize};

/// Audio frame message published to the STT backend
#[derive(Debug, Serialize, Deserialize)]
pub struct AudioFrameMessage {
    pub session_id: String,
    pub sequence: u32,
    /// Recognition locale for this run (e.g. "en-US")
    pub locale: String,
    /// Base64-encoded PCM bytes
    pub pcm: String,
    pub sample_rate: u32,
    pub channels: u16,
    /// RFC3339 timestamp
    pub timestamp: String,
    #[serde(rename = "final")]
    pub final_frame: bool,
}

/// Transcript message received from the STT backend
#[derive(Debug, Serialize, Deserialize)]
pub struct TranscriptMessage {
    pub session_id: String,
    #[serde(default)]
    pub text: String,
    /// Diarized speaker identity; backends without diarization omit it
    #[serde(default)]
    pub speaker_id: u32,
    #[serde(default)]
    pub partial: bool,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub confidence: Option<f32>,
    /// Set when the backend reports a fault for this session
    #[serde(default)]
    pub error: Option<String>,
}
