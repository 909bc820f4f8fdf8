use thiserror::Error;

/// Error taxonomy for the session core.
///
/// None of these are fatal to the session: configuration and recognition
/// failures leave recording running without transcripts, capture failures
/// abort the transition into recording, and translation failures fall back
/// to the original text.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Required backend configuration (credentials/region/URL) is missing.
    /// Surfaced at capture start, not at process start.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Microphone denied or unavailable.
    #[error("capture error: {0}")]
    Capture(String),

    /// Recognition backend fault or cancellation.
    #[error("recognition error: {0}")]
    Recognition(String),

    /// Translation backend fault or timeout.
    #[error("translation error: {0}")]
    Translation(String),
}
