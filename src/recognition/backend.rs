use tokio::sync::{broadcast, mpsc};

use crate::capture::AudioFrame;
use crate::error::SessionError;

/// Events emitted by a live recognition session
#[derive(Debug, Clone)]
pub enum RecognitionEvent {
    /// Intermediate hypothesis; observed but never persisted
    Partial { text: String },
    /// A finalized, diarized utterance
    Final { text: String, speaker_id: u32 },
    /// Backend fault or cancellation; the session goes inert
    Error { message: String },
    /// The session will emit no further events
    Closed,
}

/// Opens streaming recognition sessions.
///
/// One session exists per recording run; a fresh one is opened on every
/// entry into Recording.
#[async_trait::async_trait]
pub trait RecognizerConnector: Send + Sync {
    /// Open a session on `locale`, consuming `frames` and emitting events
    /// on `events`.
    ///
    /// Missing backend configuration is `SessionError::Configuration` and
    /// leaves the session unopened; recording proceeds without transcripts.
    async fn connect(
        &self,
        locale: &str,
        frames: broadcast::Receiver<AudioFrame>,
        events: mpsc::Sender<RecognitionEvent>,
    ) -> Result<Box<dyn RecognitionSession>, SessionError>;
}

/// Handle to a live recognition session
#[async_trait::async_trait]
pub trait RecognitionSession: Send {
    /// Close the session. Idempotent; safe on an already-closed handle.
    ///
    /// After close the session emits `Closed` and releases its event
    /// senders, so no further finalization events are accepted.
    async fn close(&mut self);
}
