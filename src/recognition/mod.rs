//! Streaming speech recognition
//!
//! The orchestrator never sees a concrete backend SDK shape; it depends on
//! the uniform event-source contract in `backend`:
//! - `RecognizerConnector`: opens one streaming session per recording run
//! - `RecognitionSession`: live session handle with idempotent close
//! - `RecognitionEvent`: partial/final/error/closed events
//!
//! `nats` provides the concrete backend: PCM frames go out as base64 JSON
//! messages, diarized transcript events come back on a subscription.

pub mod backend;
pub mod messages;
pub mod nats;

pub use backend::{RecognitionEvent, RecognitionSession, RecognizerConnector};
pub use messages::{AudioFrameMessage, TranscriptMessage};
pub use nats::NatsRecognizer;
