//! Audio capture
//!
//! This module owns the microphone side of a recording run:
//! - `AudioBackend`: capture backend trait emitting PCM frames
//! - `MicrophoneBackend`: cpal default-input-device implementation
//! - `CaptureUnit`: buffers frames in arrival order, fans them out to the
//!   recognition session, and finalizes exactly one WAV artifact per run

pub mod backend;
pub mod microphone;
mod unit;

pub use backend::{AudioBackend, AudioBackendConfig, AudioBackendFactory, AudioFrame};
pub use microphone::{MicrophoneBackend, MicrophoneFactory};
pub use unit::{AudioArtifact, CaptureConfig, CaptureUnit};
