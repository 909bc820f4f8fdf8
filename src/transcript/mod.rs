//! Transcript storage
//!
//! This module provides the ordered, append-only transcript log:
//! - `TranscriptEntry`: one finalized utterance, immutable after insertion
//! - `TranscriptStore`: the live log, write-gated on the session state

mod entry;
mod store;

pub use entry::{speaker_label, TranscriptEntry};
pub use store::TranscriptStore;
