pub mod capture;
pub mod config;
pub mod error;
pub mod language;
pub mod recognition;
pub mod session;
pub mod transcript;
pub mod translation;

pub use capture::{
    AudioArtifact, AudioBackend, AudioBackendConfig, AudioBackendFactory, AudioFrame,
    CaptureConfig, CaptureUnit, MicrophoneFactory,
};
pub use config::Config;
pub use error::SessionError;
pub use language::{language_code, Language, DEFAULT_LANGUAGE_CODE, SUPPORTED_LANGUAGES};
pub use recognition::{
    NatsRecognizer, RecognitionEvent, RecognitionSession, RecognizerConnector,
};
pub use session::{MeetingController, Orchestrator, ReplayEngine, SessionState, StateMachine, Transition};
pub use transcript::{speaker_label, TranscriptEntry, TranscriptStore};
pub use translation::{HttpTranslator, TranslationPipeline, Translator};
