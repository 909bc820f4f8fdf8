use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub audio: AudioConfig,
    pub recognition: RecognitionConfig,
    pub translation: TranslationConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Directory where finalized recording artifacts are written
    pub recordings_path: String,
    pub sample_rate: u32,
    pub channels: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RecognitionConfig {
    /// STT backend URL. Absence is a configuration error at capture start,
    /// not at process start: recording proceeds without transcripts.
    pub url: Option<String>,
    /// Recognition locale passed to the backend
    pub locale: String,
    /// Subject prefix for published audio frames
    pub subject_prefix: String,
    /// Subject pattern for transcript events
    pub transcript_subject: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TranslationConfig {
    pub endpoint: Option<String>,
    pub key: Option<String>,
    pub region: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Delay after Stop before the session auto-resets to Idle
    pub settle_delay_ms: u64,
    /// Interval between re-emitted entries during replay
    pub replay_interval_ms: u64,
    /// Initial target language (name or code)
    pub default_language: String,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            recordings_path: "recordings".to_string(),
            sample_rate: 16000,
            channels: 1,
        }
    }
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            url: None,
            locale: "en-US".to_string(),
            subject_prefix: "audio.frame".to_string(),
            transcript_subject: "stt.text.>".to_string(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: 500,
            replay_interval_ms: 1000,
            default_language: "English".to_string(),
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Load config from `path` if present, otherwise fall back to defaults.
    /// A present-but-invalid file is still an error.
    pub fn load_or_default(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
