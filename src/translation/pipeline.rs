use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::TranslationConfig;
use crate::language::DEFAULT_LANGUAGE_CODE;

use super::{HttpTranslator, Translator};

/// Policy layer over the translation backend.
///
/// Translation failures are non-fatal: the utterance is still recorded,
/// just with the original text. No retries, no internal timeout beyond
/// whatever the backend imposes.
pub struct TranslationPipeline {
    backend: Option<Arc<dyn Translator>>,
}

impl TranslationPipeline {
    pub fn new(backend: Arc<dyn Translator>) -> Self {
        Self {
            backend: Some(backend),
        }
    }

    /// A pipeline with no backend; every utterance keeps its original text.
    pub fn disabled() -> Self {
        Self { backend: None }
    }

    /// Build from config, degrading to a disabled pipeline when the backend
    /// is not configured. The orchestrator surfaces that at capture start.
    pub fn from_config(config: &TranslationConfig) -> Self {
        match HttpTranslator::from_config(config) {
            Ok(translator) => Self::new(Arc::new(translator)),
            Err(e) => {
                debug!("translation backend unavailable: {}", e);
                Self::disabled()
            }
        }
    }

    pub fn is_configured(&self) -> bool {
        self.backend.is_some()
    }

    /// Translate one utterance.
    ///
    /// Returns `None` when no translation applies (empty text, or the target
    /// is already the source language; no backend call is made), otherwise
    /// the translated text, falling back to the original on failure.
    pub async fn translate(&self, text: &str, target: &str) -> Option<String> {
        if text.is_empty() || target == DEFAULT_LANGUAGE_CODE {
            return None;
        }

        let Some(backend) = &self.backend else {
            return Some(text.to_string());
        };

        match backend.translate(text, target).await {
            Ok(translated) => Some(translated),
            Err(e) => {
                warn!("Translation failed, keeping original text: {}", e);
                Some(text.to_string())
            }
        }
    }
}
