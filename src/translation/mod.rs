//! Per-utterance translation
//!
//! - `Translator`: backend trait for a single text/target-language call
//! - `HttpTranslator`: REST backend implementation
//! - `TranslationPipeline`: policy layer with the default-language
//!   short-circuit and fall-back-to-original on backend failure

pub mod http;
mod pipeline;

pub use http::HttpTranslator;
pub use pipeline::TranslationPipeline;

use crate::error::SessionError;

/// Translation backend contract
#[async_trait::async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, target: &str) -> Result<String, SessionError>;
}
