use serde::{Deserialize, Serialize};

use crate::config::TranslationConfig;
use crate::error::SessionError;

use super::Translator;

/// REST translation backend.
///
/// POSTs `[{"Text": ...}]` to `{endpoint}/translate?api-version=3.0&to={code}`
/// with subscription key/region headers.
pub struct HttpTranslator {
    client: reqwest::Client,
    endpoint: String,
    key: String,
    region: String,
}

#[derive(Serialize)]
struct TranslationRequest {
    #[serde(rename = "Text")]
    text: String,
}

#[derive(Deserialize)]
struct TranslationResponse {
    translations: Vec<TranslatedText>,
}

#[derive(Deserialize)]
struct TranslatedText {
    text: String,
}

impl HttpTranslator {
    /// Build from config. Missing endpoint/key/region is a configuration
    /// error; the caller decides whether to run untranslated.
    pub fn from_config(config: &TranslationConfig) -> Result<Self, SessionError> {
        let endpoint = config.endpoint.clone().ok_or_else(|| {
            SessionError::Configuration("translation endpoint is not configured".to_string())
        })?;
        let key = config.key.clone().ok_or_else(|| {
            SessionError::Configuration("translation key is not configured".to_string())
        })?;
        let region = config.region.clone().ok_or_else(|| {
            SessionError::Configuration("translation region is not configured".to_string())
        })?;

        Ok(Self {
            client: reqwest::Client::new(),
            endpoint,
            key,
            region,
        })
    }
}

#[async_trait::async_trait]
impl Translator for HttpTranslator {
    async fn translate(&self, text: &str, target: &str) -> Result<String, SessionError> {
        let url = format!("{}/translate", self.endpoint.trim_end_matches('/'));
        let body = [TranslationRequest {
            text: text.to_string(),
        }];

        let response = self
            .client
            .post(&url)
            .query(&[("api-version", "3.0"), ("to", target)])
            .header("Ocp-Apim-Subscription-Key", &self.key)
            .header("Ocp-Apim-Subscription-Region", &self.region)
            .json(&body)
            .send()
            .await
            .map_err(|e| SessionError::Translation(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SessionError::Translation(format!(
                "translation backend returned {}",
                response.status()
            )));
        }

        let results: Vec<TranslationResponse> = response
            .json()
            .await
            .map_err(|e| SessionError::Translation(e.to_string()))?;

        results
            .first()
            .and_then(|r| r.translations.first())
            .map(|t| t.text.clone())
            .ok_or_else(|| {
                SessionError::Translation("translation response contained no result".to_string())
            })
    }
}
