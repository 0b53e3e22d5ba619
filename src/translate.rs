//! English translation fallback for words whose entry has none.

use crate::config::TranslatorConfig;
use anyhow::{Context, Result};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};

pub trait Translator {
    /// German to English. `Ok(None)` when no translation is available.
    fn translate(&self, word: &str) -> Result<Option<String>>;
}

/// Used when no translation service is configured.
pub struct NoTranslator;

impl Translator for NoTranslator {
    fn translate(&self, _word: &str) -> Result<Option<String>> {
        Ok(None)
    }
}

/// Microsoft Translator Text API v3.
pub struct MicrosoftTranslator {
    client: Client,
    endpoint: String,
    key: String,
    region: Option<String>,
}

#[derive(Serialize)]
struct TranslateRequest<'a> {
    #[serde(rename = "Text")]
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    translations: Vec<TranslatedText>,
}

#[derive(Debug, Deserialize)]
struct TranslatedText {
    text: String,
}

fn first_translation(responses: Vec<TranslateResponse>) -> Option<String> {
    responses
        .into_iter()
        .flat_map(|response| response.translations)
        .map(|translation| translation.text.trim().to_string())
        .find(|text| !text.is_empty())
}

impl MicrosoftTranslator {
    pub fn new(config: &TranslatorConfig, key: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(MicrosoftTranslator {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            key: key.to_string(),
            region: config.region.clone(),
        })
    }

    fn translate_url(&self) -> String {
        format!("{}/translate?api-version=3.0&from=de&to=en", self.endpoint)
    }
}

impl Translator for MicrosoftTranslator {
    fn translate(&self, word: &str) -> Result<Option<String>> {
        info!(word, "asking translation service");

        let mut request = self
            .client
            .post(self.translate_url())
            .header("Ocp-Apim-Subscription-Key", &self.key)
            .json(&[TranslateRequest { text: word }]);
        if let Some(region) = &self.region {
            request = request.header("Ocp-Apim-Subscription-Region", region);
        }

        let responses: Vec<TranslateResponse> = request
            .send()
            .context("Translation request failed")?
            .error_for_status()
            .context("Translation service returned an error")?
            .json()
            .context("Unexpected translation response")?;

        Ok(first_translation(responses))
    }
}

/// Translator for `config`, with `key` taking precedence over the configured key.
pub fn from_config(config: &TranslatorConfig, key: Option<&str>, timeout: Duration) -> Result<Box<dyn Translator>> {
    match key.or(config.key.as_deref()) {
        Some(key) if !key.is_empty() => Ok(Box::new(MicrosoftTranslator::new(config, key, timeout)?)),
        _ => {
            warn!("no translator key configured, translation fallback disabled");
            Ok(Box::new(NoTranslator))
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests for translators
// ─────────────────────────────────────────────────────────────────────────────
