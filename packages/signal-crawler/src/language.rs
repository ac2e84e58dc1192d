//! Production language service: whatlang for detection, a
//! LibreTranslate-compatible HTTP endpoint for translation.
//!
//! Translation is best-effort by contract: any timeout or service error
//! returns the original text, so a broken translator can never fail a
//! company.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use whatlang::Lang;

use crate::config::CrawlConfig;
use crate::traits::LanguageService;

/// Below this many characters detection and translation are skipped.
const MIN_DETECT_CHARS: usize = 20;
const MIN_TRANSLATE_CHARS: usize = 3;

pub struct HttpLanguageService {
    client: reqwest::Client,
    /// Translation endpoint (`POST /translate`). `None` disables translation;
    /// detection still works.
    endpoint: Option<String>,
    timeout: Duration,
    max_chars: usize,
}

#[derive(Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    format: &'a str,
}

#[derive(Deserialize)]
struct TranslateResponse {
    #[serde(rename = "translatedText")]
    translated_text: String,
}

impl HttpLanguageService {
    pub fn new(endpoint: Option<String>, config: &CrawlConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
            timeout: config.translation_timeout,
            max_chars: config.translation_max_chars,
        }
    }

    async fn call_translator(&self, endpoint: &str, text: &str, source: &str) -> Option<String> {
        let request = TranslateRequest {
            q: text,
            source,
            target: "en",
            format: "text",
        };

        let send = self.client.post(endpoint).json(&request).send();
        let response = match tokio::time::timeout(self.timeout, send).await {
            Ok(Ok(response)) => response,
            Ok(Err(err)) => {
                tracing::warn!(error = %err, "translation request failed");
                return None;
            }
            Err(_) => {
                tracing::warn!(timeout = ?self.timeout, "translation timed out");
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::warn!(status = %response.status(), "translation service error");
            return None;
        }

        match response.json::<TranslateResponse>().await {
            Ok(body) if !body.translated_text.trim().is_empty() => Some(body.translated_text),
            Ok(_) => {
                tracing::warn!("translation returned empty text");
                None
            }
            Err(err) => {
                tracing::warn!(error = %err, "translation response unreadable");
                None
            }
        }
    }
}

#[async_trait]
impl LanguageService for HttpLanguageService {
    async fn detect(&self, sample: &str) -> Option<String> {
        if sample.trim().chars().count() < MIN_DETECT_CHARS {
            return None;
        }

        let info = whatlang::detect(sample)?;
        if !info.is_reliable() {
            tracing::debug!(lang = %info.lang(), confidence = info.confidence(), "detection unreliable");
            return None;
        }
        Some(iso639_1(info.lang()).to_string())
    }

    async fn translate(&self, text: &str, source_lang: Option<&str>) -> String {
        if text.trim().chars().count() < MIN_TRANSLATE_CHARS {
            return text.to_string();
        }
        if matches!(source_lang, Some("en")) {
            return text.to_string();
        }
        let Some(endpoint) = &self.endpoint else {
            return text.to_string();
        };

        let bounded: String = text.chars().take(self.max_chars).collect();
        let source = source_lang.unwrap_or("auto");

        match self.call_translator(endpoint, &bounded, source).await {
            Some(translated) => {
                tracing::info!(source, chars = bounded.len(), "content translated");
                translated
            }
            None => text.to_string(),
        }
    }
}

/// whatlang reports ISO 639-3; the pipeline (and the original reference data)
/// speaks 639-1.
fn iso639_1(lang: Lang) -> &'static str {
    match lang {
        Lang::Eng => "en",
        Lang::Nld => "nl",
        Lang::Deu => "de",
        Lang::Fra => "fr",
        Lang::Spa => "es",
        Lang::Pol => "pl",
        Lang::Ita => "it",
        Lang::Por => "pt",
        Lang::Swe => "sv",
        Lang::Dan => "da",
        Lang::Nob => "no",
        Lang::Fin => "fi",
        Lang::Ces => "cs",
        Lang::Slk => "sk",
        Lang::Hun => "hu",
        Lang::Ron => "ro",
        Lang::Rus => "ru",
        Lang::Ukr => "uk",
        Lang::Tur => "tr",
        Lang::Ell => "el",
        other => other.code(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> HttpLanguageService {
        HttpLanguageService::new(None, &CrawlConfig::default())
    }

    #[tokio::test]
    async fn short_samples_are_not_detected() {
        assert_eq!(service().detect("hi").await, None);
    }

    #[tokio::test]
    async fn english_text_detects_as_en() {
        let sample = "We are a consulting firm serving clients across Europe \
            with offices in several countries and a long history of work.";
        assert_eq!(service().detect(sample).await.as_deref(), Some("en"));
    }

    #[tokio::test]
    async fn dutch_text_detects_as_nl() {
        let sample = "Wij zijn een adviesbureau met kantoren in heel Nederland \
            en werken al jaren samen met onze klanten aan mooie projecten.";
        assert_eq!(service().detect(sample).await.as_deref(), Some("nl"));
    }

    #[tokio::test]
    async fn translate_without_endpoint_returns_input() {
        let text = "Wij zijn een adviesbureau met veel ervaring.";
        assert_eq!(service().translate(text, Some("nl")).await, text);
    }

    #[tokio::test]
    async fn translate_skips_english_and_tiny_input() {
        let svc = service();
        assert_eq!(svc.translate("Already English.", Some("en")).await, "Already English.");
        assert_eq!(svc.translate("ab", None).await, "ab");
    }
}
