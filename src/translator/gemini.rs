use super::{Translator, finish_candidate, provider_error};
use crate::error::{GromitError, Result};
use crate::http_client::HttpClient;
use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

/// Google Gemini `generateContent` adapter.
pub struct GeminiTranslator {
    http: Arc<dyn HttpClient>,
    model: String,
    api_key: String,
    max_tokens: Option<u32>,
}

impl GeminiTranslator {
    pub fn new(
        http: Arc<dyn HttpClient>,
        model: String,
        api_key: String,
        max_tokens: Option<u32>,
    ) -> Self {
        Self {
            http,
            model,
            api_key,
            max_tokens,
        }
    }

    /// The model name becomes one path segment, percent-encoded, so a
    /// name with `/`, `?` or `#` cannot reshape the URL.
    fn endpoint(&self) -> Result<String> {
        let invalid =
            |reason: &str| GromitError::Translation(format!("invalid Gemini endpoint: {reason}"));
        let mut url = Url::parse(GEMINI_BASE_URL).map_err(|e| invalid(&e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| invalid("base URL cannot have path segments"))?
            .push(&format!("{}:generateContent", self.model));
        Ok(url.into())
    }
}

#[async_trait]
impl Translator for GeminiTranslator {
    async fn translate(&self, utterance: &str, instruction: &str) -> Result<String> {
        let mut body = json!({
            "systemInstruction": {
                "parts": [{ "text": instruction }]
            },
            "contents": [
                {
                    "role": "user",
                    "parts": [{ "text": utterance }]
                }
            ]
        });
        if let Some(max_tokens) = self.max_tokens {
            body["generationConfig"] = json!({ "maxOutputTokens": max_tokens });
        }

        let response = self
            .http
            .post_json(
                &self.endpoint()?,
                &[("x-goog-api-key", self.api_key.as_str())],
                &body,
            )
            .await
            .map_err(|e| GromitError::Translation(format!("Gemini request failed: {e}")))?;
        debug!("Gemini responded with status {}", response.status);

        if !response.is_success() {
            return Err(provider_error("Gemini", &response));
        }

        let parsed: GenerateContentResponse =
            serde_json::from_str(&response.body).map_err(|e| {
                GromitError::Translation(format!("Failed to parse Gemini response: {e}"))
            })?;

        let text: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();
        finish_candidate("Gemini", text)
    }

    fn name(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.model
    }
}
