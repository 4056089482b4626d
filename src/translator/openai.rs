use super::{Translator, finish_candidate, provider_error};
use crate::error::{GromitError, Result};
use crate::http_client::HttpClient;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

const OPENAI_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// OpenAI Chat Completions adapter.
pub struct OpenAiTranslator {
    http: Arc<dyn HttpClient>,
    model: String,
    api_key: String,
    max_tokens: Option<u32>,
}

impl OpenAiTranslator {
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
}

#[async_trait]
impl Translator for OpenAiTranslator {
    async fn translate(&self, utterance: &str, instruction: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: instruction,
                },
                ChatMessage {
                    role: "user",
                    content: utterance,
                },
            ],
            max_tokens: self.max_tokens,
        };
        let body = serde_json::to_value(&request)
            .map_err(|e| GromitError::Translation(e.to_string()))?;
        let auth = format!("Bearer {}", self.api_key);

        let response = self
            .http
            .post_json(OPENAI_CHAT_URL, &[("Authorization", auth.as_str())], &body)
            .await
            .map_err(|e| GromitError::Translation(format!("OpenAI request failed: {e}")))?;
        debug!("OpenAI responded with status {}", response.status);

        if !response.is_success() {
            return Err(provider_error("OpenAI", &response));
        }

        let parsed: ChatResponse = serde_json::from_str(&response.body).map_err(|e| {
            GromitError::Translation(format!("Failed to parse OpenAI response: {e}"))
        })?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();
        finish_candidate("OpenAI", text)
    }

    fn name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }
}
