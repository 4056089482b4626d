use super::{Translator, finish_candidate, provider_error};
use crate::error::{GromitError, Result};
use crate::http_client::HttpClient;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

const ANTHROPIC_MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// The Messages API requires `max_tokens`; this is used when none is given.
pub const DEFAULT_MAX_TOKENS: u32 = 1024;

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

/// Anthropic Messages API adapter.
pub struct AnthropicTranslator {
    http: Arc<dyn HttpClient>,
    model: String,
    api_key: String,
    max_tokens: Option<u32>,
}

impl AnthropicTranslator {
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
impl Translator for AnthropicTranslator {
    async fn translate(&self, utterance: &str, instruction: &str) -> Result<String> {
        let body = json!({
            "model": self.model,
            "max_tokens": self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            "system": instruction,
            "messages": [
                {
                    "role": "user",
                    "content": utterance
                }
            ]
        });

        let response = self
            .http
            .post_json(
                ANTHROPIC_MESSAGES_URL,
                &[
                    ("x-api-key", self.api_key.as_str()),
                    ("anthropic-version", ANTHROPIC_VERSION),
                ],
                &body,
            )
            .await
            .map_err(|e| GromitError::Translation(format!("Anthropic request failed: {e}")))?;
        debug!("Anthropic responded with status {}", response.status);

        if !response.is_success() {
            return Err(provider_error("Anthropic", &response));
        }

        let parsed: MessagesResponse = serde_json::from_str(&response.body).map_err(|e| {
            GromitError::Translation(format!("Failed to parse Anthropic response: {e}"))
        })?;

        // Text blocks are joined in the order they were returned.
        let text: String = parsed
            .content
            .into_iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text)
            .collect();
        finish_candidate("Anthropic", text)
    }

    fn name(&self) -> &str {
        "anthropic"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_client::mock::MockHttpClient;

    fn translator(client: Arc<MockHttpClient>, max_tokens: Option<u32>) -> AnthropicTranslator {
        AnthropicTranslator::new(
            client,
            "claude-3-5-haiku-latest".to_string(),
            "sk-ant-test".to_string(),
            max_tokens,
        )
    }

    #[tokio::test]
    async fn test_joins_text_blocks_in_order() {
        let client = Arc::new(MockHttpClient::new(
            200,
            r#"{"content":[{"type":"text","text":"find . "},{"type":"text","text":"-name '*.rs'\n"}]}"#,
        ));

        let command = translator(client, None).translate("q", "p").await.unwrap();

        assert_eq!(command, "find . -name '*.rs'");
    }

    #[tokio::test]
    async fn test_request_uses_system_field_and_default_max_tokens() {
        let client = Arc::new(MockHttpClient::new(
            200,
            r#"{"content":[{"type":"text","text":"ls"}]}"#,
        ));

        translator(client.clone(), None)
            .translate("list files", "be terse")
            .await
            .unwrap();

        let request = client.last_request();
        assert_eq!(request.url, ANTHROPIC_MESSAGES_URL);
        assert_eq!(request.header("x-api-key"), Some("sk-ant-test"));
        assert_eq!(request.header("anthropic-version"), Some(ANTHROPIC_VERSION));
        assert_eq!(request.body["system"], "be terse");
        assert_eq!(request.body["max_tokens"], DEFAULT_MAX_TOKENS);
        assert_eq!(request.body["messages"][0]["content"], "list files");
    }

    #[tokio::test]
    async fn test_explicit_max_tokens_is_sent() {
        let client = Arc::new(MockHttpClient::new(
            200,
            r#"{"content":[{"type":"text","text":"ls"}]}"#,
        ));

        translator(client.clone(), Some(50)).translate("q", "p").await.unwrap();

        assert_eq!(client.last_request().body["max_tokens"], 50);
    }

    #[tokio::test]
    async fn test_empty_content_is_translation_error() {
        let client = Arc::new(MockHttpClient::new(200, r#"{"content":[]}"#));

        let err = translator(client, None).translate("q", "p").await.unwrap_err();

        assert!(matches!(err, GromitError::Translation(_)));
    }

    #[tokio::test]
    async fn test_api_error_surfaces_provider_message() {
        let client = Arc::new(MockHttpClient::new(
            401,
            r#"{"type":"error","error":{"type":"authentication_error","message":"invalid x-api-key"}}"#,
        ));

        let err = translator(client, None).translate("q", "p").await.unwrap_err();

        assert_eq!(err.to_string(), "Anthropic API error (401): invalid x-api-key");
    }
}
