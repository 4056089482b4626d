//! Provider adapters that turn an utterance into a shell command.
//!
//! Each supported backend implements [`Translator`]. A [`ProviderSelector`]
//! maps the user's agent/model choice onto one adapter instance; the
//! production selector is [`DefaultSelector`].
//!
//! Adapters are stateless: every `translate` call is one independent request
//! with no conversation history.

pub mod anthropic;
pub mod gemini;
pub mod mock;
pub mod openai;

use crate::error::{GromitError, Result};
use crate::http_client::{HttpClient, HttpResponse, ReqwestHttpClient};
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::info;

pub use anthropic::AnthropicTranslator;
pub use gemini::GeminiTranslator;
pub use mock::{MockSelector, MockTranslator};
pub use openai::OpenAiTranslator;

/// The closed set of supported backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Agent {
    OpenAi,
    Anthropic,
    Gemini,
}

/// Backend used when no agent is given.
pub const DEFAULT_AGENT: Agent = Agent::OpenAi;

impl Agent {
    pub const ALL: [Agent; 3] = [Agent::OpenAi, Agent::Anthropic, Agent::Gemini];

    /// Canonical lowercase name, as accepted by `--agent`.
    pub fn name(&self) -> &'static str {
        match self {
            Agent::OpenAi => "openai",
            Agent::Anthropic => "anthropic",
            Agent::Gemini => "gemini",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Agent::OpenAi => "gpt-4o",
            Agent::Anthropic => "claude-3-5-haiku-latest",
            Agent::Gemini => "gemini-2.5-flash-lite",
        }
    }

    /// Environment variable consulted when no explicit key is given.
    pub fn credential_env_var(&self) -> &'static str {
        match self {
            Agent::OpenAi => "OPENAI_API_KEY",
            Agent::Anthropic => "ANTHROPIC_API_KEY",
            Agent::Gemini => "GEMINI_API_KEY",
        }
    }

    /// Looks an agent up by name, ignoring case.
    pub fn parse(name: &str) -> Option<Agent> {
        Self::ALL
            .into_iter()
            .find(|agent| agent.name().eq_ignore_ascii_case(name))
    }

    /// Turns an optional agent name into an agent. An absent or empty name
    /// means [`DEFAULT_AGENT`].
    ///
    /// # Errors
    ///
    /// Returns [`GromitError::UnsupportedAgent`] naming both the agent and the
    /// model exactly as given when the name is not a known agent.
    pub fn resolve(name: Option<&str>, model: Option<&str>) -> Result<Agent> {
        match name.filter(|n| !n.is_empty()) {
            None => Ok(DEFAULT_AGENT),
            Some(name) => Self::parse(name).ok_or_else(|| GromitError::UnsupportedAgent {
                agent: name.to_string(),
                model: model.unwrap_or_default().to_string(),
            }),
        }
    }
}

impl fmt::Display for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Translates a natural-language request into one literal command.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Makes exactly one backend request and returns the first candidate's
    /// text, trimmed.
    ///
    /// # Errors
    ///
    /// Returns [`GromitError::Translation`] when the call fails or the
    /// response holds no usable text. Nothing is retried.
    async fn translate(&self, utterance: &str, instruction: &str) -> Result<String>;

    /// Backend name, for logging.
    fn name(&self) -> &str;

    /// Model this adapter was resolved to.
    fn model(&self) -> &str;
}

/// Everything the user said about which backend to use.
///
/// Empty strings behave exactly like absent values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AiParameters {
    pub agent: Option<String>,
    pub model: Option<String>,
    pub api_key: Option<String>,
    pub max_tokens: Option<u32>,
}

/// Chooses a [`Translator`] for a set of [`AiParameters`].
///
/// Implementations must not perform I/O; failures from a missing credential
/// show up later when the adapter is used.
pub trait ProviderSelector: Send + Sync {
    fn select(&self, params: &AiParameters) -> Result<Box<dyn Translator>>;
}

type CredentialLookup = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Selector for the real backends.
pub struct DefaultSelector {
    http: Arc<dyn HttpClient>,
    env_lookup: CredentialLookup,
    stored_keys: HashMap<String, String>,
}

impl DefaultSelector {
    pub fn new() -> Self {
        Self::with_http_client(Arc::new(ReqwestHttpClient::new()))
    }

    /// Creates a selector whose adapters share `http`.
    pub fn with_http_client(http: Arc<dyn HttpClient>) -> Self {
        Self {
            http,
            env_lookup: Box::new(|name| std::env::var(name).ok()),
            stored_keys: HashMap::new(),
        }
    }

    /// Replaces how provider environment variables are read (for testing).
    pub fn with_env_lookup(
        mut self,
        lookup: impl Fn(&str) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        self.env_lookup = Box::new(lookup);
        self
    }

    /// Adds keys from the config file, keyed by agent name. They are used
    /// only when neither an explicit key nor the environment variable is set.
    pub fn with_stored_keys(mut self, keys: HashMap<String, String>) -> Self {
        self.stored_keys = keys;
        self
    }

    /// Resolves agent, model and credential without building an adapter.
    pub fn resolve(&self, params: &AiParameters) -> Result<(Agent, String, String)> {
        let agent_name = non_empty(&params.agent);
        let model_name = non_empty(&params.model);

        let agent = Agent::resolve(agent_name, model_name)?;

        let model = model_name.unwrap_or(agent.default_model()).to_string();

        let api_key = non_empty(&params.api_key)
            .map(str::to_string)
            .or_else(|| (self.env_lookup)(agent.credential_env_var()).filter(|k| !k.is_empty()))
            .or_else(|| self.stored_keys.get(agent.name()).cloned())
            .unwrap_or_default();

        Ok((agent, model, api_key))
    }
}

impl Default for DefaultSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl ProviderSelector for DefaultSelector {
    fn select(&self, params: &AiParameters) -> Result<Box<dyn Translator>> {
        let (agent, model, api_key) = self.resolve(params)?;
        info!("Selected agent '{}' with model '{}'", agent, model);

        let http = Arc::clone(&self.http);
        let max_tokens = params.max_tokens;
        Ok(match agent {
            Agent::OpenAi => Box::new(OpenAiTranslator::new(http, model, api_key, max_tokens)),
            Agent::Anthropic => {
                Box::new(AnthropicTranslator::new(http, model, api_key, max_tokens))
            }
            Agent::Gemini => Box::new(GeminiTranslator::new(http, model, api_key, max_tokens)),
        })
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// Builds the error for a non-2xx provider response, preferring the
/// provider's own `error.message` over the raw body.
pub(crate) fn provider_error(provider: &str, response: &HttpResponse) -> GromitError {
    let message = serde_json::from_str::<serde_json::Value>(&response.body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| response.body.trim().to_string());
    GromitError::Translation(format!(
        "{provider} API error ({}): {message}",
        response.status
    ))
}

/// Turns the joined candidate text into a command, rejecting empty output.
pub(crate) fn finish_candidate(provider: &str, text: String) -> Result<String> {
    let command = text.trim().to_string();
    if command.is_empty() {
        return Err(GromitError::Translation(format!(
            "{provider} returned no command"
        )));
    }
    Ok(command)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_client::mock::MockHttpClient;

    fn selector() -> DefaultSelector {
        DefaultSelector::with_http_client(Arc::new(MockHttpClient::new(200, "{}")))
            .with_env_lookup(|_| None)
    }

    fn params(agent: &str, model: &str) -> AiParameters {
        AiParameters {
            agent: Some(agent.to_string()),
            model: Some(model.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_no_agent_and_model_defaults_to_openai() {
        let translator = selector().select(&AiParameters::default()).unwrap();

        assert_eq!(translator.name(), "openai");
        assert_eq!(translator.model(), "gpt-4o");
    }

    #[test]
    fn test_omitted_model_resolves_to_provider_default() {
        for agent in Agent::ALL {
            let translator = selector().select(&params(agent.name(), "")).unwrap();

            assert_eq!(translator.name(), agent.name());
            assert_eq!(translator.model(), agent.default_model());
        }
    }

    #[test]
    fn test_given_model_is_kept() {
        let translator = selector().select(&params("openai", "gpt-5o-mini")).unwrap();
        assert_eq!(translator.model(), "gpt-5o-mini");

        let translator = selector()
            .select(&params("anthropic", "claude-opus-4-0"))
            .unwrap();
        assert_eq!(translator.model(), "claude-opus-4-0");

        let translator = selector()
            .select(&params("gemini", "gemini-2.5-flash-preview-tts"))
            .unwrap();
        assert_eq!(translator.model(), "gemini-2.5-flash-preview-tts");
    }

    #[test]
    fn test_agent_name_is_case_insensitive() {
        let translator = selector().select(&params("OpenAI", "")).unwrap();

        assert_eq!(translator.name(), "openai");
    }

    #[test]
    fn test_unknown_agent_names_agent_and_model() {
        let err = selector()
            .select(&params("Unknown agent", "unknown model"))
            .err()
            .unwrap();

        assert!(matches!(err, GromitError::UnsupportedAgent { .. }));
        assert_eq!(
            err.to_string(),
            "cannot create AI agent for Unknown agent and model unknown model"
        );
    }

    #[test]
    fn test_agent_resolve_handles_default_known_and_unknown_names() {
        assert_eq!(Agent::resolve(None, None).unwrap(), DEFAULT_AGENT);
        assert_eq!(Agent::resolve(Some(""), Some("m")).unwrap(), DEFAULT_AGENT);
        assert_eq!(Agent::resolve(Some("GEMINI"), None).unwrap(), Agent::Gemini);

        let err = Agent::resolve(Some("skynet"), Some("t800")).unwrap_err();
        assert_eq!(err.to_string(), "cannot create AI agent for skynet and model t800");
    }

    #[test]
    fn test_explicit_key_wins_over_environment() {
        let selector = selector().with_env_lookup(|_| Some("from-env".to_string()));
        let mut p = params("anthropic", "");
        p.api_key = Some("explicit".to_string());

        let (_, _, key) = selector.resolve(&p).unwrap();

        assert_eq!(key, "explicit");
    }

    #[test]
    fn test_environment_key_uses_provider_variable() {
        let selector = selector().with_env_lookup(|name| {
            (name == "GEMINI_API_KEY").then(|| "gemini-key".to_string())
        });

        let (agent, _, key) = selector.resolve(&params("gemini", "")).unwrap();

        assert_eq!(agent, Agent::Gemini);
        assert_eq!(key, "gemini-key");
    }

    #[test]
    fn test_stored_key_is_last_resort() {
        let mut keys = HashMap::new();
        keys.insert("openai".to_string(), "stored".to_string());
        let selector = selector().with_stored_keys(keys);

        let (_, _, key) = selector.resolve(&AiParameters::default()).unwrap();

        assert_eq!(key, "stored");
    }

    #[test]
    fn test_missing_credential_is_not_a_selection_error() {
        let (_, _, key) = selector().resolve(&AiParameters::default()).unwrap();

        assert!(key.is_empty());
    }

    #[test]
    fn test_provider_error_prefers_error_message() {
        let response = HttpResponse {
            status: 401,
            body: r#"{"error":{"message":"Incorrect API key provided"}}"#.to_string(),
        };

        let err = provider_error("OpenAI", &response);

        assert_eq!(
            err.to_string(),
            "OpenAI API error (401): Incorrect API key provided"
        );
    }

    #[test]
    fn test_provider_error_falls_back_to_body() {
        let response = HttpResponse {
            status: 502,
            body: "Bad Gateway\n".to_string(),
        };

        assert_eq!(
            provider_error("Gemini", &response).to_string(),
            "Gemini API error (502): Bad Gateway"
        );
    }

    #[test]
    fn test_finish_candidate_rejects_blank_text() {
        assert!(finish_candidate("OpenAI", "  \n".to_string()).is_err());
        assert_eq!(finish_candidate("OpenAI", " ls -la\n".to_string()).unwrap(), "ls -la");
    }
}
