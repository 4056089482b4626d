//! Offline translator used in mock mode (`GROMIT_USE_MOCK`).
//!
//! Maps a handful of recognisable requests onto fixed commands so the whole
//! session can be exercised without a network or an API key.

use super::{AiParameters, Agent, ProviderSelector, Translator};
use crate::error::{GromitError, Result};
use async_trait::async_trait;
use tracing::info;

/// Deterministic keyword-based translator.
pub struct MockTranslator {
    model: String,
}

impl MockTranslator {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
        }
    }

    /// Returns the canned command for `utterance`, if there is one.
    pub fn command_for(utterance: &str) -> Option<&'static str> {
        let lower = utterance.to_lowercase();
        if lower.contains("list") && lower.contains("file") {
            Some("ls")
        } else if lower.contains("time") || lower.contains("date") {
            Some("date")
        } else if lower.contains("directory") || lower.contains("where am i") {
            Some("pwd")
        } else if lower.contains("hello") || lower.contains("greet") {
            Some("echo hello")
        } else if lower.contains("broken") {
            Some("ls /definitely/not/a/real/path")
        } else {
            None
        }
    }
}

#[async_trait]
impl Translator for MockTranslator {
    async fn translate(&self, utterance: &str, _instruction: &str) -> Result<String> {
        Self::command_for(utterance)
            .map(str::to_string)
            .ok_or_else(|| GromitError::Translation("unable to find the correct command".to_string()))
    }

    fn name(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Selector that applies the usual agent validation but always hands out a
/// [`MockTranslator`].
pub struct MockSelector;

impl ProviderSelector for MockSelector {
    fn select(&self, params: &AiParameters) -> Result<Box<dyn Translator>> {
        let model = params.model.clone().filter(|m| !m.is_empty());
        let agent = Agent::resolve(params.agent.as_deref(), model.as_deref())?;
        let model = model.unwrap_or_else(|| agent.default_model().to_string());
        info!("Mock mode: standing in for '{}' ({})", agent, model);
        Ok(Box::new(MockTranslator::new(model)))
    }
}
