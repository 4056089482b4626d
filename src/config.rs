//! Persistent user configuration (`~/.gromit/config.toml`).
//!
//! Every key is optional; CLI options override whatever is stored here.

use crate::error::{GromitError, Result};
use dirs::home_dir;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// Environment variable that forces the offline mock translator.
pub const MOCK_ENV_VAR: &str = "GROMIT_USE_MOCK";

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ask_for_confirmation: Option<bool>,
    #[serde(default)]
    pub use_mock: bool,
    /// API keys keyed by agent name (`openai`, `anthropic`, `gemini`).
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub api_keys: HashMap<String, String>,
}

impl Config {
    /// Loads the config file if present, then applies environment overrides.
    ///
    /// # Errors
    ///
    /// A config file that exists but cannot be read or parsed is an error;
    /// a missing one is not.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::get_config_path()?)?;

        if std::env::var_os(MOCK_ENV_VAR).is_some() {
            config.use_mock = true;
        }

        Ok(config)
    }

    /// Loads configuration from `path`, falling back to defaults when the
    /// file does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("No config file found, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content).map_err(|e| {
            GromitError::ConfigValidation(format!(
                "invalid config file {}: {}",
                path.display(),
                e
            ))
        })?;
        info!("Loaded config from: {}", path.display());
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| GromitError::ConfigValidation(e.to_string()))?;
        fs::write(path, content)?;
        info!("Saved config to: {}", path.display());
        Ok(())
    }

    pub fn get_config_path() -> Result<PathBuf> {
        Ok(Self::get_config_dir()?.join("config.toml"))
    }

    pub fn get_config_dir() -> Result<PathBuf> {
        let home = home_dir().ok_or_else(|| {
            GromitError::ConfigValidation("Could not find home directory".to_string())
        })?;
        Ok(home.join(".gromit"))
    }

    /// Stores `api_key` for `agent` (a canonical agent name).
    pub fn set_api_key(&mut self, agent: &str, api_key: String) {
        self.api_keys.insert(agent.to_string(), api_key);
    }

    /// Writes a human-readable summary of the configuration at `path`.
    /// Key values are never shown.
    pub fn show_config_info<W: Write>(&self, path: &Path, out: &mut W) -> Result<()> {
        writeln!(out, "Configuration file: {}", path.display())?;
        writeln!(
            out,
            "Status: {}",
            if path.exists() { "Found" } else { "Not found (using defaults)" }
        )?;
        writeln!(out, "Agent: {}", self.agent.as_deref().unwrap_or("(default)"))?;
        writeln!(out, "Model: {}", self.model.as_deref().unwrap_or("(default)"))?;
        for agent in crate::translator::Agent::ALL {
            let state = if self.api_keys.contains_key(agent.name()) { "Set" } else { "Not set" };
            writeln!(out, "API Key ({}): {}", agent, state)?;
        }
        writeln!(out, "Mock mode: {}", self.use_mock)?;

        writeln!(out, "\nTo set an API key:")?;
        writeln!(out, "  gromit --agent <agent> --set-api-key <your-key>")?;
        writeln!(out, "\nOr set the provider's environment variable, e.g.:")?;
        writeln!(out, "  export OPENAI_API_KEY=<your-key>")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();

        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();

        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_loads_all_fields() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
agent = "anthropic"
model = "claude-opus-4-0"
system_prompt = "only zsh"
max_tokens = 200
prompt_prefix = ">>"
ask_for_confirmation = false

[api_keys]
anthropic = "sk-ant"
"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();

        assert_eq!(config.agent.as_deref(), Some("anthropic"));
        assert_eq!(config.model.as_deref(), Some("claude-opus-4-0"));
        assert_eq!(config.system_prompt.as_deref(), Some("only zsh"));
        assert_eq!(config.max_tokens, Some(200));
        assert_eq!(config.prompt_prefix.as_deref(), Some(">>"));
        assert_eq!(config.ask_for_confirmation, Some(false));
        assert!(!config.use_mock);
        assert_eq!(config.api_keys.get("anthropic").map(String::as_str), Some("sk-ant"));
    }

    #[test]
    fn test_malformed_file_is_validation_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "max_tokens = \"lots\"").unwrap();

        let err = Config::load_from(&path).unwrap_err();

        assert!(matches!(err, GromitError::ConfigValidation(_)));
    }

    #[test]
    fn test_save_then_load_keeps_api_key() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = Config::default();
        config.set_api_key("gemini", "g-key".to_string());

        config.save_to(&path).unwrap();
        let loaded = Config::load_from(&path).unwrap();

        assert_eq!(loaded.api_keys.get("gemini").map(String::as_str), Some("g-key"));
    }

    #[test]
    fn test_show_config_info_hides_key_values() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let mut config = Config::default();
        config.set_api_key("openai", "sk-secret".to_string());
        let mut out = Vec::new();

        config.show_config_info(&path, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("API Key (openai): Set"));
        assert!(text.contains("API Key (anthropic): Not set"));
        assert!(!text.contains("sk-secret"));
    }
}
