use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Result, anyhow};

use crate::provider::Provider;

/// Whether requests are answered locally or by the language model
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Mock,
    Live,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Config {
    pub provider: Option<String>,
    pub model: Option<String>,
    #[serde(default)]
    pub mode: Mode,
    pub openai_api_key: Option<String>,
    pub openai_base_url: Option<String>,
    pub claude_api_key: Option<String>,
    pub ollama_url: Option<String>,
}

impl Config {
    pub fn new() -> Self {
        Self {
            provider: Some("openai".to_string()),
            ..Self::default()
        }
    }

    /// Load the user config, then let environment keys take precedence
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::get_config_path()?)?;
        config.apply_env();
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_content)
            .map_err(|e| anyhow!("Invalid config file {:?}: {}", path, e))?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(path, config_content)?;
        Ok(())
    }

    fn apply_env(&mut self) {
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            self.openai_api_key = Some(key);
        }
        if let Ok(key) = std::env::var("ANTHROPIC_API_KEY") {
            self.claude_api_key = Some(key);
        }
    }

    pub fn provider(&self) -> Result<Provider> {
        match self.provider.as_deref() {
            None => Ok(Provider::OpenAI),
            Some(name) => Provider::from_str(name)
                .ok_or_else(|| anyhow!("Unknown provider '{}'", name)),
        }
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("copyedit").join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config.mode, Mode::Mock);
        assert_eq!(config.provider().unwrap(), Provider::OpenAI);
        assert!(config.openai_api_key.is_none());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = Config::new();
        config.provider = Some("ollama".to_string());
        config.mode = Mode::Live;
        config.model = Some("qwen2.5:7b".to_string());
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.mode, Mode::Live);
        assert_eq!(loaded.provider().unwrap(), Provider::Ollama);
        assert_eq!(loaded.model.as_deref(), Some("qwen2.5:7b"));
    }

    #[test]
    fn test_mode_defaults_when_absent_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"provider": "claude"}"#).unwrap();
        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.mode, Mode::Mock);
        assert_eq!(loaded.provider().unwrap(), Provider::Claude);
    }

    #[test]
    fn test_unknown_provider_is_error() {
        let mut config = Config::new();
        config.provider = Some("gemini".to_string());
        assert!(config.provider().is_err());
    }
}
