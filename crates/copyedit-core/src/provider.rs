use crate::ai::{claude, ollama, openai, ClaudeClient, LanguageModel, OllamaClient, OpenAIClient};
use crate::config::Config;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenAI,
    Claude,
    Ollama,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::OpenAI => "openai",
            Provider::Claude => "claude",
            Provider::Ollama => "ollama",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "openai" => Some(Provider::OpenAI),
            "claude" => Some(Provider::Claude),
            "ollama" => Some(Provider::Ollama),
            _ => None,
        }
    }

    pub fn all() -> Vec<Provider> {
        vec![Provider::OpenAI, Provider::Claude, Provider::Ollama]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Provider::OpenAI => "ChatGPT (OpenAI)",
            Provider::Claude => "Claude (Anthropic)",
            Provider::Ollama => "Ollama (Local)",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::OpenAI => openai::DEFAULT_OPENAI_MODEL,
            Provider::Claude => claude::DEFAULT_CLAUDE_MODEL,
            Provider::Ollama => ollama::DEFAULT_OLLAMA_MODEL,
        }
    }

    /// Construct a client for this provider.
    ///
    /// Returns `None` when the provider needs an API key and none is set.
    pub fn build_client(&self, config: &Config) -> Option<Box<dyn LanguageModel>> {
        let model = config.model.as_deref().unwrap_or(self.default_model());
        match self {
            Provider::OpenAI => config.openai_api_key.as_deref().map(|key| {
                let base_url = config.openai_base_url.as_deref().unwrap_or(openai::DEFAULT_OPENAI_URL);
                Box::new(OpenAIClient::with_base_url(key, model, base_url)) as Box<dyn LanguageModel>
            }),
            Provider::Claude => config
                .claude_api_key
                .as_deref()
                .map(|key| Box::new(ClaudeClient::new(key, model)) as Box<dyn LanguageModel>),
            Provider::Ollama => {
                let url = config.ollama_url.as_deref().unwrap_or(ollama::DEFAULT_OLLAMA_URL);
                Some(Box::new(OllamaClient::new(url, model)))
            }
        }
    }
}
