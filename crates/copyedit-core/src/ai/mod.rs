pub mod claude;
pub mod ollama;
pub mod openai;

pub use claude::ClaudeClient;
pub use ollama::OllamaClient;
pub use openai::OpenAIClient;

use anyhow::Result;
use async_trait::async_trait;

use crate::state::ChatMessage;

/// A chat-completion backend.
///
/// Handlers receive a borrowed instance per request, so tests can swap in a
/// local stub and nothing holds a process-wide client.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Send the full conversation and return the reply text.
    ///
    /// A reply with no content comes back as an empty string, not an error.
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String>;

    /// Model identifier used for logging
    fn name(&self) -> &str;
}
