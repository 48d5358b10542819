use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::LanguageModel;
use crate::state::{ChatMessage, ChatRole};

pub const DEFAULT_CLAUDE_MODEL: &str = "claude-3-5-haiku-20241022";

#[derive(Serialize)]
struct ClaudeMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ClaudeRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<ClaudeMessage<'a>>,
}

#[derive(Deserialize)]
struct ClaudeContent {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct ClaudeResponse {
    #[serde(default)]
    content: Vec<ClaudeContent>,
}

#[derive(Clone)]
pub struct ClaudeClient {
    client: Client,
    api_key: String,
    model: String,
}

impl ClaudeClient {
    pub fn new(api_key: &str, model: &str) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }

    pub fn list_models() -> Vec<String> {
        vec![
            "claude-sonnet-4-20250514".to_string(),
            "claude-3-5-sonnet-20241022".to_string(),
            "claude-3-5-haiku-20241022".to_string(),
            "claude-3-opus-20240229".to_string(),
        ]
    }
}

// The messages API takes system text as a top-level field, not as a turn.
fn build_request<'a>(model: &'a str, messages: &'a [ChatMessage]) -> ClaudeRequest<'a> {
    let system: Vec<&str> = messages
        .iter()
        .filter(|m| m.role == ChatRole::System)
        .map(|m| m.content.as_str())
        .collect();

    ClaudeRequest {
        model,
        max_tokens: 4096,
        system: (!system.is_empty()).then(|| system.join("\n\n")),
        messages: messages
            .iter()
            .filter(|m| m.role != ChatRole::System)
            .map(|m| ClaudeMessage {
                role: m.role.as_str(),
                content: &m.content,
            })
            .collect(),
    }
}

#[async_trait]
impl LanguageModel for ClaudeClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let request = build_request(&self.model, messages);

        let response = self.client
            .post("https://api.anthropic.com/v1/messages")
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(anyhow!("Claude API error {}: {}", status, text));
        }

        let claude_response: ClaudeResponse = response.json().await?;
        Ok(claude_response.content.first()
            .map(|c| c.text.clone())
            .unwrap_or_default())
    }

    fn name(&self) -> &str {
        &self.model
    }
}
