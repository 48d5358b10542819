//! Chat and text-action responders
//!
//! `MockAssistant` answers deterministically for offline work. `LiveAssistant`
//! forwards to a borrowed `LanguageModel` for the lifetime of one request.

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::actions::{TextAction, TEXT_EDITING_SYSTEM_PROMPT};
use crate::ai::LanguageModel;
use crate::error::ServiceResult;
use crate::protocol::EDITOR_SYSTEM_PROMPT;
use crate::state::{last_user_message, ChatMessage};

/// Document returned by the mock assistant when asked to edit
pub const MOCK_EDITED_DOCUMENT: &str = "// Modified code based on your request
function improvedGreet(name) {
  // Added validation
  if (!name) name = 'World';
  return `Hello, ${name}!`;
}

console.log(improvedGreet('User'));";

const MOCK_EDIT_KEYWORDS: [&str; 3] = ["edit", "fix", "change"];

#[async_trait]
pub trait Assistant: Send + Sync {
    /// Raw reply to the conversation; may contain an edit directive
    async fn chat(&self, messages: &[ChatMessage]) -> ServiceResult<String>;

    /// Transformed replacement for `text`
    async fn transform(&self, action: TextAction, text: &str) -> ServiceResult<String>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MockAssistant;

impl MockAssistant {
    pub fn reply_to(messages: &[ChatMessage]) -> String {
        let last = last_user_message(messages).unwrap_or("");
        let lowered = last.to_lowercase();

        if MOCK_EDIT_KEYWORDS.iter().any(|k| lowered.contains(k)) {
            format!(
                "[EDIT] I've made the changes you requested.\n\n[START_EDIT]{}\n[END_EDIT]",
                MOCK_EDITED_DOCUMENT
            )
        } else {
            format!(
                "I'm a mock AI response for testing. You said: \"{}\". How else can I help you with your code today?",
                last
            )
        }
    }
}

#[async_trait]
impl Assistant for MockAssistant {
    async fn chat(&self, messages: &[ChatMessage]) -> ServiceResult<String> {
        Ok(Self::reply_to(messages))
    }

    async fn transform(&self, action: TextAction, text: &str) -> ServiceResult<String> {
        Ok(action.apply_mock(text))
    }
}

pub struct LiveAssistant<'a> {
    model: &'a dyn LanguageModel,
}

impl<'a> LiveAssistant<'a> {
    pub fn new(model: &'a dyn LanguageModel) -> Self {
        Self { model }
    }
}

#[async_trait]
impl Assistant for LiveAssistant<'_> {
    async fn chat(&self, messages: &[ChatMessage]) -> ServiceResult<String> {
        let mut conversation = Vec::with_capacity(messages.len() + 1);
        conversation.push(ChatMessage::system(EDITOR_SYSTEM_PROMPT));
        conversation.extend_from_slice(messages);

        debug!(model = self.model.name(), turns = conversation.len(), "Sending chat request");
        Ok(self.model.complete(&conversation).await?)
    }

    async fn transform(&self, action: TextAction, text: &str) -> ServiceResult<String> {
        let conversation = [
            ChatMessage::system(TEXT_EDITING_SYSTEM_PROMPT),
            ChatMessage::user(action.prompt(text)),
        ];

        debug!(model = self.model.name(), %action, "Sending text action");
        let reply = self.model.complete(&conversation).await?;
        if reply.is_empty() {
            warn!(%action, "Model returned an empty reply, keeping original text");
            return Ok(text.to_string());
        }
        Ok(reply)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Mutex;

    use anyhow::{anyhow, Result};
    use async_trait::async_trait;

    use crate::ai::LanguageModel;
    use crate::state::ChatMessage;

    /// Records every conversation and answers with a canned reply
    pub struct StubModel {
        pub reply: String,
        pub fail: bool,
        pub calls: Mutex<Vec<Vec<ChatMessage>>>,
    }

    impl StubModel {
        pub fn replying(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                fail: false,
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Self::replying("")
            }
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        pub fn last_call(&self) -> Vec<ChatMessage> {
            self.calls.lock().unwrap().last().cloned().unwrap_or_default()
        }
    }

    #[async_trait]
    impl LanguageModel for StubModel {
        async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
            self.calls.lock().unwrap().push(messages.to_vec());
            if self.fail {
                return Err(anyhow!("connection refused"));
            }
            Ok(self.reply.clone())
        }

        fn name(&self) -> &str {
            "stub"
        }
    }
}
