//! Editor session: the caller that owns document content and chat history
//!
//! Every mutation is a whole-value replacement, so concurrent chat turns and
//! toolbar actions simply race and the last write wins.

use std::ops::Range;

use anyhow::anyhow;
use tracing::{info, warn};

use crate::actions::TextAction;
use crate::assistant::Assistant;
use crate::error::{ServiceError, ServiceResult};
use crate::protocol::{parse_response, ParsedResponse};
use crate::state::ChatMessage;

pub const DEFAULT_DOCUMENT: &str = "// Welcome to the Collaborative Editor!
// You can type or paste code here.
// Select text to see the floating toolbar with AI actions.
// Use the chat on the right to ask for help or request edits.

function greet(name) {
  return `Hello, ${name}!`;
}

console.log(greet('World'));
";

pub const GREETING: &str = "Hi! I'm your AI assistant. I can help with your code or text. You can also select text in the editor to use the floating toolbar for quick actions.";

pub const FALLBACK_REPLY: &str = "Sorry, I encountered an error processing your request.";

/// What a chat turn did to the session
#[derive(Debug)]
pub enum ChatOutcome {
    /// Plain reply appended to the chat
    Replied,
    /// Directive parsed; `applied` is false when the replacement was empty
    Edited { applied: bool },
    /// The assistant failed; the fallback reply was appended
    Failed(ServiceError),
}

#[derive(Debug, Clone)]
pub struct EditorSession {
    content: String,
    messages: Vec<ChatMessage>,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(DEFAULT_DOCUMENT)
    }
}

impl EditorSession {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            messages: vec![ChatMessage::assistant(GREETING)],
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Run one chat turn: ask with the full history, then apply the reply.
    pub async fn send_message(&mut self, assistant: &dyn Assistant, text: &str) -> ChatOutcome {
        let mut history = self.messages.clone();
        history.push(ChatMessage::user(text));

        let reply = assistant.chat(&history).await.and_then(|raw| {
            if raw.trim().is_empty() {
                Err(ServiceError::Upstream(anyhow!("Invalid response format from model: empty reply")))
            } else {
                Ok(raw)
            }
        });
        let raw = match reply {
            Ok(raw) => raw,
            Err(err) => {
                warn!("Chat turn failed: {}", err);
                history.push(ChatMessage::assistant(FALLBACK_REPLY));
                self.messages = history;
                return ChatOutcome::Failed(err);
            }
        };

        let parsed = parse_response(&raw);
        let outcome = match &parsed {
            ParsedResponse::Conversation(_) => ChatOutcome::Replied,
            ParsedResponse::Edit(directive) => {
                let applied = directive.has_replacement();
                if applied {
                    info!(chars = directive.replacement.chars().count(), "Assistant replaced document");
                    self.content = directive.replacement.clone();
                }
                ChatOutcome::Edited { applied }
            }
        };

        history.push(ChatMessage::assistant(parsed.chat_text()));
        self.messages = history;
        outcome
    }

    /// Transform the selected characters and splice the result back in.
    ///
    /// `selection` is a range of char indices into the current content.
    /// Returns the replacement text; an empty result leaves the document alone.
    pub async fn apply_action(
        &mut self,
        assistant: &dyn Assistant,
        action: TextAction,
        selection: Range<usize>,
    ) -> ServiceResult<String> {
        let (start, end) = self.byte_range(&selection)?;
        let selected = self.content[start..end].to_string();
        if selected.is_empty() {
            return Err(ServiceError::InvalidRequest("No text selected".to_string()));
        }

        let result = assistant.transform(action, &selected).await?;
        if !result.is_empty() {
            let mut content = String::with_capacity(self.content.len() + result.len());
            content.push_str(&self.content[..start]);
            content.push_str(&result);
            content.push_str(&self.content[end..]);
            self.content = content;
            info!(%action, "Applied text action");
        }
        Ok(result)
    }

    fn byte_range(&self, selection: &Range<usize>) -> ServiceResult<(usize, usize)> {
        let char_count = self.content.chars().count();
        if selection.start > selection.end || selection.end > char_count {
            return Err(ServiceError::InvalidRequest(format!(
                "Selection {}..{} is outside the document ({} chars)",
                selection.start, selection.end, char_count
            )));
        }
        Ok((
            char_to_byte_index(&self.content, selection.start),
            char_to_byte_index(&self.content, selection.end),
        ))
    }
}

fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistant::test_support::StubModel;
    use crate::assistant::{LiveAssistant, MockAssistant, MOCK_EDITED_DOCUMENT};
    use crate::state::ChatRole;

    #[tokio::test]
    async fn test_new_session_has_greeting() {
        let session = EditorSession::default();
        assert_eq!(session.content(), DEFAULT_DOCUMENT);
        assert_eq!(session.messages(), &[ChatMessage::assistant(GREETING)]);
    }

    #[tokio::test]
    async fn test_conversational_turn_keeps_document() {
        let mut session = EditorSession::new("doc");
        let outcome = session.send_message(&MockAssistant, "hello there").await;

        assert!(matches!(outcome, ChatOutcome::Replied));
        assert_eq!(session.content(), "doc");
        let messages = session.messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1], ChatMessage::user("hello there"));
        assert!(messages[2].content.contains("You said: \"hello there\""));
    }

    #[tokio::test]
    async fn test_edit_turn_replaces_document_and_shows_instruction() {
        let mut session = EditorSession::new("old");
        let outcome = session.send_message(&MockAssistant, "please fix this").await;

        assert!(matches!(outcome, ChatOutcome::Edited { applied: true }));
        assert_eq!(session.content(), MOCK_EDITED_DOCUMENT);
        let last = session.messages().last().unwrap();
        assert_eq!(last.role, ChatRole::Assistant);
        assert_eq!(last.content, "I've made the changes you requested.");
    }

    #[tokio::test]
    async fn test_empty_replacement_does_not_mutate() {
        let model = StubModel::replying("[EDIT] I could not decide what to change.");
        let assistant = LiveAssistant::new(&model);
        let mut session = EditorSession::new("untouched");

        let outcome = session.send_message(&assistant, "edit it").await;
        assert!(matches!(outcome, ChatOutcome::Edited { applied: false }));
        assert_eq!(session.content(), "untouched");
        assert_eq!(
            session.messages().last().unwrap().content,
            "I could not decide what to change."
        );
    }

    #[tokio::test]
    async fn test_history_is_sent_in_order() {
        let model = StubModel::replying("ok");
        let assistant = LiveAssistant::new(&model);
        let mut session = EditorSession::new("");

        session.send_message(&assistant, "one").await;
        session.send_message(&assistant, "two").await;

        let sent = model.last_call();
        let contents: Vec<&str> = sent.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents[1..], [GREETING, "one", "ok", "two"]);
    }

    #[tokio::test]
    async fn test_failure_appends_fallback_and_keeps_history() {
        let model = StubModel::failing();
        let assistant = LiveAssistant::new(&model);
        let mut session = EditorSession::new("doc");

        let outcome = session.send_message(&assistant, "hi").await;
        assert!(matches!(outcome, ChatOutcome::Failed(ref e) if e.status() == 500));
        assert_eq!(
            session.messages(),
            &[
                ChatMessage::assistant(GREETING),
                ChatMessage::user("hi"),
                ChatMessage::assistant(FALLBACK_REPLY),
            ]
        );
        assert_eq!(session.content(), "doc");
    }

    #[tokio::test]
    async fn test_empty_reply_is_a_failed_turn() {
        let model = StubModel::replying("  ");
        let assistant = LiveAssistant::new(&model);
        let mut session = EditorSession::new("doc");

        let outcome = session.send_message(&assistant, "hi").await;
        assert!(matches!(outcome, ChatOutcome::Failed(ref e) if e.status() == 500));
        assert_eq!(
            session.messages().last(),
            Some(&ChatMessage::assistant(FALLBACK_REPLY))
        );
        assert_eq!(session.messages().len(), 3);
        assert_eq!(session.content(), "doc");
    }

    #[tokio::test]
    async fn test_action_replaces_selection_only() {
        let mut session = EditorSession::new("Intro: i am here..  ok. Tail");
        let result = session
            .apply_action(&MockAssistant, TextAction::FixGrammar, 7..23)
            .await
            .unwrap();

        assert_eq!(result, "I am here. ok.");
        assert_eq!(session.content(), "Intro: I am here. ok. Tail");
    }

    #[tokio::test]
    async fn test_action_selection_uses_char_indices() {
        let mut session = EditorSession::new("héllo wörld");
        session
            .apply_action(&MockAssistant, TextAction::Table, 6..11)
            .await
            .unwrap();
        assert!(session.content().starts_with("héllo | Column 1"));
    }

    #[tokio::test]
    async fn test_action_rejects_bad_selection() {
        let mut session = EditorSession::new("short");
        let err = session
            .apply_action(&MockAssistant, TextAction::Shorten, 2..99)
            .await
            .unwrap_err();
        assert_eq!(err.status(), 400);

        let err = session
            .apply_action(&MockAssistant, TextAction::Shorten, 3..3)
            .await
            .unwrap_err();
        assert_eq!(err.status(), 400);
        assert_eq!(session.content(), "short");
    }
}
