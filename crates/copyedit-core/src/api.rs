//! Transport-agnostic request handlers
//!
//! Each endpoint takes a JSON body and returns a status plus a JSON body,
//! ready to be mounted behind any transport.

use std::str::FromStr;

use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, error};

use crate::actions::TextAction;
use crate::ai::LanguageModel;
use crate::assistant::{Assistant, LiveAssistant, MockAssistant};
use crate::error::{ServiceError, ServiceResult};
use crate::state::ChatMessage;

const INVALID_CHAT_REQUEST: &str = "Invalid request format";
const MISSING_ACTION_FIELDS: &str = "Both action and text are required";
const NOT_CONFIGURED: &str = "API key is not configured";
const CHAT_FAILED: &str = "Failed to get AI response";
const ACTION_FAILED: &str = "Failed to process text action";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Chat,
    ChatMock,
    TextAction,
    TextActionMock,
}

impl Endpoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::Chat => "chat",
            Endpoint::ChatMock => "chat-mock",
            Endpoint::TextAction => "text-action",
            Endpoint::TextActionMock => "text-action-mock",
        }
    }

    pub fn is_mock(&self) -> bool {
        matches!(self, Endpoint::ChatMock | Endpoint::TextActionMock)
    }
}

impl FromStr for Endpoint {
    type Err = ();

    /// Accepts bare names (`chat-mock`) or route paths (`/api/chat-mock`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim_start_matches('/');
        let name = name.strip_prefix("api/").unwrap_or(name);
        match name {
            "chat" => Ok(Endpoint::Chat),
            "chat-mock" => Ok(Endpoint::ChatMock),
            "text-action" => Ok(Endpoint::TextAction),
            "text-action-mock" => Ok(Endpoint::TextActionMock),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reply {
    pub status: u16,
    pub body: Value,
}

impl Reply {
    pub fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }

    pub fn error(status: u16, message: &str) -> Self {
        Self {
            status,
            body: json!({ "error": message }),
        }
    }
}

/// Validated chat request body
pub fn parse_chat_request(body: &Value) -> ServiceResult<Vec<ChatMessage>> {
    let messages = body
        .get("messages")
        .filter(|m| m.is_array())
        .ok_or_else(|| ServiceError::InvalidRequest(INVALID_CHAT_REQUEST.to_string()))?;

    serde_json::from_value(messages.clone())
        .map_err(|_| ServiceError::InvalidRequest(INVALID_CHAT_REQUEST.to_string()))
}

/// Validated text-action request body
pub fn parse_text_action_request(body: &Value) -> ServiceResult<(TextAction, String)> {
    let field = |name: &str| {
        body.get(name)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    };

    let (Some(action), Some(text)) = (field("action"), field("text")) else {
        return Err(ServiceError::InvalidRequest(MISSING_ACTION_FIELDS.to_string()));
    };

    Ok((action.parse()?, text.to_string()))
}

/// Dispatch one request. Live endpoints need `model`; mock ones ignore it.
pub async fn handle(endpoint: Endpoint, body: &Value, model: Option<&dyn LanguageModel>) -> Reply {
    debug!(endpoint = endpoint.as_str(), "Handling request");

    let live = model.map(LiveAssistant::new);
    let assistant: Option<&dyn Assistant> = if endpoint.is_mock() {
        Some(&MockAssistant)
    } else {
        live.as_ref().map(|a| a as &dyn Assistant)
    };

    let result = match endpoint {
        Endpoint::Chat | Endpoint::ChatMock => chat_content(assistant, body)
            .await
            .map(|content| json!({ "message": ChatMessage::assistant(content) })),
        Endpoint::TextAction | Endpoint::TextActionMock => action_result(assistant, body)
            .await
            .map(|result| json!({ "result": result })),
    };

    match result {
        Ok(body) => Reply::ok(body),
        Err(err) => error_reply(endpoint, err),
    }
}

// Requests are validated before the assistant is required, so a malformed
// body is a 400 even when no model is configured.
async fn chat_content(assistant: Option<&dyn Assistant>, body: &Value) -> ServiceResult<String> {
    let messages = parse_chat_request(body)?;
    require(assistant)?.chat(&messages).await
}

async fn action_result(assistant: Option<&dyn Assistant>, body: &Value) -> ServiceResult<String> {
    let (action, text) = parse_text_action_request(body)?;
    require(assistant)?.transform(action, &text).await
}

fn require(assistant: Option<&dyn Assistant>) -> ServiceResult<&dyn Assistant> {
    assistant.ok_or_else(|| ServiceError::NotConfigured(NOT_CONFIGURED.to_string()))
}

fn error_reply(endpoint: Endpoint, err: ServiceError) -> Reply {
    let message = match &err {
        ServiceError::Upstream(cause) => {
            error!(endpoint = endpoint.as_str(), "Upstream request failed: {:#}", cause);
            match endpoint {
                Endpoint::Chat | Endpoint::ChatMock => CHAT_FAILED.to_string(),
                Endpoint::TextAction | Endpoint::TextActionMock => ACTION_FAILED.to_string(),
            }
        }
        _ => {
            debug!(endpoint = endpoint.as_str(), "Rejected request: {}", err);
            err.public_message()
        }
    };
    Reply::error(err.status(), &message)
}
