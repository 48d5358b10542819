pub mod actions;
pub mod ai;
pub mod api;
pub mod assistant;
pub mod config;
pub mod error;
pub mod protocol;
pub mod provider;
pub mod session;
pub mod state;

// Re-export main types for convenience
pub use actions::TextAction;
pub use ai::{ClaudeClient, LanguageModel, OllamaClient, OpenAIClient};
pub use api::{Endpoint, Reply};
pub use assistant::{Assistant, LiveAssistant, MockAssistant};
pub use config::{Config, Mode};
pub use error::{ServiceError, ServiceResult};
pub use protocol::{parse_response, EditDirective, ParsedResponse};
pub use provider::Provider;
pub use session::{ChatOutcome, EditorSession};
pub use state::{ChatMessage, ChatRole};
