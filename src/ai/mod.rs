use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{AiSettings, KnowledgeAssistantBackend};

pub mod agent;
pub mod infrastructure;
pub mod prompt;
pub mod templates;
pub mod tools;

pub use agent::{AgentReply, ExecutedToolCall, KnowledgeAgent, KnowledgeAgentError};
pub use tools::{QueryTool, ToolFailure, ToolOutput, QUERY_TOOL_NAME};

/// Role of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversationRole {
    User,
    Assistant,
}

/// Represents a single entry in a conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: ConversationRole,
    pub content: String,
}

impl ConversationTurn {
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ConversationRole::User,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ConversationRole::Assistant,
            content: content.into(),
        }
    }
}

/// A function call requested by the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    /// Provider issued identifier, echoed back with the tool result.
    pub id: String,
    pub name: String,
    /// Raw JSON arguments as produced by the model.
    pub arguments: String,
}

/// Function declaration offered to the model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON schema of the arguments object.
    pub parameters: serde_json::Value,
}

/// Message exchanged with a chat model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatMessage {
    System(String),
    User(String),
    Assistant {
        content: Option<String>,
        tool_calls: Vec<ToolCallRequest>,
    },
    Tool {
        call_id: String,
        content: String,
    },
}

impl From<&ConversationTurn> for ChatMessage {
    fn from(turn: &ConversationTurn) -> Self {
        match turn.role {
            ConversationRole::User => Self::User(turn.content.clone()),
            ConversationRole::Assistant => Self::Assistant {
                content: Some(turn.content.clone()),
                tool_calls: Vec::new(),
            },
        }
    }
}

/// Request issued to a [`ChatModel`] implementation.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,
    pub tools: Vec<ToolDefinition>,
}

/// What the model decided to do with a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// Final answer for the user.
    Reply(String),
    /// The model wants tools to run before answering.
    ToolCalls {
        content: Option<String>,
        calls: Vec<ToolCallRequest>,
    },
}

/// Contract implemented by hosted chat models supporting function calls.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Identifier of the underlying model.
    fn model(&self) -> &str;

    /// Produces the next assistant step for the supplied conversation.
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<Completion, KnowledgeAssistantError>;
}

/// Factory error raised when building assistant adapters from configuration.
#[derive(Debug, Error)]
pub enum KnowledgeAssistantInitError {
    /// Configuration referenced no backend.
    #[error("knowledge assistant backend is not configured")]
    MissingBackend,
    /// Provided configuration was invalid.
    #[error("invalid knowledge assistant configuration: {0}")]
    InvalidConfiguration(String),
    /// Adapter construction failed.
    #[error("failed to construct assistant adapter: {0}")]
    Adapter(String),
}

/// Errors surfaced by assistant adapters.
#[derive(Debug, Error)]
pub enum KnowledgeAssistantError {
    /// Building the provider request failed.
    #[error("failed to compose provider request: {0}")]
    Request(String),
    /// Provider returned neither text nor tool calls.
    #[error("provider returned an unexpected response")]
    EmptyResponse,
    /// Provider interaction failed.
    #[error("provider error: {0}")]
    Provider(String),
}

/// Builds a chat model adapter from configuration.
///
/// Returns `Ok(None)` when no assistant is configured.
pub fn build_assistant(
    settings: &AiSettings,
) -> Result<Option<Arc<dyn ChatModel>>, KnowledgeAssistantInitError> {
    let Some(backend) = settings.assistant.as_ref() else {
        return Ok(None);
    };

    match backend {
        KnowledgeAssistantBackend::OpenAi(cfg) => {
            let adapter = infrastructure::openai::OpenAiChatModel::try_new(cfg)?;
            Ok(Some(Arc::new(adapter)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OpenAiSettings;

    #[test]
    fn turns_become_chat_messages() {
        assert_eq!(
            ChatMessage::from(&ConversationTurn::user("How many jaguars?")),
            ChatMessage::User("How many jaguars?".to_string())
        );
        assert_eq!(
            ChatMessage::from(&ConversationTurn::assistant("Two.")),
            ChatMessage::Assistant {
                content: Some("Two.".to_string()),
                tool_calls: vec![],
            }
        );
    }

    #[test]
    fn unconfigured_assistant_builds_nothing() {
        let built = build_assistant(&AiSettings::default()).expect("no error");
        assert!(built.is_none());
    }

    #[test]
    fn missing_api_key_is_rejected() {
        let settings = AiSettings {
            assistant: Some(KnowledgeAssistantBackend::OpenAi(OpenAiSettings {
                api_key: "  ".to_string(),
                model: "gpt-4o".to_string(),
                api_base: None,
                temperature: None,
                max_tokens: None,
            })),
            ..AiSettings::default()
        };
        let err = build_assistant(&settings).err().expect("invalid configuration");
        assert!(matches!(
            err,
            KnowledgeAssistantInitError::InvalidConfiguration(_)
        ));
    }

    #[test]
    fn configured_assistant_reports_its_model() {
        let settings = AiSettings {
            assistant: Some(KnowledgeAssistantBackend::OpenAi(OpenAiSettings {
                api_key: "sk-test".to_string(),
                model: "gpt-4o".to_string(),
                api_base: Some("http://127.0.0.1:9/v1".to_string()),
                temperature: Some(0.0),
                max_tokens: None,
            })),
            ..AiSettings::default()
        };
        let model = build_assistant(&settings)
            .expect("valid configuration")
            .expect("assistant");
        assert_eq!(model.model(), "gpt-4o");
    }
}
