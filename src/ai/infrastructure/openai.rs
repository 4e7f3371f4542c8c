use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessageArgs,
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestToolMessageArgs, ChatCompletionRequestUserMessageArgs,
        ChatCompletionRequestUserMessageContent, ChatCompletionTool, ChatCompletionToolArgs,
        ChatCompletionToolChoiceOption, ChatCompletionToolType, CreateChatCompletionRequestArgs,
        FunctionCall, FunctionObjectArgs,
    },
    Client,
};
use async_trait::async_trait;

use crate::{
    ai::{
        ChatMessage, ChatModel, Completion, CompletionRequest, KnowledgeAssistantError,
        KnowledgeAssistantInitError, ToolCallRequest, ToolDefinition,
    },
    config::OpenAiSettings,
};

/// Chat model backed by OpenAI chat completions with function calling.
pub struct OpenAiChatModel {
    client: Client<OpenAIConfig>,
    model: String,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

impl OpenAiChatModel {
    /// Instantiates a new adapter using the provided configuration.
    pub fn try_new(settings: &OpenAiSettings) -> Result<Self, KnowledgeAssistantInitError> {
        if settings.api_key.trim().is_empty() {
            return Err(KnowledgeAssistantInitError::InvalidConfiguration(
                "`ai.assistant.api_key` must be provided".to_string(),
            ));
        }
        if settings.model.trim().is_empty() {
            return Err(KnowledgeAssistantInitError::InvalidConfiguration(
                "`ai.assistant.model` must be provided".to_string(),
            ));
        }

        let mut config = OpenAIConfig::new().with_api_key(settings.api_key.clone());
        if let Some(base) = &settings.api_base {
            config = config.with_api_base(base.clone());
        }
        let client = Client::with_config(config);

        Ok(Self {
            client,
            model: settings.model.clone(),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
        })
    }
}

fn request_error(err: impl std::fmt::Display) -> KnowledgeAssistantError {
    KnowledgeAssistantError::Request(err.to_string())
}

/// Converts conversation messages into the provider representation.
pub fn build_messages(
    messages: &[ChatMessage],
) -> Result<Vec<ChatCompletionRequestMessage>, KnowledgeAssistantError> {
    messages
        .iter()
        .map(|message| match message {
            ChatMessage::System(content) => ChatCompletionRequestSystemMessageArgs::default()
                .content(content.clone())
                .build()
                .map(ChatCompletionRequestMessage::System)
                .map_err(request_error),
            ChatMessage::User(content) => ChatCompletionRequestUserMessageArgs::default()
                .content(ChatCompletionRequestUserMessageContent::Text(content.clone()))
                .build()
                .map(ChatCompletionRequestMessage::User)
                .map_err(request_error),
            ChatMessage::Assistant {
                content,
                tool_calls,
            } => {
                let mut builder = ChatCompletionRequestAssistantMessageArgs::default();
                if let Some(content) = content {
                    builder.content(content.clone());
                }
                if !tool_calls.is_empty() {
                    builder.tool_calls(
                        tool_calls
                            .iter()
                            .map(|call| ChatCompletionMessageToolCall {
                                id: call.id.clone(),
                                r#type: ChatCompletionToolType::Function,
                                function: FunctionCall {
                                    name: call.name.clone(),
                                    arguments: call.arguments.clone(),
                                },
                            })
                            .collect::<Vec<_>>(),
                    );
                }
                builder
                    .build()
                    .map(ChatCompletionRequestMessage::Assistant)
                    .map_err(request_error)
            }
            ChatMessage::Tool { call_id, content } => {
                ChatCompletionRequestToolMessageArgs::default()
                    .content(content.clone())
                    .tool_call_id(call_id.clone())
                    .build()
                    .map(ChatCompletionRequestMessage::Tool)
                    .map_err(request_error)
            }
        })
        .collect()
}

/// Converts tool declarations into the provider representation.
pub fn build_tools(
    tools: &[ToolDefinition],
) -> Result<Vec<ChatCompletionTool>, KnowledgeAssistantError> {
    tools
        .iter()
        .map(|tool| {
            let function = FunctionObjectArgs::default()
                .name(tool.name.clone())
                .description(tool.description.clone())
                .parameters(tool.parameters.clone())
                .build()
                .map_err(request_error)?;
            ChatCompletionToolArgs::default()
                .r#type(ChatCompletionToolType::Function)
                .function(function)
                .build()
                .map_err(request_error)
        })
        .collect()
}

#[async_trait]
impl ChatModel for OpenAiChatModel {
    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<Completion, KnowledgeAssistantError> {
        let mut builder = CreateChatCompletionRequestArgs::default();
        builder.model(self.model.clone());
        builder.messages(build_messages(&request.messages)?);
        if !request.tools.is_empty() {
            builder.tools(build_tools(&request.tools)?);
            builder.tool_choice(ChatCompletionToolChoiceOption::Auto);
        }
        if let Some(max_tokens) = self.max_tokens {
            builder.max_tokens(max_tokens);
        }
        if let Some(temperature) = self.temperature {
            builder.temperature(temperature);
        }
        let payload = builder.build().map_err(request_error)?;

        let response = self
            .client
            .chat()
            .create(payload)
            .await
            .map_err(|err| KnowledgeAssistantError::Provider(err.to_string()))?;

        let message = response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or(KnowledgeAssistantError::EmptyResponse)?;

        let calls: Vec<ToolCallRequest> = message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|call| ToolCallRequest {
                id: call.id,
                name: call.function.name,
                arguments: call.function.arguments,
            })
            .collect();

        if !calls.is_empty() {
            tracing::debug!(model = %self.model, calls = calls.len(), "openai_tool_calls_requested");
            return Ok(Completion::ToolCalls {
                content: message.content,
                calls,
            });
        }
        message
            .content
            .map(Completion::Reply)
            .ok_or(KnowledgeAssistantError::EmptyResponse)
    }
}
