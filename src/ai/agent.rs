//! Tool-calling conversation loop.

use std::{sync::Arc, time::Instant};

use serde::Serialize;
use thiserror::Error;

use super::{
    tools::{ToolFailure, ToolOutput},
    ChatMessage, ChatModel, Completion, CompletionRequest, ConversationTurn,
    KnowledgeAssistantError, QueryTool, ToolCallRequest, QUERY_TOOL_NAME,
};

/// Default number of tool rounds allowed per user message.
pub const DEFAULT_MAX_TOOL_ROUNDS: usize = 5;

/// Record of a tool call executed while answering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutedToolCall {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub duration_ms: u64,
}

/// Final answer of a turn together with the tool activity behind it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentReply {
    pub reply: String,
    pub tool_calls: Vec<ExecutedToolCall>,
}

#[derive(Debug, Error)]
pub enum KnowledgeAgentError {
    #[error(transparent)]
    Model(#[from] KnowledgeAssistantError),
    #[error("the model kept requesting tools after {limit} rounds")]
    ToolRoundsExceeded { limit: usize },
}

/// Agent answering questions with the query tool as its only capability.
pub struct KnowledgeAgent {
    name: String,
    instructions: String,
    model: Arc<dyn ChatModel>,
    tool: QueryTool,
    max_tool_rounds: usize,
}

impl KnowledgeAgent {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        instructions: impl Into<String>,
        model: Arc<dyn ChatModel>,
        tool: QueryTool,
    ) -> Self {
        Self {
            name: name.into(),
            instructions: instructions.into(),
            model,
            tool,
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
        }
    }

    #[must_use]
    pub fn with_max_tool_rounds(mut self, rounds: usize) -> Self {
        self.max_tool_rounds = rounds;
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn model(&self) -> &str {
        self.model.model()
    }

    #[must_use]
    pub fn tool(&self) -> &QueryTool {
        &self.tool
    }

    #[must_use]
    pub fn max_tool_rounds(&self) -> usize {
        self.max_tool_rounds
    }

    /// Answers `message` in the context of `history`.
    ///
    /// Tool calls requested by the model run one at a time, in the order the
    /// model listed them, and their outputs are fed back before the model is
    /// asked again.
    pub async fn respond(
        &self,
        history: &[ConversationTurn],
        message: &str,
    ) -> Result<AgentReply, KnowledgeAgentError> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage::System(self.instructions.clone()));
        messages.extend(history.iter().map(ChatMessage::from));
        messages.push(ChatMessage::User(message.to_string()));

        let tools = vec![self.tool.definition()];
        let mut executed = Vec::new();
        let mut rounds = 0;

        loop {
            let completion = self
                .model
                .complete(CompletionRequest {
                    messages: messages.clone(),
                    tools: tools.clone(),
                })
                .await?;

            let (content, calls) = match completion {
                Completion::Reply(reply) => {
                    tracing::info!(
                        agent = %self.name,
                        rounds,
                        tool_calls = executed.len(),
                        "agent_reply_ready"
                    );
                    return Ok(AgentReply {
                        reply,
                        tool_calls: executed,
                    });
                }
                Completion::ToolCalls { content, calls } => (content, calls),
            };

            if rounds == self.max_tool_rounds {
                tracing::warn!(agent = %self.name, limit = rounds, "agent_tool_rounds_exceeded");
                return Err(KnowledgeAgentError::ToolRoundsExceeded {
                    limit: self.max_tool_rounds,
                });
            }
            rounds += 1;

            messages.push(ChatMessage::Assistant {
                content,
                tool_calls: calls.clone(),
            });
            for call in calls {
                let (record, output) = self.execute(&call).await;
                messages.push(ChatMessage::Tool {
                    call_id: call.id,
                    content: output.to_text(),
                });
                executed.push(record);
            }
        }
    }

    async fn execute(&self, call: &ToolCallRequest) -> (ExecutedToolCall, ToolOutput) {
        let started = Instant::now();
        let (query, output) = if call.name == QUERY_TOOL_NAME {
            self.tool.invoke(&call.arguments).await
        } else {
            tracing::warn!(tool = %call.name, "agent_unknown_tool_requested");
            (
                None,
                ToolOutput::Failure(ToolFailure::new(
                    "unknown_tool",
                    format!("no tool named `{}`; use `{QUERY_TOOL_NAME}`", call.name),
                    None,
                )),
            )
        };

        let record = ExecutedToolCall {
            id: call.id.clone(),
            name: call.name.clone(),
            query,
            ok: output.is_success(),
            error: output.error_kind().map(ToString::to_string),
            duration_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        };
        (record, output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ontology::jaguar_ontology,
        store::{QueryResults, StoreError},
        tests_cfg::{
            model::{tool_call, ScriptedModel},
            store::StubStore,
        },
    };

    fn agent(model: Arc<ScriptedModel>, store: StubStore) -> KnowledgeAgent {
        let tool = QueryTool::new(Arc::new(store), &jaguar_ontology().unwrap()).unwrap();
        KnowledgeAgent::new("JaguarQueryAgent", "be helpful", model, tool)
    }

    #[tokio::test]
    async fn plain_answers_skip_the_tool() {
        let model = Arc::new(ScriptedModel::new(vec![Completion::Reply("Hello!".into())]));
        let store = StubStore::default();
        let reply = agent(model.clone(), store.clone())
            .respond(&[], "hi")
            .await
            .unwrap();
        assert_eq!(reply.reply, "Hello!");
        assert!(reply.tool_calls.is_empty());
        assert!(store.queries().is_empty());

        let requests = model.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0].messages,
            vec![
                ChatMessage::System("be helpful".to_string()),
                ChatMessage::User("hi".to_string()),
            ]
        );
        assert_eq!(requests[0].tools[0].name, QUERY_TOOL_NAME);
    }

    #[tokio::test]
    async fn tool_calls_run_in_order_and_feed_back() {
        let model = Arc::new(ScriptedModel::new(vec![
            Completion::ToolCalls {
                content: None,
                calls: vec![
                    tool_call("call_1", QUERY_TOOL_NAME, "SELECT ?a WHERE { ?a ?b ?c }"),
                    tool_call("call_2", QUERY_TOOL_NAME, "ASK { ?a ?b ?c }"),
                ],
            },
            Completion::Reply("There are **2** jaguars.".into()),
        ]));
        let store = StubStore::with_results(QueryResults::ask(true));
        let history = [
            ConversationTurn::user("earlier question"),
            ConversationTurn::assistant("earlier answer"),
        ];
        let reply = agent(model.clone(), store.clone())
            .respond(&history, "How many jaguars?")
            .await
            .unwrap();

        assert_eq!(reply.reply, "There are **2** jaguars.");
        assert_eq!(
            store.queries(),
            vec![
                "SELECT ?a WHERE { ?a ?b ?c }".to_string(),
                "ASK { ?a ?b ?c }".to_string()
            ]
        );
        assert_eq!(reply.tool_calls.len(), 2);
        assert!(reply.tool_calls.iter().all(|call| call.ok));

        let second = &model.requests()[1].messages;
        assert_eq!(second.len(), 7);
        assert!(matches!(&second[4], ChatMessage::Assistant { tool_calls, .. } if tool_calls.len() == 2));
        assert_eq!(
            second[5],
            ChatMessage::Tool {
                call_id: "call_1".to_string(),
                content: r#"{"head":{"vars":[]},"boolean":true}"#.to_string(),
            }
        );
    }

    #[tokio::test]
    async fn failures_are_reported_to_the_model() {
        let model = Arc::new(ScriptedModel::new(vec![
            Completion::ToolCalls {
                content: None,
                calls: vec![
                    tool_call("call_1", QUERY_TOOL_NAME, "SELEC"),
                    ToolCallRequest {
                        id: "call_2".to_string(),
                        name: "delete_everything".to_string(),
                        arguments: "{}".to_string(),
                    },
                ],
            },
            Completion::Reply("The query failed.".into()),
        ]));
        let store = StubStore::with_error(StoreError::Syntax {
            message: "bad".to_string(),
        });
        let reply = agent(model.clone(), store).respond(&[], "q").await.unwrap();

        let errors: Vec<_> = reply
            .tool_calls
            .iter()
            .map(|call| call.error.as_deref())
            .collect();
        assert_eq!(errors, vec![Some("syntax"), Some("unknown_tool")]);

        let messages = &model.requests()[1].messages;
        let ChatMessage::Tool { content, .. } = &messages[3] else {
            panic!("expected tool message");
        };
        let payload: serde_json::Value = serde_json::from_str(content).unwrap();
        assert_eq!(payload["error"], "syntax");
        assert_eq!(payload["query"], "SELEC");
    }

    #[tokio::test]
    async fn runaway_tool_loops_fail_the_turn() {
        let calls = (0..3)
            .map(|i| Completion::ToolCalls {
                content: None,
                calls: vec![tool_call(&format!("call_{i}"), QUERY_TOOL_NAME, "ASK {}")],
            })
            .collect();
        let model = Arc::new(ScriptedModel::new(calls));
        let err = agent(model, StubStore::with_results(QueryResults::ask(true)))
            .with_max_tool_rounds(2)
            .respond(&[], "loop")
            .await
            .unwrap_err();
        assert!(matches!(err, KnowledgeAgentError::ToolRoundsExceeded { limit: 2 }));
    }

    #[tokio::test]
    async fn model_errors_are_fatal() {
        let model = Arc::new(ScriptedModel::new(vec![]));
        let err = agent(model, StubStore::default())
            .respond(&[], "anything")
            .await
            .unwrap_err();
        assert!(matches!(err, KnowledgeAgentError::Model(_)));
    }
}
