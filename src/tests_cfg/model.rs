use std::{collections::VecDeque, sync::Mutex};

use async_trait::async_trait;
use serde_json::json;

use crate::ai::{
    ChatModel, Completion, CompletionRequest, KnowledgeAssistantError, ToolCallRequest,
};

/// [`ChatModel`] replaying a fixed list of completions.
///
/// Once the script runs out every call fails with a provider error.
pub struct ScriptedModel {
    script: Mutex<VecDeque<Completion>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedModel {
    #[must_use]
    pub fn new(script: Vec<Completion>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            requests: Mutex::default(),
        }
    }

    /// Requests received so far, in order.
    ///
    /// # Panics
    /// Panics when the record lock is poisoned.
    #[must_use]
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    fn model(&self) -> &str {
        "scripted"
    }

    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<Completion, KnowledgeAssistantError> {
        self.requests.lock().unwrap().push(request);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| KnowledgeAssistantError::Provider("script exhausted".to_string()))
    }
}

/// A call to `name` carrying `query` as its `sparql_query` argument.
#[must_use]
pub fn tool_call(id: &str, name: &str, query: &str) -> ToolCallRequest {
    ToolCallRequest {
        id: id.to_string(),
        name: name.to_string(),
        arguments: json!({ "sparql_query": query }).to_string(),
    }
}
