//! Shared application state handed to every controller.

use std::sync::Arc;

use crate::{
    ai::{self, prompt::SYSTEM_PROMPT, KnowledgeAgent, KnowledgeAssistantInitError, QueryTool},
    config::Config,
    environment::Environment,
    ontology::{jaguar_ontology, Ontology},
    store::{GraphStore, HttpSparqlStore},
    threads::{ConversationStore, InMemoryThreadStore},
    Error, Result,
};

/// Everything a request handler may need.
#[derive(Clone)]
pub struct AppContext {
    /// The environment the application runs in.
    pub environment: Environment,
    pub config: Config,
    /// Schema the tool description and templates are derived from.
    pub ontology: Arc<Ontology>,
    pub store: Arc<dyn GraphStore>,
    pub tool: QueryTool,
    pub agent: Arc<KnowledgeAgent>,
    pub threads: Arc<dyn ConversationStore>,
}

impl AppContext {
    /// Wires the store, the query tool, the chat model and the agent from
    /// configuration.
    ///
    /// # Errors
    /// Fails when the store client cannot be built or no usable model is
    /// configured.
    pub fn from_config(environment: Environment, config: Config) -> Result<Self> {
        let store: Arc<dyn GraphStore> = Arc::new(HttpSparqlStore::new(&config.store)?);
        let model = ai::build_assistant(&config.ai)?
            .ok_or(Error::AssistantInit(KnowledgeAssistantInitError::MissingBackend))?;
        Self::assemble(environment, config, store, model)
    }

    /// Builds the context around an already constructed store and model.
    ///
    /// # Errors
    /// Fails when the ontology or the tool description cannot be built.
    pub fn assemble(
        environment: Environment,
        config: Config,
        store: Arc<dyn GraphStore>,
        model: Arc<dyn ai::ChatModel>,
    ) -> Result<Self> {
        let ontology = Arc::new(jaguar_ontology()?);
        let tool = QueryTool::new(store.clone(), &ontology).map_err(Error::wrap)?;
        let settings = &config.ai.agent;
        let instructions = settings
            .instructions
            .clone()
            .unwrap_or_else(|| SYSTEM_PROMPT.to_string());
        let agent = KnowledgeAgent::new(settings.name.clone(), instructions, model, tool.clone())
            .with_max_tool_rounds(settings.max_tool_rounds);

        tracing::info!(
            environment = %environment,
            agent = agent.name(),
            model = agent.model(),
            store = %store.location(),
            "app_context_ready"
        );

        Ok(Self {
            environment,
            config,
            ontology,
            store,
            tool,
            agent: Arc::new(agent),
            threads: Arc::new(InMemoryThreadStore::new()),
        })
    }
}
