//! The single capability offered to the model: querying the jaguar database.

use std::{fmt::Write as _, sync::Arc};

use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{
    templates::{QueryTemplate, TemplateError},
    ToolDefinition,
};
use crate::{
    ontology::{rdf::schema_turtle, Ontology},
    store::{GraphStore, QueryResults},
};

/// Function name the model calls.
pub const QUERY_TOOL_NAME: &str = "query_jaguar_database";

const TOOL_INTRO: &str = "\
Query the jaguar knowledge graph using SPARQL. Use this tool when users ask questions about jaguars, \
jaguar populations, conservation efforts, habitats, threats, or any jaguar-related data. You must \
generate a valid SPARQL query based on the jaguar ontology below. The tool returns raw SPARQL JSON \
results that you must interpret and convert into a natural language answer for the user. \
When the query fails the tool returns an object with `error`, `message` and `query` fields.";

#[derive(Debug, Deserialize)]
struct QueryArguments {
    sparql_query: String,
}

/// Structured failure returned to the model instead of results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolFailure {
    pub error: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
}

impl ToolFailure {
    #[must_use]
    pub fn new(error: &str, message: impl Into<String>, query: Option<&str>) -> Self {
        Self {
            error: error.to_string(),
            message: message.into(),
            query: query.map(ToString::to_string),
        }
    }
}

/// Result of a tool invocation; never an `Err`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ToolOutput {
    Results(QueryResults),
    Failure(ToolFailure),
}

impl ToolOutput {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Results(_))
    }

    /// Error kind of a failed invocation.
    #[must_use]
    pub fn error_kind(&self) -> Option<&str> {
        match self {
            Self::Results(_) => None,
            Self::Failure(failure) => Some(&failure.error),
        }
    }

    /// JSON text handed back to the model.
    #[must_use]
    pub fn to_text(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|err| {
            json!({ "error": "decode", "message": err.to_string() }).to_string()
        })
    }
}

/// Executes SPARQL queries on behalf of the model.
#[derive(Clone)]
pub struct QueryTool {
    store: Arc<dyn GraphStore>,
    description: String,
}

impl QueryTool {
    /// Creates the tool, embedding the ontology schema and the query templates
    /// in its description.
    pub fn new(store: Arc<dyn GraphStore>, ontology: &Ontology) -> Result<Self, TemplateError> {
        Ok(Self {
            store,
            description: describe(ontology)?,
        })
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Declaration offered to the model.
    #[must_use]
    pub fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: QUERY_TOOL_NAME.to_string(),
            description: self.description.clone(),
            parameters: parameters_schema(),
        }
    }

    /// Runs a call issued by the model with its raw JSON arguments.
    pub async fn invoke(&self, arguments: &str) -> (Option<String>, ToolOutput) {
        match serde_json::from_str::<QueryArguments>(arguments) {
            Ok(QueryArguments { sparql_query }) => {
                let output = self.run(&sparql_query).await;
                (Some(sparql_query.trim().to_string()), output)
            }
            Err(err) => (
                None,
                ToolOutput::Failure(ToolFailure::new(
                    "invalid_arguments",
                    format!("expected an object with a `sparql_query` string: {err}"),
                    None,
                )),
            ),
        }
    }

    /// Runs a query against the store, converting every failure into a
    /// [`ToolFailure`].
    pub async fn run(&self, query: &str) -> ToolOutput {
        let query = query.trim();
        if query.is_empty() {
            return ToolOutput::Failure(ToolFailure::new(
                "invalid_arguments",
                "`sparql_query` must not be empty",
                Some(query),
            ));
        }

        match self.store.query(query).await {
            Ok(results) => {
                tracing::info!(tool = QUERY_TOOL_NAME, rows = results.len(), "tool_query_succeeded");
                ToolOutput::Results(results)
            }
            Err(err) => {
                tracing::warn!(
                    tool = QUERY_TOOL_NAME,
                    kind = err.kind(),
                    err.msg = %err,
                    "tool_query_failed"
                );
                ToolOutput::Failure(ToolFailure::new(err.kind(), err.to_string(), Some(query)))
            }
        }
    }
}

/// JSON schema of the tool arguments.
#[must_use]
pub fn parameters_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "sparql_query": {
                "type": "string",
                "description": "A valid SPARQL query, including its PREFIX declarations, to execute against the jaguar database."
            }
        },
        "required": ["sparql_query"],
        "additionalProperties": false
    })
}

fn describe(ontology: &Ontology) -> Result<String, TemplateError> {
    let mut description = String::from(TOOL_INTRO);
    description.push_str("\n\nThe database follows this ontology:\n\n");
    description.push_str(&schema_turtle(ontology));
    description.push_str("\nSPARQL query examples:\n");
    for template in QueryTemplate::ALL {
        let _ = write!(description, "\n- {}:\n{}\n", template.summary(), template.example()?);
    }
    description.push_str(
        "\n- Always try to make a simple query first and only add complexity if needed.\
         \n- Always include relevant prefixes in the query.",
    );
    Ok(description)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ontology::jaguar_ontology, store::StoreError, tests_cfg::store::StubStore};

    fn tool(store: StubStore) -> QueryTool {
        QueryTool::new(Arc::new(store), &jaguar_ontology().unwrap()).unwrap()
    }

    #[test]
    fn definition_embeds_schema_and_examples() {
        let definition = tool(StubStore::default()).definition();
        assert_eq!(definition.name, "query_jaguar_database");
        assert!(definition.description.contains("ont:wasKilled a owl:DatatypeProperty"));
        assert!(definition.description.contains("- Find killed jaguars:"));
        assert!(definition.description.contains("BIND(:El_Jefe AS ?jaguar)"));
        assert_eq!(definition.parameters["required"], json!(["sparql_query"]));
    }

    #[tokio::test]
    async fn successful_query_returns_sparql_json() {
        let store = StubStore::with_results(QueryResults::solutions(vec!["x".to_string()], vec![]));
        let tool = tool(store.clone());
        let (query, output) = tool
            .invoke(r#"{"sparql_query": "  SELECT ?x WHERE { ?x ?p ?o }  "}"#)
            .await;
        assert_eq!(query.as_deref(), Some("SELECT ?x WHERE { ?x ?p ?o }"));
        assert!(output.is_success());
        assert_eq!(
            serde_json::from_str::<serde_json::Value>(&output.to_text()).unwrap(),
            json!({"head": {"vars": ["x"]}, "results": {"bindings": []}})
        );
        assert_eq!(store.queries(), vec!["SELECT ?x WHERE { ?x ?p ?o }".to_string()]);
    }

    #[tokio::test]
    async fn store_errors_become_structured_failures() {
        let store = StubStore::with_error(StoreError::Syntax {
            message: "Encountered \"SELEC\"".to_string(),
        });
        let output = tool(store).run("SELEC ?x").await;
        assert_eq!(
            output,
            ToolOutput::Failure(ToolFailure {
                error: "syntax".to_string(),
                message: "the store rejected the query: Encountered \"SELEC\"".to_string(),
                query: Some("SELEC ?x".to_string()),
            })
        );
    }

    #[tokio::test]
    async fn malformed_arguments_never_reach_the_store() {
        let store = StubStore::default();
        let tool = tool(store.clone());
        for arguments in ["not json", r#"{"query": "ASK {}"}"#, r#"{"sparql_query": "   "}"#] {
            let (_, output) = tool.invoke(arguments).await;
            assert_eq!(output.error_kind(), Some("invalid_arguments"), "{arguments}");
        }
        assert!(store.queries().is_empty());
    }
}
