//! Access to the RDF triple store.
//!
//! The running application only ever sees [`GraphStore`], which exposes the
//! SPARQL query operation and nothing else. Writing statements is reserved for
//! the out-of-band import through [`GraphLoader`].

use async_trait::async_trait;
use thiserror::Error;

pub mod http;
pub mod results;

pub use http::HttpSparqlStore;
pub use results::{Binding, QueryResults, Row, TermKind};

/// Failure of a store interaction, one variant per reported error kind.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The store rejected the query text.
    #[error("the store rejected the query: {message}")]
    Syntax { message: String },
    /// The store could not be reached.
    #[error("could not reach the store at {endpoint}: {message}")]
    Connection { endpoint: String, message: String },
    /// The store did not answer in time.
    #[error("the store did not answer within {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },
    /// The adapter is not usable with the current settings.
    #[error("store is misconfigured: {message}")]
    Configuration { message: String },
    /// The store does not know the configured repository.
    #[error("repository `{repository}` was not found: {message}")]
    Repository { repository: String, message: String },
    /// Any other non-success answer.
    #[error("the store answered with status {status}: {message}")]
    Upstream { status: u16, message: String },
    /// The answer could not be decoded.
    #[error("failed to decode the store response: {message}")]
    Decode { message: String },
}

impl StoreError {
    /// Stable identifier of the error kind, reported to the model.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Syntax { .. } => "syntax",
            Self::Connection { .. } => "connection",
            Self::Timeout { .. } => "timeout",
            Self::Configuration { .. } => "configuration",
            Self::Repository { .. } => "repository",
            Self::Upstream { .. } => "upstream",
            Self::Decode { .. } => "decode",
        }
    }
}

/// Read-only access to a SPARQL endpoint.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Evaluates a `SELECT` or `ASK` query.
    async fn query(&self, query: &str) -> Result<QueryResults, StoreError>;

    /// Human readable location of the store, used in logs and diagnostics.
    fn location(&self) -> String;

    /// Verifies the store answers queries.
    async fn ping(&self) -> Result<(), StoreError> {
        self.query("ASK {}").await.map(|_| ())
    }
}

/// Bulk loading of statements, used only by the import command.
#[async_trait]
pub trait GraphLoader: Send + Sync {
    /// Appends an N-Triples document to the repository.
    async fn load_ntriples(&self, document: String) -> Result<(), StoreError>;

    /// Appends a Turtle document to the repository.
    async fn load_turtle(&self, document: String) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_stable() {
        let cases = [
            (
                StoreError::Syntax {
                    message: String::new(),
                },
                "syntax",
            ),
            (
                StoreError::Connection {
                    endpoint: String::new(),
                    message: String::new(),
                },
                "connection",
            ),
            (StoreError::Timeout { timeout_ms: 10 }, "timeout"),
            (
                StoreError::Repository {
                    repository: "jaguars".to_string(),
                    message: String::new(),
                },
                "repository",
            ),
            (
                StoreError::Upstream {
                    status: 503,
                    message: String::new(),
                },
                "upstream",
            ),
        ];
        for (error, kind) in cases {
            assert_eq!(error.kind(), kind);
        }
    }
}
