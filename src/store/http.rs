//! SPARQL 1.1 protocol adapter for GraphDB / RDF4J style servers.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{header, StatusCode};

use super::{
    results::{QueryResults, SPARQL_RESULTS_JSON},
    GraphLoader, GraphStore, StoreError,
};
use crate::config::StoreSettings;

const NTRIPLES: &str = "application/n-triples";
const TURTLE: &str = "text/turtle";

/// Queries a repository over HTTP.
///
/// Queries are always sent as the `query` form parameter, which the protocol
/// reserves for read operations.
#[derive(Clone, Debug)]
pub struct HttpSparqlStore {
    client: reqwest::Client,
    endpoint: String,
    repository: String,
    timeout: Duration,
}

impl HttpSparqlStore {
    /// Builds the adapter from configuration.
    ///
    /// # Errors
    /// Returns [`StoreError::Configuration`] when the HTTP client cannot be
    /// constructed.
    pub fn new(settings: &StoreSettings) -> Result<Self, StoreError> {
        let timeout = Duration::from_millis(settings.timeout_ms);
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(|err| StoreError::Configuration {
                message: err.to_string(),
            })?;
        Ok(Self {
            client,
            endpoint: settings.endpoint.trim().trim_end_matches('/').to_string(),
            repository: settings.repository.trim().to_string(),
            timeout,
        })
    }

    /// URL of the repository query endpoint.
    #[must_use]
    pub fn query_url(&self) -> String {
        format!("{}/repositories/{}", self.endpoint, self.repository)
    }

    /// URL of the repository statements endpoint.
    #[must_use]
    pub fn statements_url(&self) -> String {
        format!("{}/statements", self.query_url())
    }

    fn require_repository(&self) -> Result<(), StoreError> {
        if self.repository.is_empty() {
            return Err(StoreError::Configuration {
                message: "repository identifier is empty".to_string(),
            });
        }
        Ok(())
    }

    fn transport_error(&self, err: &reqwest::Error) -> StoreError {
        if err.is_timeout() {
            StoreError::Timeout {
                timeout_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
            }
        } else if err.is_decode() {
            StoreError::Decode {
                message: err.to_string(),
            }
        } else {
            StoreError::Connection {
                endpoint: self.endpoint.clone(),
                message: err.to_string(),
            }
        }
    }

    async fn read_body(&self, response: reqwest::Response) -> Result<(StatusCode, String), StoreError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| self.transport_error(&err))?;
        Ok((status, body))
    }
}

/// Maps a non-success answer of the store to an error kind.
#[must_use]
pub fn classify_status(status: StatusCode, repository: &str, body: &str) -> StoreError {
    let message = match body.trim() {
        "" => status
            .canonical_reason()
            .unwrap_or("no diagnostic provided")
            .to_string(),
        text => text.to_string(),
    };
    match status {
        StatusCode::BAD_REQUEST => StoreError::Syntax { message },
        StatusCode::NOT_FOUND => StoreError::Repository {
            repository: repository.to_string(),
            message,
        },
        _ => StoreError::Upstream {
            status: status.as_u16(),
            message,
        },
    }
}

#[async_trait]
impl GraphStore for HttpSparqlStore {
    async fn query(&self, query: &str) -> Result<QueryResults, StoreError> {
        self.require_repository()?;
        let query = query.trim();
        let started = Instant::now();
        tracing::debug!(repository = %self.repository, "sparql_query_sent");

        let response = self
            .client
            .post(self.query_url())
            .header(header::ACCEPT, SPARQL_RESULTS_JSON)
            .form(&[("query", query)])
            .send()
            .await
            .map_err(|err| self.transport_error(&err))?;
        let (status, body) = self.read_body(response).await?;
        if !status.is_success() {
            let error = classify_status(status, &self.repository, &body);
            tracing::debug!(
                status = status.as_u16(),
                kind = error.kind(),
                "sparql_query_rejected"
            );
            return Err(error);
        }

        let results = QueryResults::from_json(&body)?;
        tracing::debug!(
            rows = results.len(),
            elapsed_ms = started.elapsed().as_millis(),
            "sparql_query_completed"
        );
        Ok(results)
    }

    fn location(&self) -> String {
        self.query_url()
    }
}

#[async_trait]
impl GraphLoader for HttpSparqlStore {
    async fn load_ntriples(&self, document: String) -> Result<(), StoreError> {
        self.post_statements(document, NTRIPLES).await
    }

    async fn load_turtle(&self, document: String) -> Result<(), StoreError> {
        self.post_statements(document, TURTLE).await
    }
}

impl HttpSparqlStore {
    async fn post_statements(&self, document: String, media_type: &str) -> Result<(), StoreError> {
        self.require_repository()?;
        let bytes = document.len();
        let response = self
            .client
            .post(self.statements_url())
            .header(header::CONTENT_TYPE, media_type)
            .body(document)
            .send()
            .await
            .map_err(|err| self.transport_error(&err))?;
        let (status, body) = self.read_body(response).await?;
        if !status.is_success() {
            return Err(classify_status(status, &self.repository, &body));
        }
        tracing::info!(repository = %self.repository, media_type, bytes, "statements_loaded");
        Ok(())
    }
}
