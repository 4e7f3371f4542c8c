//! In-process SPARQL endpoint speaking the repository protocol, backed by an
//! in-memory `oxigraph` store.

use std::{net::SocketAddr, time::Duration};

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Form, Router,
};
use jaguar_kg::{config::StoreSettings, store::HttpSparqlStore};
use oxigraph::{
    sparql::{results::QueryResultsFormat, EvaluationError},
    store::Store,
};
use serde::Deserialize;

pub const REPOSITORY: &str = "jaguars";

#[derive(Clone)]
struct FakeEndpoint {
    store: Store,
    delay: Option<Duration>,
}

#[derive(Deserialize)]
struct QueryForm {
    query: String,
}

async fn query(
    State(fake): State<FakeEndpoint>,
    Path(repository): Path<String>,
    Form(form): Form<QueryForm>,
) -> Response {
    if repository != REPOSITORY {
        return (
            StatusCode::NOT_FOUND,
            format!("Unknown repository: {repository}"),
        )
            .into_response();
    }
    if let Some(delay) = fake.delay {
        tokio::time::sleep(delay).await;
    }
    match fake.store.query(form.query.as_str()) {
        Ok(results) => match results.write(Vec::new(), QueryResultsFormat::Json) {
            Ok(body) => (
                [(header::CONTENT_TYPE, "application/sparql-results+json")],
                body,
            )
                .into_response(),
            Err(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response(),
        },
        Err(err @ EvaluationError::Parsing(_)) => {
            (StatusCode::BAD_REQUEST, format!("MALFORMED QUERY: {err}")).into_response()
        }
        Err(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response(),
    }
}

async fn statements(
    State(fake): State<FakeEndpoint>,
    Path(repository): Path<String>,
    body: String,
) -> Response {
    if repository != REPOSITORY {
        return StatusCode::NOT_FOUND.into_response();
    }
    match fake.store.update(format!("INSERT DATA {{\n{body}\n}}").as_str()) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => (StatusCode::BAD_REQUEST, err.to_string()).into_response(),
    }
}

/// Starts an endpoint answering after `delay` and returns its base URL.
pub async fn spawn_endpoint(delay: Option<Duration>) -> String {
    let fake = FakeEndpoint {
        store: Store::new().unwrap(),
        delay,
    };
    let router = Router::new()
        .route("/repositories/{repository}", post(query))
        .route("/repositories/{repository}/statements", post(statements))
        .with_state(fake);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

pub fn http_store(endpoint: &str, repository: &str, timeout_ms: u64) -> HttpSparqlStore {
    HttpSparqlStore::new(&StoreSettings {
        endpoint: endpoint.to_string(),
        repository: repository.to_string(),
        timeout_ms,
    })
    .unwrap()
}
