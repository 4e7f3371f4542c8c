//! Crate-wide error type and its HTTP rendering.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::{
    ai::{KnowledgeAgentError, KnowledgeAssistantInitError},
    config::ConfigError,
    ontology::OntologyError,
    store::StoreError,
    threads::ThreadError,
};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Message(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Thread(#[from] ThreadError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Agent(#[from] KnowledgeAgentError),

    #[error(transparent)]
    AssistantInit(#[from] KnowledgeAssistantInitError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Ontology(#[from] OntologyError),

    #[error(transparent)]
    JsonRejection(#[from] JsonRejection),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    IO(#[from] std::io::Error),

    #[error(transparent)]
    Any(#[from] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    pub fn wrap(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Any(Box::new(err))
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::JsonRejection(_) => StatusCode::BAD_REQUEST,
            Self::Thread(ThreadError::NotFound(_)) => StatusCode::NOT_FOUND,
            Self::Agent(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self.status() {
            StatusCode::BAD_REQUEST => "bad_request",
            StatusCode::NOT_FOUND => "not_found",
            StatusCode::BAD_GATEWAY => "upstream_failure",
            _ => "internal_server_error",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub error: String,
    pub description: String,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(err.msg = %self, err.detail = ?self, "controller_error");
        } else {
            tracing::debug!(err.msg = %self, "controller_rejected_request");
        }
        let description = match &self {
            Self::Any(_) | Self::IO(_) | Self::Config(_) => {
                "something went wrong on our side".to_string()
            }
            other => other.to_string(),
        };
        (
            status,
            Json(ErrorDetail {
                error: self.code().to_string(),
                description,
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::ai::KnowledgeAssistantError;

    async fn body(err: Error) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn model_failures_are_bad_gateway() {
        let err = Error::from(KnowledgeAgentError::Model(
            KnowledgeAssistantError::Provider("quota exceeded".to_string()),
        ));
        let (status, json) = body(err).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(json["error"], "upstream_failure");
        assert_eq!(json["description"], "provider error: quota exceeded");
    }

    #[tokio::test]
    async fn unknown_threads_are_not_found() {
        let id = Uuid::nil();
        let (status, json) = body(ThreadError::NotFound(id).into()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "not_found");
        assert_eq!(
            json["description"],
            format!("thread `{id}` does not exist")
        );
    }

    #[tokio::test]
    async fn internal_details_are_hidden() {
        let err = Error::wrap(std::io::Error::other("disk on fire"));
        let (status, json) = body(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["description"], "something went wrong on our side");
    }

    #[tokio::test]
    async fn invalid_requests_are_bad_requests() {
        let (status, json) = body(Error::BadRequest("message is empty".to_string())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "bad_request");
        assert_eq!(json["description"], "bad request: message is empty");
    }
}
