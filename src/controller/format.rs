//! Response helpers used by controllers.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::Result;

/// Returns a JSON response.
///
/// # Errors
/// Currently never fails; the signature matches the other helpers so
/// handlers can end with `format::json(..)`.
pub fn json<T: Serialize>(t: T) -> Result<Response> {
    Ok(Json(t).into_response())
}

/// Returns an HTML response.
///
/// # Errors
/// Currently never fails.
pub fn html(content: &'static str) -> Result<Response> {
    Ok(Html(content).into_response())
}

/// Returns an empty `204 No Content` response.
///
/// # Errors
/// Currently never fails.
pub fn empty() -> Result<Response> {
    Ok(StatusCode::NO_CONTENT.into_response())
}
