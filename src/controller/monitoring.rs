//! Liveness and readiness probes.

use axum::{extract::State, response::Response, routing::get};
use serde::Serialize;

use super::{format, routes::Routes};
use crate::{app::AppContext, Result};

/// Represents the health status of the application.
#[derive(Serialize)]
pub struct Health {
    pub ok: bool,
}

/// Check application ping endpoint
pub async fn ping() -> Result<Response> {
    format::json(Health { ok: true })
}

/// Check application health endpoint
pub async fn health() -> Result<Response> {
    format::json(Health { ok: true })
}

/// Reports whether the triple store answers an `ASK {}` query.
///
/// # Errors
/// Store failures are logged and reported as `ok: false`, never as an error.
pub async fn readiness(State(ctx): State<AppContext>) -> Result<Response> {
    let mut is_ok = true;

    if let Err(error) = ctx.store.ping().await {
        tracing::error!(
            err.msg = %error,
            err.detail = ?error,
            store = %ctx.store.location(),
            "readiness_store_ping_error"
        );
        is_ok = false;
    }

    format::json(Health { ok: is_ok })
}

/// Defines and returns the readiness-related routes.
pub fn routes() -> Routes {
    Routes::new()
        .add("/_readiness", get(readiness))
        .add("/_ping", get(ping))
        .add("/_health", get(health))
}
