use axum::{
    extract::{Path, State},
    response::Response,
    routing::get,
};
use uuid::Uuid;

use crate::{
    app::AppContext,
    controller::{format, Routes},
    threads::ThreadError,
    Result,
};

/// Thread summaries, most recently updated first.
pub async fn list(State(ctx): State<AppContext>) -> Result<Response> {
    format::json(ctx.threads.list())
}

/// Full history of one thread.
///
/// # Errors
/// `404` when the thread does not exist.
pub async fn show(State(ctx): State<AppContext>, Path(id): Path<Uuid>) -> Result<Response> {
    let thread = ctx.threads.load(&id).ok_or(ThreadError::NotFound(id))?;
    format::json(thread)
}

/// # Errors
/// `404` when the thread does not exist.
pub async fn remove(State(ctx): State<AppContext>, Path(id): Path<Uuid>) -> Result<Response> {
    ctx.threads.delete(&id)?;
    tracing::info!(thread_id = %id, "thread_deleted");
    format::empty()
}

pub fn routes() -> Routes {
    Routes::new()
        .prefix("/api/threads")
        .add("/", get(list))
        .add("/{id}", get(show).delete(remove))
}
