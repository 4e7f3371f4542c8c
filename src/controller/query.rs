use axum::{extract::State, response::Response, routing::post};
use serde::Deserialize;
use validator::Validate;

use crate::{
    app::AppContext,
    controller::{format, JsonValidate, Routes},
    Result,
};

#[derive(Debug, Deserialize, Validate)]
pub struct QueryRequest {
    #[validate(length(min = 1, message = "query must not be empty"))]
    pub query: String,
}

/// Runs a SPARQL query through the query tool, bypassing the model.
///
/// Store failures are part of the tool output, so this answers `200` with
/// either SPARQL JSON results or an `{ error, message, query }` object.
pub async fn run(
    State(ctx): State<AppContext>,
    JsonValidate(payload): JsonValidate<QueryRequest>,
) -> Result<Response> {
    format::json(ctx.tool.run(&payload.query).await)
}

pub fn routes() -> Routes {
    Routes::new().prefix("/api").add("/query", post(run))
}
