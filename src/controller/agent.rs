use axum::{extract::State, response::Response, routing::get};
use serde::Serialize;

use crate::{
    ai::ToolDefinition,
    app::AppContext,
    controller::{format, Routes},
    Result,
};

#[derive(Debug, Serialize)]
pub struct AgentView {
    pub name: String,
    pub model: String,
    pub max_tool_rounds: usize,
    pub tools: Vec<ToolDefinition>,
}

/// Describes the agent and the tool it may call.
pub async fn describe(State(ctx): State<AppContext>) -> Result<Response> {
    format::json(AgentView {
        name: ctx.agent.name().to_string(),
        model: ctx.agent.model().to_string(),
        max_tool_rounds: ctx.agent.max_tool_rounds(),
        tools: vec![ctx.agent.tool().definition()],
    })
}

pub fn routes() -> Routes {
    Routes::new().prefix("/api").add("/agent", get(describe))
}

#[cfg(test)]
mod tests {
    use axum::{body::Body, http::Request};
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::{controller::AppRoutes, tests_cfg};

    #[tokio::test]
    async fn exposes_agent_and_tool() {
        let ctx = tests_cfg::app::get_app_context().await;
        let router = AppRoutes::with_default_routes().to_router(ctx);
        let req = Request::builder()
            .uri("/api/agent")
            .body(Body::empty())
            .unwrap();
        let response = router.oneshot(req).await.unwrap();
        assert_eq!(response.status(), 200);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["name"], "JaguarQueryAgent");
        assert_eq!(body["model"], "scripted");
        assert_eq!(body["max_tool_rounds"], 5);
        assert_eq!(body["tools"][0]["name"], "query_jaguar_database");
        assert!(body["tools"][0]["description"]
            .as_str()
            .unwrap()
            .contains("@prefix ont:"));
    }
}
