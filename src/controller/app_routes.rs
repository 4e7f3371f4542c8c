use axum::Router;

use super::{agent, chat, monitoring, page, query, threads, Routes};
use crate::app::AppContext;

/// All route groups served by the application.
#[derive(Clone, Default)]
pub struct AppRoutes {
    routes: Vec<Routes>,
}

impl AppRoutes {
    /// The built-in controllers: chat page, JSON API and monitoring.
    #[must_use]
    pub fn with_default_routes() -> Self {
        Self::default()
            .add_route(page::routes())
            .add_route(chat::routes())
            .add_route(threads::routes())
            .add_route(query::routes())
            .add_route(agent::routes())
            .add_route(monitoring::routes())
    }

    #[must_use]
    pub fn add_route(mut self, routes: Routes) -> Self {
        self.routes.push(routes);
        self
    }

    /// Full paths of every handler, in registration order.
    #[must_use]
    pub fn collect(&self) -> Vec<String> {
        self.routes
            .iter()
            .flat_map(|group| {
                group
                    .handlers
                    .iter()
                    .map(|handler| join_path(group.prefix.as_deref(), &handler.uri))
            })
            .collect()
    }

    /// Builds the router with `ctx` as shared state.
    pub fn to_router(&self, ctx: AppContext) -> Router {
        let mut router = Router::new();
        for group in &self.routes {
            for handler in &group.handlers {
                let uri = join_path(group.prefix.as_deref(), &handler.uri);
                tracing::debug!(uri = %uri, "route_registered");
                router = router.route(&uri, handler.method.clone());
            }
        }
        router.with_state(ctx)
    }
}

fn join_path(prefix: Option<&str>, uri: &str) -> String {
    let prefix = prefix.unwrap_or_default().trim_end_matches('/');
    let uri = uri.trim_start_matches('/');
    let joined = format!("{prefix}/{uri}");
    if joined.len() > 1 {
        joined.trim_end_matches('/').to_string()
    } else {
        joined
    }
}
