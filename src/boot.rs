//! Application startup: configuration, context and the HTTP server.

use std::time::Duration;

use axum::{http::StatusCode, Router};
use colored::Colorize;
use tower_http::{
    catch_panic::CatchPanicLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};

use crate::{
    app::AppContext, config::Config, controller::AppRoutes, environment::Environment, logger,
    Error, Result,
};

/// Where the server listens.
#[derive(Debug, Clone)]
pub struct ServeParams {
    pub port: u16,
    pub binding: String,
}

/// Loads the configuration of `environment` and initializes logging.
///
/// # Errors
/// Fails on a missing or invalid configuration file.
pub fn load_config(environment: &Environment) -> Result<Config> {
    let config = environment.load()?;
    logger::init(&config.logger)?;
    Ok(config)
}

/// Loads configuration and wires the application context.
///
/// # Errors
/// Fails on invalid configuration, including a missing API key or model.
pub fn create_context(environment: &Environment) -> Result<AppContext> {
    let config = load_config(environment)?;
    AppContext::from_config(environment.clone(), config)
}

/// Builds the router with the middleware stack.
#[must_use]
pub fn router(ctx: AppContext) -> Router {
    let server = ctx.config.server.clone();
    let mut router = AppRoutes::with_default_routes()
        .to_router(ctx)
        .layer(timeout_layer(server.request_timeout_ms))
        .layer(CatchPanicLayer::new())
        .layer(TraceLayer::new_for_http());
    if server.cors {
        router = router.layer(CorsLayer::permissive());
    }
    router
}

/// Answers `408 Request Timeout` once a request runs longer than `timeout_ms`.
fn timeout_layer(timeout_ms: u64) -> TimeoutLayer {
    TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, Duration::from_millis(timeout_ms))
}

/// Public URL of the server once `params` are applied.
fn listening_url(ctx: &AppContext, params: &ServeParams) -> String {
    let mut server = ctx.config.server.clone();
    server.port = params.port;
    server.full_url()
}

/// Serves the application until Ctrl-C or `SIGTERM`.
///
/// # Errors
/// Fails when the address cannot be bound.
pub async fn serve(ctx: AppContext, params: ServeParams) -> Result<()> {
    let full_url = listening_url(&ctx, &params);
    let router = router(ctx);
    let listener = tokio::net::TcpListener::bind(format!("{}:{}", params.binding, params.port))
        .await
        .map_err(|err| {
            Error::Message(format!(
                "cannot bind {}:{}: {err}",
                params.binding, params.port
            ))
        })?;

    println!("{}", "Jaguar knowledge graph agent".bold().yellow());
    println!("listening on {}", full_url.green());
    tracing::info!(binding = %params.binding, port = params.port, "server_started");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("server_stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(err.msg = %err, "ctrl_c_handler_failed");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(err.msg = %err, "sigterm_handler_failed");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use axum::{body::Body, http::Request, routing::get};
    use tower::ServiceExt;

    use super::*;
    use crate::tests_cfg;

    #[tokio::test]
    async fn serves_the_chat_page() {
        let ctx = tests_cfg::app::get_app_context().await;
        let response = router(ctx)
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let page = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(page.contains("/api/chat"));
    }

    #[tokio::test]
    async fn slow_requests_time_out() {
        let response = Router::new()
            .route(
                "/slow",
                get(|| async {
                    tokio::time::sleep(Duration::from_millis(200)).await;
                    "late"
                }),
            )
            .layer(timeout_layer(10))
            .oneshot(Request::builder().uri("/slow").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
    }

    #[tokio::test]
    async fn listening_url_uses_the_overridden_port() {
        let ctx = tests_cfg::app::get_app_context().await;
        let params = ServeParams {
            port: 8080,
            binding: "0.0.0.0".to_string(),
        };
        assert_eq!(
            listening_url(&ctx, &params),
            format!("{}:8080", ctx.config.server.host)
        );
    }

    #[tokio::test]
    async fn unknown_routes_are_not_found() {
        let ctx = tests_cfg::app::get_app_context().await;
        let response = router(ctx)
            .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), 404);
    }
}
