//! HTTP surface of the agent.
//!
//! Each controller exposes a `routes()` function returning [`Routes`];
//! [`AppRoutes`] collects them and turns them into an `axum::Router` bound to
//! the [`crate::app::AppContext`].
//!
//! ```rust,ignore
//! use jaguar_kg::controller::{format, Routes};
//!
//! async fn hello() -> jaguar_kg::Result<axum::response::Response> {
//!     format::json(serde_json::json!({ "hello": "jaguar" }))
//! }
//!
//! fn routes() -> Routes {
//!     Routes::new().prefix("/api").add("/hello", axum::routing::get(hello))
//! }
//! ```

pub mod agent;
mod app_routes;
pub mod chat;
pub mod extractor;
pub mod format;
pub mod monitoring;
pub mod page;
pub mod query;
mod routes;
pub mod threads;

pub use app_routes::AppRoutes;
pub use axum::Json;
pub use extractor::JsonValidate;
pub use routes::Routes;
