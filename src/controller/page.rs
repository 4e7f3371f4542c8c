use axum::{response::Response, routing::get};

use crate::{
    controller::{format, Routes},
    Result,
};

const CHAT_PAGE: &str = include_str!("../../assets/chat.html");

/// Serves the browser chat client.
pub async fn index() -> Result<Response> {
    format::html(CHAT_PAGE)
}

pub fn routes() -> Routes {
    Routes::new().add("/", get(index))
}
