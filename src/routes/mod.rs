// src/routes/mod.rs
pub mod chat;

use crate::state::SharedState;
use axum::{
    Router,
    routing::{get, post},
};
use chat::chat_handler;
use tower_http::trace::TraceLayer;

pub const BANNER: &str = "<h1>Backend server is running and reachable!</h1>";

pub fn create_router() -> Router<SharedState> {
    Router::new()
        .route("/api/chat", post(chat_handler))
        .route("/", get(|| async { axum::response::Html(BANNER) }))
        .route("/health", get(|| async { "OK" }))
        .layer(TraceLayer::new_for_http())
}
