//! HTTP query endpoint.
//!
//! Exposes the companion over a small JSON API so a chat frontend can talk
//! to it. The request/response contract mirrors the query boundary of
//! [`crate::service::Companion::ask`]: callers always receive a `response`
//! string, never an internal error.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/send_message` | Answer a user question against the document base |
//! | `GET`  | `/health` | Health check (version plus store counts) |
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted so browser-based chat
//! frontends can call the API directly.

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::service::Companion;

#[derive(Debug, Deserialize)]
struct SendMessageRequest {
    #[serde(default)]
    message: String,
    #[serde(default)]
    project: Option<String>,
    #[serde(default)]
    api_key: String,
}

#[derive(Debug, Serialize)]
struct SendMessageResponse {
    response: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    records: usize,
    sources: usize,
}

/// Starts the HTTP server on the configured bind address. Runs until the
/// process is terminated.
pub async fn run_server(companion: Arc<Companion>) -> anyhow::Result<()> {
    let bind_addr = companion.config().server.bind.clone();

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/send_message", post(send_message))
        .route("/health", get(health))
        .layer(cors)
        .with_state(companion);

    println!("docq listening on http://{}", bind_addr);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn send_message(
    State(companion): State<Arc<Companion>>,
    Json(request): Json<SendMessageRequest>,
) -> Json<SendMessageResponse> {
    let response = companion
        .ask(
            &request.message,
            request.project.as_deref(),
            &request.api_key,
        )
        .await;
    Json(SendMessageResponse { response })
}

async fn health(State(companion): State<Arc<Companion>>) -> Json<HealthResponse> {
    let (records, sources) = companion.stats();
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        records,
        sources,
    })
}
