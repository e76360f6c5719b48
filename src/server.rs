//! HTTP API for the chat frontend.
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/` | Liveness message |
//! | `POST` | `/agent/chat` | Ask the agent a question |
//! | `POST` | `/api/chat` | Same handler, mounted under the API router |
//!
//! Chat failures are reported in-band: the status stays `200 OK` and the
//! `response` field carries `An error occurred: <description>`.

use crate::service::PlacementService;
use axum::{
    extract::State,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

/// Message returned by `GET /`.
pub const LIVENESS_MESSAGE: &str = "Placement AI Backend is running!";

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub query: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QueryResponse {
    pub response: String,
}

/// Build the application router.
pub fn router(service: Arc<PlacementService>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new().route("/chat", post(chat));

    Router::new()
        .route("/", get(read_root))
        .route("/agent/chat", post(chat))
        .nest("/api", api)
        .layer(cors)
        .with_state(service)
}

/// Serve until `shutdown` resolves, initializing the pool first and closing it
/// after the last connection drains.
pub async fn serve<F>(
    listener: TcpListener,
    service: Arc<PlacementService>,
    shutdown: F,
) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    service.start()?;

    let app = router(service.clone());
    let result = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await;

    service.shutdown();
    info!("Server stopped");
    Ok(result?)
}

async fn read_root() -> impl IntoResponse {
    Json(serde_json::json!({ "message": LIVENESS_MESSAGE }))
}

async fn chat(
    State(service): State<Arc<PlacementService>>,
    Json(req): Json<QueryRequest>,
) -> Json<QueryResponse> {
    match service.chat(&req.query).await {
        Ok(response) => Json(QueryResponse { response }),
        Err(e) => {
            error!("Chat request failed: {}", e);
            Json(QueryResponse {
                response: format!("An error occurred: {}", e),
            })
        }
    }
}
