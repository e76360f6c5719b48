//! Serve command: runs the HTTP API until Ctrl+C.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::server;
use crate::service::PlacementService;
use std::sync::Arc;
use tracing::info;

/// Run the HTTP API server.
pub async fn run_serve(
    host: Option<String>,
    port: Option<u16>,
    settings: Settings,
) -> anyhow::Result<()> {
    if let Err(e) = preflight::check(Operation::Serve, &settings) {
        Output::error(&e.to_string());
        return Err(e.into());
    }

    let service = Arc::new(PlacementService::from_settings(&settings)?);

    let host = host.unwrap_or_else(|| settings.server.host.clone());
    let port = port.unwrap_or(settings.server.port);
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Placement AI API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Liveness", "GET  /");
    Output::kv("Chat", "POST /agent/chat");
    Output::kv("Chat (API router)", "POST /api/chat");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    server::serve(listener, service, async {
        let _ = tokio::signal::ctrl_c().await;
        info!("Shutdown signal received");
    })
    .await
}
