use anyhow::{anyhow, Result};
use axum::{routing::get, Router};
use tracing::info;

pub const LIVENESS_MESSAGE: &str = "🤖 Discord bot is running!";

/// Keeps free hosting plans from idling the process.
pub fn router() -> Router {
    Router::new().route("/", get(liveness))
}

async fn liveness() -> &'static str {
    LIVENESS_MESSAGE
}

pub async fn serve(port: u16) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .map_err(|e| anyhow!("Failed to bind keep-alive server to port {}: {}", port, e))?;

    info!("🌐 Web server is running on port {}", port);

    axum::serve(listener, router())
        .await
        .map_err(|e| anyhow!("Keep-alive server error: {}", e))?;

    Ok(())
}
