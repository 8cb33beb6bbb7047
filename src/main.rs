use anyhow::Context;
use std::{net::SocketAddr, sync::Arc};
use tracing_subscriber::{fmt, EnvFilter};

use pantry_chef::{config::Config, gemini::GeminiClient, routes::{app, AppState}};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Init tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("ERROR: {}", e);
            return Err(e).context("missing required configuration");
        }
    };
    tracing::info!("Using model {} at {}", config.model, config.api_base);

    let gemini = GeminiClient::new(config.api_key.clone(), config.api_base.clone(), config.model.clone());
    let state = AppState::new(Arc::new(gemini));
    let router = app(state, &config.static_dir);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, "Server running at http://localhost:{}", config.port);
    tracing::info!("Serving static files from {}", config.static_dir.display());

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
