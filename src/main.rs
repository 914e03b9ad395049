use anyhow::Context;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use church_console_api::ai::GeminiClient;
use church_console_api::app::{router, AppState};
use church_console_api::config::AppConfig;
use church_console_api::database::{DatabaseManager, PgStore};
use church_console_api::sms;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("church_console_api=info,tower_http=info")),
        )
        .init();

    let config = AppConfig::from_env();
    tracing::info!("Starting Church Console API in {:?} mode", config.environment);
    if config.ai.api_key.is_none() {
        tracing::warn!("GEMINI_API_KEY is not set; AI endpoints will fail");
    }

    let db = DatabaseManager::new(config.database.clone());
    let store = Arc::new(PgStore::new(db.clone()));
    let model = Arc::new(GeminiClient::new(&config.ai)?);
    let sms = sms::gateway_for(&config)?;

    let port = config.server.port;
    let app = router(AppState::new(config, store, model, sms));

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!("Listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    db.close_all().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
