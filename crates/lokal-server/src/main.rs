//! Lokal Server: Application entry point.

use clap::Parser;
use lokal_db::DbManager;
use lokal_server::{AppState, Config, build_router};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("lokal=info,tower_http=info"));
    tracing_subscriber::fmt().with_env_filter(filter).json().init();

    info!("Starting Lokal server...");

    let db = DbManager::connect(&config.db_config()).await?;
    db.migrate().await?;

    let state = AppState::new(db.into_client(), config.entitlements_config());
    let app = build_router(state);

    let listener = TcpListener::bind(config.bind_addr).await?;
    info!(addr = %config.bind_addr, "Listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Lokal server stopped.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
    }
}
