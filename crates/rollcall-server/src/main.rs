//! Rollcall Server: application entry point.

use std::sync::Arc;

use clap::Parser;
use rollcall_auth::AuthService;
use rollcall_db::DbManager;
use rollcall_server::{AppState, Cli, ServerConfig, router};
use rollcall_sync::SyncEngine;
use rollcall_sync::http::{HttpNotifier, HttpRosterSource};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("rollcall=info".parse()?))
        .json()
        .init();

    let config = ServerConfig::try_from(Cli::parse())?;

    tracing::info!("Starting Rollcall server...");

    let db = DbManager::connect(&config.db).await?;
    let repo = db.user_repository(config.auth.pepper.clone());

    let roster = Arc::new(HttpRosterSource::from_config(&config.sync)?);
    let notifier = Arc::new(HttpNotifier::from_config(&config.sync)?);
    let sync = SyncEngine::new(repo.clone(), roster, notifier, &config.auth, &config.sync);
    let auth = AuthService::new(repo, config.auth.clone());

    let app = router(AppState::new(auth, sync));

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;
    tracing::info!(addr = %listener.local_addr()?, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Rollcall server stopped.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
