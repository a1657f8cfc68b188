pub mod api;
pub mod chat; // Chat room provisioning + message relay
pub mod config;
pub mod connections; // Connection request lifecycle
pub mod core_state;
pub mod dashboard;
pub mod db;
pub mod error;
pub mod identity; // Identity resolution + per-request sessions
pub mod models;
pub mod uploads; // Test upload metadata

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

/// Errors that stop the server from starting.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] config::ConfigError),
    #[error(transparent)]
    Core(#[from] core_state::CoreError),
    #[error("{0}")]
    Server(String),
}

/// Start the API server and run until Ctrl-C.
pub async fn run() -> Result<(), StartupError> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let server_config = config::ServerConfig::from_env()?;
    let core = Arc::new(core_state::CoreState::from_config(&server_config)?);

    let mut server = api::start_api_server(core, server_config.bind_addr)
        .await
        .map_err(StartupError::Server)?;
    tracing::info!(addr = %server.addr, "Listening");

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl-C: {e}");
    }
    server.shutdown();
    server.wait().await;

    tracing::info!("{} stopped", config::APP_NAME);
    Ok(())
}
