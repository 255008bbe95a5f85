pub mod error;
pub mod routes;
pub mod state;

pub use routes::make_app;
pub use state::{AppState, ChatTurn, SharedState};

use crate::app::system::RecommendationSystem;
use crate::config::ServerConfig;
use crate::utils::error::{RecsysError, Result};

pub async fn run_server(system: RecommendationSystem, config: &ServerConfig) -> Result<()> {
    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .map_err(|e| RecsysError::ServerError {
            message: format!("cannot bind {}: {}", address, e),
        })?;

    tracing::info!("🌐 Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, make_app(AppState::shared(system)))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("👋 Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
    }
}
