//! API server startup helper for embedding in the fleet server binary.
//!
//! Provides [`spawn_api`] which launches the HTTP + `WebSocket` server on
//! a background Tokio task. The server binary calls this during startup so
//! the API runs concurrently with the ingest bridge and liveness monitor.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::server::{ServerConfig, ServerError, start_server};
use crate::state::AppState;

/// Errors that can occur when spawning the API server.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// The server failed to bind or start.
    #[error("server start error: {0}")]
    Server(#[from] ServerError),
}

/// Spawn the fleet API server on a background Tokio task.
///
/// Binds to `{host}:{port}` and serves the REST API plus the `WebSocket`
/// feed endpoint. Returns a [`JoinHandle`] so the caller can manage the
/// server's lifecycle alongside the background tasks.
///
/// The server runs until the Tokio runtime is shut down or the task is
/// aborted. The caller should hold the returned handle and abort or
/// await it during clean shutdown.
///
/// # Errors
///
/// Returns [`StartupError::Server`] if the requested address cannot be
/// parsed. Bind failures surface from the spawned task's log output.
pub async fn spawn_api(
    config: ServerConfig,
    state: Arc<AppState>,
) -> Result<JoinHandle<()>, StartupError> {
    // Verify the address is parseable before spawning the background task.
    // The actual bind happens inside start_server, but we catch obvious
    // misconfigurations early.
    let addr_str = format!("{}:{}", config.host, config.port);
    let _: std::net::SocketAddr = addr_str.parse().map_err(|e| {
        StartupError::Server(ServerError::Bind(format!("invalid address {addr_str}: {e}")))
    })?;

    let handle = tokio::spawn(async move {
        if let Err(e) = start_server(&config, state).await {
            tracing::error!(error = %e, "fleet API server exited with error");
        }
    });

    tracing::info!(addr = %addr_str, "fleet API server spawned on background task");

    Ok(handle)
}
