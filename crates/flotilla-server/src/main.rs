//! Fleet server binary.
//!
//! This is the main entry point that wires together the fleet registry,
//! NATS state ingest, liveness monitor, and HTTP/WebSocket API. It loads
//! configuration, initializes all subsystems, and runs until a shutdown
//! signal arrives.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration from `flotilla-config.yaml`
//! 3. Connect to NATS
//! 4. Assemble shared state and start the ingest bridge
//! 5. Start the liveness monitor
//! 6. Start the HTTP/WebSocket API server
//! 7. Wait for a shutdown signal, then stop tasks and drain the bus

mod error;
mod ingest;
mod liveness;
mod nats_bus;

use std::path::Path;
use std::sync::Arc;

use flotilla_api::state::AppState;
use flotilla_api::{ServerConfig, spawn_api};
use flotilla_core::{CommandBus, FleetConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::FlotillaError;
use crate::nats_bus::NatsBus;

/// Application entry point for the fleet server.
///
/// Initializes all subsystems and runs until interrupted.
///
/// # Errors
///
/// Returns an error if any initialization step fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("flotilla-server starting");

    // 2. Load configuration.
    let config = load_config()?;
    info!(
        http_host = config.http.host,
        http_port = config.http.port,
        bus_url = config.bus.url,
        offline_threshold_secs = config.liveness.offline_threshold_secs,
        sweep_interval_secs = config.liveness.sweep_interval_secs,
        min_battery_percent = config.dispatch.min_battery_percent,
        "Configuration loaded"
    );

    // 3. Connect to NATS.
    let bus = Arc::new(NatsBus::connect(&config.bus.url).await?);

    // 4. Assemble shared state and start the ingest bridge.
    let state = Arc::new(AppState::new(
        Arc::clone(&bus) as Arc<dyn CommandBus>,
        config.dispatch.clone(),
        config.feed.clone(),
    ));
    let reports = bus.subscribe_state_reports().await?;
    let ingest_handle = tokio::spawn(ingest::run_ingest(Arc::clone(&state), reports));
    info!("State ingest bridge started");

    // 5. Start the liveness monitor.
    let liveness_handle = tokio::spawn(liveness::run_liveness(
        Arc::clone(&state),
        config.liveness.offline_threshold(),
        config.liveness.sweep_interval(),
    ));
    info!("Liveness monitor started");

    // 6. Start the API server.
    let server_config = ServerConfig {
        host: config.http.host.clone(),
        port: config.http.port,
    };
    let api_handle = spawn_api(server_config, Arc::clone(&state)).await?;
    info!(port = config.http.port, "Fleet API server started");

    // 7. Wait for shutdown.
    tokio::signal::ctrl_c().await?;
    info!("shutdown signal received");

    ingest_handle.abort();
    liveness_handle.abort();
    api_handle.abort();
    if let Err(e) = bus.drain().await {
        warn!(error = %e, "bus drain failed during shutdown");
    }

    info!("flotilla-server shutdown complete");
    Ok(())
}

/// Load the server configuration from `flotilla-config.yaml`.
///
/// Looks for the config file relative to the current working directory.
/// Environment overrides (`NATS_URL`, `FLOTILLA_HTTP_PORT`) apply
/// whether or not the file exists.
fn load_config() -> Result<FleetConfig, FlotillaError> {
    let config_path = Path::new("flotilla-config.yaml");
    if config_path.exists() {
        let config = FleetConfig::from_file(config_path)?;
        Ok(config)
    } else {
        info!("Config file not found, using defaults");
        let mut config = FleetConfig::default();
        config.apply_env_overrides();
        Ok(config)
    }
}
