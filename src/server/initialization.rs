// src/server/initialization.rs

//! Builds the server state and binds the listener.

use super::context::ServerContext;
use crate::config::Config;
use crate::core::state::ServerState;
use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::{Notify, broadcast};
use tokio::task::JoinSet;
use tracing::info;

/// Initializes all server components before starting the main loop.
pub async fn setup(config: Config) -> Result<ServerContext> {
    log_startup_info(&config);
    let (shutdown_tx, _) = broadcast::channel(1);

    let listener = TcpListener::bind((config.host.as_str(), config.port))
        .await
        .with_context(|| format!("Failed to bind {}:{}", config.host, config.port))?;
    let local_addr = listener.local_addr()?;
    info!("Server started on {}", local_addr);

    let state = ServerState::new(config);

    Ok(ServerContext {
        state,
        listener,
        local_addr,
        shutdown_tx,
        stop: Arc::new(Notify::new()),
        background_tasks: JoinSet::new(),
    })
}

fn log_startup_info(config: &Config) {
    info!("RelayChat version {}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration: max_clients={}, identity={}, send_poll_interval={}ms, managers={:?}",
        config.max_clients, config.identity, config.send_poll_interval_ms, config.managers
    );
}
