// src/server/mod.rs

use crate::config::Config;
use crate::core::state::ServerState;
use anyhow::{Result, anyhow};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal::unix::{SignalKind, signal};
use tracing::info;

mod connection_loop;
mod context;
mod initialization;
mod metrics_server;
mod spawner;

use context::ServerContext;
pub use context::ShutdownHandle;

/// A relay whose listener is bound but which has not started accepting yet.
///
/// The server owns its registry: nothing is global, so several servers (one per
/// test, for instance) can run side by side in one process.
pub struct Server {
    ctx: ServerContext,
}

impl Server {
    /// Builds the server state and binds the listener. Port 0 picks a free port.
    pub async fn bind(config: Config) -> Result<Self> {
        let ctx = initialization::setup(config).await?;
        Ok(Self { ctx })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.ctx.local_addr
    }

    pub fn state(&self) -> Arc<ServerState> {
        self.ctx.state.clone()
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle::new(self.ctx.stop.clone())
    }

    /// Spawns the background tasks and accepts connections until shut down.
    pub async fn run(mut self) -> Result<()> {
        spawner::spawn_all(&mut self.ctx)?;
        connection_loop::run(self.ctx).await;
        Ok(())
    }
}

/// The main server startup function: binds, runs, and stops on SIGINT or SIGTERM.
pub async fn run(config: Config) -> Result<()> {
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow!("Failed to register SIGINT handler: {}", e))?;
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow!("Failed to register SIGTERM handler: {}", e))?;

    let server = Server::bind(config).await?;
    let handle = server.shutdown_handle();
    tokio::spawn(async move {
        tokio::select! {
            _ = sigint.recv() => info!("SIGINT received, initiating graceful shutdown."),
            _ = sigterm.recv() => info!("SIGTERM received, initiating graceful shutdown."),
        }
        handle.shutdown();
    });

    server.run().await
}
