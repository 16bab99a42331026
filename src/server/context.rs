// src/server/context.rs

use crate::core::state::ServerState;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::{Notify, broadcast};
use tokio::task::JoinSet;

/// Holds all the initialized state required to run the server's main loop.
pub struct ServerContext {
    pub state: Arc<ServerState>,
    pub listener: TcpListener,
    pub local_addr: SocketAddr,
    /// Fans the shutdown out to every connection handler and background task.
    pub shutdown_tx: broadcast::Sender<()>,
    /// Asks the accept loop to stop.
    pub stop: Arc<Notify>,
    pub background_tasks: JoinSet<Result<(), anyhow::Error>>,
}

/// Stops a running server from outside its accept loop.
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    stop: Arc<Notify>,
}

impl ShutdownHandle {
    pub(crate) fn new(stop: Arc<Notify>) -> Self {
        Self { stop }
    }

    /// Requests a graceful shutdown. A request made before the accept loop starts
    /// waiting is kept and honored as soon as it does.
    pub fn shutdown(&self) {
        self.stop.notify_one();
    }
}
