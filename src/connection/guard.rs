// src/connection/guard.rs

//! Defines `ConnectionGuard`, an RAII guard for connection resource management.

use crate::core::metrics;
use crate::core::state::{ServerState, SessionId};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::debug;

/// Ensures a session is removed from the registry however its handler exits,
/// including by panic or task abort.
pub struct ConnectionGuard {
    state: Arc<ServerState>,
    session_id: SessionId,
    addr: SocketAddr,
}

impl ConnectionGuard {
    pub(crate) fn new(state: Arc<ServerState>, session_id: SessionId, addr: SocketAddr) -> Self {
        metrics::CONNECTED_CLIENTS.inc();
        Self {
            state,
            session_id,
            addr,
        }
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        metrics::CONNECTED_CLIENTS.dec();

        // Removal is idempotent: quit, kick and the handler itself may all get here first.
        if self.state.registry.remove(self.session_id).is_some() {
            debug!(
                "ConnectionGuard removed session {} for {} from the registry.",
                self.session_id, self.addr
            );
        } else {
            debug!(
                "Session {} for {} was already removed before cleanup.",
                self.session_id, self.addr
            );
        }
    }
}
