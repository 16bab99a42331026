// src/core/state/core.rs

//! Defines the central `ServerState` struct, holding all shared server-wide state.

use super::registry::Registry;
use super::stats::StatsState;
use crate::config::Config;
use std::sync::Arc;
use tracing::info;

/// The shared state handed to the accept loop and to every connection handler.
///
/// Each server (and each test) builds its own, so registries never leak between them.
#[derive(Debug)]
pub struct ServerState {
    /// The resolved configuration. Read-only once the server is running.
    pub config: Config,
    /// Sessions, username bindings, managers and muted users.
    pub registry: Registry,
    pub stats: StatsState,
}

impl ServerState {
    pub fn new(config: Config) -> Arc<Self> {
        let registry = Registry::new(config.managers.iter().cloned(), config.identity);
        info!(
            "Registry initialized with {} bootstrap manager(s), identity policy '{}'.",
            config.managers.len(),
            config.identity
        );
        Arc::new(Self {
            config,
            registry,
            stats: StatsState::new(),
        })
    }
}
