// src/core/metrics.rs

//! Defines and registers Prometheus metrics for server monitoring.
//!
//! This module uses `lazy_static` to ensure that metrics are registered only once
//! globally for the entire application lifecycle.

use lazy_static::lazy_static;
use prometheus::{
    Counter, CounterVec, Gauge, Histogram, TextEncoder, register_counter, register_counter_vec,
    register_gauge, register_histogram,
};

lazy_static! {
    /// The number of clients currently connected to the relay.
    pub static ref CONNECTED_CLIENTS: Gauge =
        register_gauge!("relaychat_connected_clients", "Number of currently connected clients.").unwrap();
    /// The size of the manager set, refreshed on every scrape.
    pub static ref MANAGERS: Gauge =
        register_gauge!("relaychat_managers", "Number of usernames holding the manager role.").unwrap();
    /// The number of muted usernames, refreshed on every scrape.
    pub static ref MUTED_USERS: Gauge =
        register_gauge!("relaychat_muted_users", "Number of muted usernames.").unwrap();

    /// The total number of connections accepted since startup.
    pub static ref CONNECTIONS_RECEIVED_TOTAL: Counter =
        register_counter!("relaychat_connections_received_total", "Total number of connections received.").unwrap();
    /// Connections closed at accept time because `max_clients` was reached.
    pub static ref CONNECTIONS_REJECTED_TOTAL: Counter =
        register_counter!("relaychat_connections_rejected_total", "Total number of connections refused at the client limit.").unwrap();
    /// Commands routed, labeled by command name.
    pub static ref COMMANDS_PROCESSED_TOTAL: CounterVec =
        register_counter_vec!("relaychat_commands_processed_total", "Total number of commands processed, labeled by command.", &["command"]).unwrap();
    /// Inbound frames dropped because they could not be parsed.
    pub static ref MALFORMED_FRAMES_TOTAL: Counter =
        register_counter!("relaychat_malformed_frames_total", "Total number of malformed frames dropped.").unwrap();
    /// Payloads written to client sockets.
    pub static ref MESSAGES_DELIVERED_TOTAL: Counter =
        register_counter!("relaychat_messages_delivered_total", "Total number of payloads written to clients.").unwrap();

    /// Time spent routing one command while holding the registry lock.
    pub static ref COMMAND_LATENCY_SECONDS: Histogram =
        register_histogram!("relaychat_command_latency_seconds", "Latency of command routing in seconds.").unwrap();
}

/// Gathers all registered metrics and encodes them in the Prometheus text format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    encoder
        .encode_to_string(&metric_families)
        .unwrap_or_else(|e| format!("# failed to encode metrics: {e}\n"))
}
