// src/config.rs

//! Manages server configuration: loading, defaults, and validation.

use crate::core::protocol::MAX_USERNAME_LEN;
use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::warn;

/// How the relay treats the username a client claims in each frame.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum IdentityPolicy {
    /// Every frame rebinds the session to the name it carries; the last writer of a
    /// name wins.
    #[default]
    Rebind,
    /// The first name a session sends is final. Frames carrying another name, and
    /// names already held by a live session, are refused.
    Fixed,
}

impl fmt::Display for IdentityPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentityPolicy::Rebind => f.write_str("rebind"),
            IdentityPolicy::Fixed => f.write_str("fixed"),
        }
    }
}

/// Configuration for the Prometheus metrics exporter.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MetricsConfig {
    /// If true, an HTTP server will be started to expose Prometheus metrics.
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_metrics_port")]
    pub port: u16,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            port: default_metrics_port(),
        }
    }
}

fn default_metrics_port() -> u16 {
    9878
}

/// A raw representation of the config file before validation.
#[derive(Deserialize)]
struct RawConfig {
    #[serde(default = "default_host")]
    host: String,
    #[serde(default = "default_port")]
    port: u16,
    #[serde(default = "default_log_level")]
    log_level: String,
    #[serde(default = "default_max_clients")]
    max_clients: usize,
    #[serde(default = "default_managers")]
    managers: Vec<String>,
    #[serde(default = "default_send_poll_interval_ms")]
    send_poll_interval_ms: u64,
    #[serde(default)]
    identity: IdentityPolicy,
    #[serde(default)]
    metrics: MetricsConfig,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    54321
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_max_clients() -> usize {
    1000
}
fn default_managers() -> Vec<String> {
    vec!["admin1".into(), "admin2".into(), "admin3".into()]
}
fn default_send_poll_interval_ms() -> u64 {
    1000
}

/// The final, validated server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    /// Connections accepted beyond this many live sessions are closed immediately.
    pub max_clients: usize,
    /// Bootstrap manager usernames. The manager set only grows from here.
    pub managers: Vec<String>,
    /// Upper bound on how long a send loop waits before re-checking liveness.
    pub send_poll_interval_ms: u64,
    pub identity: IdentityPolicy,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            max_clients: default_max_clients(),
            managers: default_managers(),
            send_poll_interval_ms: default_send_poll_interval_ms(),
            identity: IdentityPolicy::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl Config {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file at '{}'", path.display()))?;
        Self::from_toml_str(&contents)
            .with_context(|| format!("Invalid configuration in '{}'", path.display()))
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let raw: RawConfig = toml::from_str(contents).context("Failed to parse TOML")?;

        let config = Config {
            host: raw.host,
            port: raw.port,
            log_level: raw.log_level,
            max_clients: raw.max_clients,
            managers: raw.managers,
            send_poll_interval_ms: raw.send_poll_interval_ms,
            identity: raw.identity,
            metrics: raw.metrics,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn send_poll_interval(&self) -> Duration {
        Duration::from_millis(self.send_poll_interval_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(anyhow!("port cannot be 0"));
        }
        if self.host.trim().is_empty() {
            return Err(anyhow!("host cannot be empty"));
        }
        if self.max_clients == 0 {
            return Err(anyhow!("max_clients cannot be 0"));
        }
        if self.send_poll_interval_ms == 0 {
            return Err(anyhow!("send_poll_interval_ms cannot be 0"));
        }
        for name in &self.managers {
            if name.is_empty() || name.len() > MAX_USERNAME_LEN {
                return Err(anyhow!(
                    "manager name '{name}' must be 1 to {MAX_USERNAME_LEN} bytes long"
                ));
            }
        }
        if self.managers.is_empty() {
            warn!("No bootstrap managers configured. Nobody will be able to promote, kick or mute.");
        }
        if self.metrics.enabled && self.metrics.port == self.port {
            return Err(anyhow!("metrics.port cannot be the same as port"));
        }
        Ok(())
    }
}
