// src/core/state/client.rs

//! Contains state definitions related to client sessions.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tokio::sync::{broadcast, mpsc};

pub type SessionId = u64;
pub type ShutdownSender = broadcast::Sender<()>;
pub type DeliverySender = mpsc::UnboundedSender<String>;
pub type DeliveryReceiver = mpsc::UnboundedReceiver<String>;

/// The liveness flag shared by a session's two loops and the registry.
///
/// Killing is one-shot: the first `kill` flips the flag and fires the kill signal,
/// later calls do nothing.
#[derive(Debug, Clone)]
pub struct Liveness {
    alive: Arc<AtomicBool>,
    kill_tx: ShutdownSender,
}

impl Default for Liveness {
    fn default() -> Self {
        Self::new()
    }
}

impl Liveness {
    pub fn new() -> Self {
        let (kill_tx, _) = broadcast::channel(1);
        Self {
            alive: Arc::new(AtomicBool::new(true)),
            kill_tx,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    /// Marks the session as dead. Returns `true` only for the call that did it.
    pub fn kill(&self) -> bool {
        if self.alive.swap(false, Ordering::AcqRel) {
            let _ = self.kill_tx.send(());
            true
        } else {
            false
        }
    }

    /// A receiver that fires once the session is killed.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.kill_tx.subscribe()
    }
}

/// A connected session as seen by the registry.
#[derive(Debug)]
pub struct SessionEntry {
    pub id: SessionId,
    pub addr: SocketAddr,
    /// Unset until the first frame carrying a username arrives.
    pub username: Option<String>,
    pub created: Instant,
    outbound: DeliverySender,
    liveness: Liveness,
}

/// The session-owned ends of a freshly created `SessionEntry`.
#[derive(Debug)]
pub struct SessionChannels {
    /// The consumer side of the session's delivery queue.
    pub outbound_rx: DeliveryReceiver,
    pub liveness: Liveness,
    /// Subscribed before the entry is registered, so no kill can be missed.
    pub kill_rx: broadcast::Receiver<()>,
}

impl SessionEntry {
    pub fn new(id: SessionId, addr: SocketAddr) -> (Self, SessionChannels) {
        let (outbound, outbound_rx) = mpsc::unbounded_channel();
        let liveness = Liveness::new();
        let kill_rx = liveness.subscribe();
        let entry = Self {
            id,
            addr,
            username: None,
            created: Instant::now(),
            outbound,
            liveness: liveness.clone(),
        };
        let channels = SessionChannels {
            outbound_rx,
            liveness,
            kill_rx,
        };
        (entry, channels)
    }

    /// Pushes a message onto this session's delivery queue.
    pub fn deliver(&self, message: String) -> bool {
        self.outbound.send(message).is_ok()
    }

    pub fn liveness(&self) -> &Liveness {
        &self.liveness
    }
}
