// src/connection/handler.rs

//! Defines the `ConnectionHandler` which manages the full lifecycle of a client connection.

use super::guard::ConnectionGuard;
use super::sender::SendLoop;
use crate::core::handler::{RouteResponse, Router};
use crate::core::metrics;
use crate::core::protocol::{Inbound, RelayCodec};
use crate::core::RelayError;
use crate::core::state::{Liveness, ServerState, SessionChannels, SessionId};
use futures::StreamExt;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::net::tcp::OwnedReadHalf;
use tokio::sync::broadcast;
use tokio_util::codec::FramedRead;
use tracing::{debug, error, info, warn};

/// How long a finished receive loop waits for the send loop to drain its queue.
const SEND_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Runs the receive loop of one session and supervises its send loop.
pub struct ConnectionHandler {
    socket: Option<TcpStream>,
    addr: SocketAddr,
    state: Arc<ServerState>,
    session_id: SessionId,
    channels: Option<SessionChannels>,
    global_shutdown_rx: broadcast::Receiver<()>,
}

impl ConnectionHandler {
    /// The session must already be registered under `session_id`; `channels` are
    /// the session-owned ends created alongside its registry entry.
    pub fn new(
        socket: TcpStream,
        addr: SocketAddr,
        state: Arc<ServerState>,
        session_id: SessionId,
        channels: SessionChannels,
        global_shutdown_rx: broadcast::Receiver<()>,
    ) -> Self {
        Self {
            socket: Some(socket),
            addr,
            state,
            session_id,
            channels: Some(channels),
            global_shutdown_rx,
        }
    }

    pub async fn run(&mut self) -> Result<(), RelayError> {
        let _guard = ConnectionGuard::new(self.state.clone(), self.session_id, self.addr);

        let (Some(socket), Some(channels)) = (self.socket.take(), self.channels.take()) else {
            return Err(RelayError::Internal(format!(
                "connection handler for session {} was run twice",
                self.session_id
            )));
        };
        let SessionChannels {
            outbound_rx,
            liveness,
            mut kill_rx,
        } = channels;

        let (read_half, write_half) = socket.into_split();
        let send_loop = SendLoop::new(
            write_half,
            outbound_rx,
            liveness.clone(),
            self.state.clone(),
            self.session_id,
        );
        let mut send_task = tokio::spawn(send_loop.run());

        let mut reader = FramedRead::new(read_half, RelayCodec);
        let result = self.receive_loop(&mut reader, &mut kill_rx, &liveness).await;

        // Closing the session's queue lets the send loop flush what is left and stop.
        if self.state.registry.remove(self.session_id).is_some() {
            debug!("Session {} removed after its receive loop ended.", self.session_id);
        }
        match tokio::time::timeout(SEND_DRAIN_TIMEOUT, &mut send_task).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) if e.is_panic() => {
                error!("Send loop for session {} panicked: {e:?}", self.session_id);
            }
            Ok(Err(_)) => {}
            Err(_) => {
                warn!(
                    "Send loop for {} did not drain within {:?}; aborting it.",
                    self.addr, SEND_DRAIN_TIMEOUT
                );
                send_task.abort();
            }
        }

        info!("Client disconnected: {}", self.addr);
        result
    }

    /// Reads frames until the peer leaves, the session is removed, or the server
    /// shuts down. Malformed frames are dropped without closing the connection.
    /// Read faults other than a peer disconnect are returned to the caller.
    async fn receive_loop(
        &mut self,
        reader: &mut FramedRead<OwnedReadHalf, RelayCodec>,
        kill_rx: &mut broadcast::Receiver<()>,
        liveness: &Liveness,
    ) -> Result<(), RelayError> {
        while liveness.is_alive() {
            tokio::select! {
                biased;
                _ = self.global_shutdown_rx.recv() => {
                    info!("Connection handler for {} received shutdown signal.", self.addr);
                    break;
                }
                _ = kill_rx.recv() => {
                    debug!("Session {} was removed, stopping its receive loop.", self.session_id);
                    break;
                }
                result = reader.next() => {
                    match result {
                        Some(Ok(Inbound::Frame(frame))) => {
                            debug!("Session {}: received frame: {:?}", self.session_id, frame);
                            let router = Router::new(&self.state, self.session_id);
                            if router.route(&frame) == RouteResponse::Disconnect {
                                break;
                            }
                        }
                        Some(Ok(Inbound::Malformed(reason))) => {
                            self.state.stats.increment_malformed_frames();
                            metrics::MALFORMED_FRAMES_TOTAL.inc();
                            debug!("Session {}: dropped malformed frame: {}", self.session_id, reason);
                        }
                        Some(Err(e)) if e.is_normal_disconnect() => {
                            debug!("Connection from {} closed by peer: {}", self.addr, e);
                            break;
                        }
                        Some(Err(e)) => return Err(e),
                        None => {
                            debug!("Connection from {} closed by peer.", self.addr);
                            break;
                        }
                    }
                }
            }
        }
        Ok(())
    }
}
