// src/connection/sender.rs

//! The send loop: drains one session's delivery queue onto its socket.

use crate::core::RelayError;
use crate::core::metrics;
use crate::core::protocol::RelayCodec;
use crate::core::state::{DeliveryReceiver, Liveness, ServerState, SessionId};
use futures::SinkExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWrite;
use tokio_util::codec::FramedWrite;
use tracing::{debug, warn};

/// Owns the write half of a connection and the consumer end of its delivery queue.
pub struct SendLoop<W: AsyncWrite + Unpin> {
    sink: FramedWrite<W, RelayCodec>,
    queue: DeliveryReceiver,
    liveness: Liveness,
    state: Arc<ServerState>,
    session_id: SessionId,
    poll_interval: Duration,
}

impl<W: AsyncWrite + Unpin> SendLoop<W> {
    pub fn new(
        writer: W,
        queue: DeliveryReceiver,
        liveness: Liveness,
        state: Arc<ServerState>,
        session_id: SessionId,
    ) -> Self {
        let poll_interval = state.config.send_poll_interval();
        Self {
            sink: FramedWrite::new(writer, RelayCodec),
            queue,
            liveness,
            state,
            session_id,
            poll_interval,
        }
    }

    /// Runs until the queue is closed and drained, the session is no longer alive,
    /// or a write fails. A failed write removes the session, which stops the
    /// receive loop as well.
    pub async fn run(mut self) {
        loop {
            match tokio::time::timeout(self.poll_interval, self.queue.recv()).await {
                Ok(Some(message)) => match self.sink.send(message).await {
                    Ok(()) => {
                        self.state.stats.increment_messages_delivered();
                        metrics::MESSAGES_DELIVERED_TOTAL.inc();
                    }
                    Err(RelayError::PayloadTooLong(len)) => {
                        warn!(
                            "Session {}: dropping a {}-byte payload that does not fit a frame.",
                            self.session_id, len
                        );
                    }
                    Err(e) => {
                        if e.is_normal_disconnect() {
                            debug!("Session {}: peer gone while sending: {}", self.session_id, e);
                        } else {
                            warn!("Session {}: write failed: {}", self.session_id, e);
                        }
                        self.state.registry.remove(self.session_id);
                        return;
                    }
                },
                // Every sender is gone: the session was removed and the queue is drained.
                Ok(None) => break,
                Err(_) if !self.liveness.is_alive() => break,
                Err(_) => {}
            }
        }

        if let Err(e) = self.sink.close().await {
            debug!("Session {}: error closing writer: {}", self.session_id, e);
        }
        debug!("Session {}: send loop finished.", self.session_id);
    }
}
