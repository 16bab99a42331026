// src/core/handler/actions/mod.rs

//! Command actions. Each one runs with the registry lock already held by the router.

pub mod chat;
pub mod moderation;
pub mod private;
pub mod session;

use super::notices;
use crate::core::protocol::MAX_PAYLOAD_LEN;
use crate::core::state::{RegistryState, SessionId};
use tracing::debug;

/// Who issued the command being executed.
#[derive(Debug, Clone, Copy)]
pub struct Actor<'a> {
    pub session_id: SessionId,
    /// The username claimed by the frame, already bound to `session_id`.
    pub username: &'a str,
}

/// Queues a notice for one session. A line too long for a server frame is
/// replaced by the too-long notice.
pub fn reply(registry: &RegistryState, session_id: SessionId, line: String) -> bool {
    if line.len() > MAX_PAYLOAD_LEN {
        debug!(
            "Session {}: a {}-byte notice does not fit a frame.",
            session_id,
            line.len()
        );
        return registry.deliver(session_id, notices::too_long());
    }
    registry.deliver(session_id, line)
}
