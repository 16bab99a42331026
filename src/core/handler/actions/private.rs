// src/core/handler/actions/private.rs

use super::{Actor, reply};
use crate::core::handler::notices;
use crate::core::protocol::MAX_PAYLOAD_LEN;
use crate::core::state::RegistryState;

/// Queues a private line for `recipient` only. Muting does not apply here.
pub fn handle_private_message(
    registry: &mut RegistryState,
    actor: Actor<'_>,
    recipient: &str,
    body: &str,
) {
    let Some(recipient_id) = registry.lookup_by_username(recipient).map(|entry| entry.id) else {
        reply(registry, actor.session_id, notices::recipient_not_found(recipient));
        return;
    };

    let line = notices::private_line(actor.username, body);
    if line.len() > MAX_PAYLOAD_LEN {
        registry.deliver(actor.session_id, notices::too_long());
        return;
    }
    registry.deliver(recipient_id, line);
}
