// src/core/handler/actions/chat.rs

use super::Actor;
use crate::core::handler::notices;
use crate::core::protocol::MAX_PAYLOAD_LEN;
use crate::core::state::RegistryState;
use tracing::debug;

/// Broadcasts a chat line to every other session, unless the sender is muted.
pub fn handle_chat(registry: &mut RegistryState, actor: Actor<'_>, content: &str) {
    if registry.is_muted(actor.username) {
        debug!("Muted user '{}' tried to chat.", actor.username);
        registry.deliver(actor.session_id, notices::you_are_muted());
        return;
    }

    let line = notices::chat_line(actor.username, registry.is_manager(actor.username), content);
    if line.len() > MAX_PAYLOAD_LEN {
        registry.deliver(actor.session_id, notices::too_long());
        return;
    }
    let recipients = registry.broadcast(&line, Some(actor.session_id));
    debug!("Chat from '{}' queued for {} session(s).", actor.username, recipients);
}

/// Sends the sender the current manager list. Muted users get the muted notice,
/// as `view-managers` travels as chat.
pub fn handle_view_managers(registry: &mut RegistryState, actor: Actor<'_>) {
    if registry.is_muted(actor.username) {
        registry.deliver(actor.session_id, notices::you_are_muted());
        return;
    }
    for page in notices::managers_list(registry.managers()) {
        registry.deliver(actor.session_id, page);
    }
}
