// src/core/handler/actions/session.rs

use super::Actor;
use crate::core::handler::notices;
use crate::core::state::RegistryState;
use tracing::info;

/// Announces the departure to everyone, the leaver included, then removes the session.
pub fn handle_quit(registry: &mut RegistryState, actor: Actor<'_>) {
    // The leaver's own copy is queued before `remove` closes its queue, so its send
    // loop still writes it before closing the connection.
    registry.broadcast(&notices::left(actor.username), None);
    if let Some(removed) = registry.remove(actor.session_id) {
        info!("'{}' ({}) left the chat.", actor.username, removed.addr);
    }
}
