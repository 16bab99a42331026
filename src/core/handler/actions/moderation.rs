// src/core/handler/actions/moderation.rs

//! Manager-only commands: promote, kick and mute.

use super::{Actor, reply};
use crate::core::handler::notices;
use crate::core::protocol::KICKED_SENTINEL;
use crate::core::state::{MuteOutcome, PromoteOutcome, RegistryState};
use tracing::info;

/// Checks that `target` is connected and that the actor is a manager, in that order.
/// On failure the actor is told why and `false` is returned.
fn authorize(registry: &RegistryState, actor: Actor<'_>, target: &str, verb: &str) -> bool {
    if !registry.exists(target) {
        reply(registry, actor.session_id, notices::user_does_not_exist(target));
        return false;
    }
    if !registry.is_manager(actor.username) {
        reply(registry, actor.session_id, notices::managers_only(verb));
        return false;
    }
    true
}

pub fn handle_promote(registry: &mut RegistryState, actor: Actor<'_>, target: &str) {
    if !authorize(registry, actor, target, "promote") {
        return;
    }
    match registry.promote(target) {
        PromoteOutcome::Promoted => {
            info!("'{}' promoted '{}' to manager.", actor.username, target);
            registry.broadcast(&notices::promoted(target), None);
        }
        PromoteOutcome::AlreadyManager => {
            reply(registry, actor.session_id, notices::already_manager(target));
        }
    }
}

/// Sends the target `KICKED`, removes its session and tells everyone left.
/// The target's send loop still drains `KICKED` after its queue is closed.
pub fn handle_kick(registry: &mut RegistryState, actor: Actor<'_>, target: &str) {
    if !authorize(registry, actor, target, "kick") {
        return;
    }
    let Some(target_id) = registry.lookup_by_username(target).map(|entry| entry.id) else {
        return;
    };

    registry.deliver(target_id, KICKED_SENTINEL);
    if let Some(removed) = registry.remove(target_id) {
        info!(
            "'{}' kicked '{}' ({}).",
            actor.username, target, removed.addr
        );
    }
    registry.broadcast(&notices::kicked(target), None);
}

pub fn handle_mute(registry: &mut RegistryState, actor: Actor<'_>, target: &str) {
    if !authorize(registry, actor, target, "mute") {
        return;
    }
    match registry.mute(target) {
        MuteOutcome::Muted => {
            info!("'{}' muted '{}'.", actor.username, target);
            reply(registry, actor.session_id, notices::muted(target));
            if let Some(target_id) = registry.lookup_by_username(target).map(|entry| entry.id) {
                registry.deliver(target_id, notices::muted_by(actor.username));
            }
        }
        MuteOutcome::AlreadyMuted => {
            reply(registry, actor.session_id, notices::already_muted(target));
        }
    }
}
