// src/core/handler/command_router.rs

//! Routes one decoded client frame to its action.
//!
//! The whole route (username binding, parsing, existence and authority checks, the
//! mutation itself and every resulting enqueue) runs under a single registry lock,
//! so commands arriving concurrently on different connections apply one at a time
//! and every delivery queue sees them in the same order.

use super::actions::{self, Actor};
use super::notices;
use crate::core::metrics;
use crate::core::protocol::ClientFrame;
use crate::core::state::{BindOutcome, BindRejection, ServerState, SessionId};
use crate::core::{Command, RelayError};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info_span};

/// What the connection should do after a frame has been routed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteResponse {
    Continue,
    /// The session is no longer registered (quit, kicked itself, or removed
    /// concurrently) and its loops should stop.
    Disconnect,
}

/// The `Router` receives a decoded frame on behalf of one session.
pub struct Router<'a> {
    state: &'a Arc<ServerState>,
    session_id: SessionId,
}

impl<'a> Router<'a> {
    pub fn new(state: &'a Arc<ServerState>, session_id: SessionId) -> Self {
        Self { state, session_id }
    }

    pub fn route(&self, frame: &ClientFrame) -> RouteResponse {
        // A frame without a username binds nothing and is skipped.
        if frame.username.is_empty() {
            debug!(
                "Session {}: ignoring frame with an empty username.",
                self.session_id
            );
            return self.still_registered();
        }

        let command = Command::try_from(frame);
        let command_name = command.as_ref().map_or("invalid", Command::name);
        let span = info_span!("command", session = self.session_id, command = command_name);
        let _entered = span.enter();
        let start = Instant::now();

        let mut registry = self.state.registry.lock();

        match registry.bind_username(self.session_id, &frame.username) {
            BindOutcome::UnknownSession => return RouteResponse::Disconnect,
            BindOutcome::Rejected(rejection) => {
                let notice = match rejection {
                    BindRejection::IdentityFixed { current } => notices::identity_fixed(&current),
                    BindRejection::NameTaken => notices::name_taken(&frame.username),
                };
                actions::reply(&registry, self.session_id, notice);
                return RouteResponse::Continue;
            }
            BindOutcome::Bound { previous, .. } => {
                debug!(
                    "Session {} bound to '{}' (was {:?}).",
                    self.session_id, frame.username, previous
                );
            }
            BindOutcome::Unchanged => {}
        }

        let actor = Actor {
            session_id: self.session_id,
            username: &frame.username,
        };

        match command {
            Ok(Command::Chat { content }) => actions::chat::handle_chat(&mut registry, actor, &content),
            Ok(Command::ViewManagers) => actions::chat::handle_view_managers(&mut registry, actor),
            Ok(Command::Promote { target }) => {
                actions::moderation::handle_promote(&mut registry, actor, &target)
            }
            Ok(Command::Kick { target }) => {
                actions::moderation::handle_kick(&mut registry, actor, &target)
            }
            Ok(Command::Mute { target }) => {
                actions::moderation::handle_mute(&mut registry, actor, &target)
            }
            Ok(Command::PrivateMessage { recipient, body }) => {
                actions::private::handle_private_message(&mut registry, actor, &recipient, &body)
            }
            Ok(Command::Quit) => actions::session::handle_quit(&mut registry, actor),
            Err(RelayError::InvalidRequest(reason)) => {
                actions::reply(&registry, self.session_id, notices::invalid_request(&reason));
            }
            Err(e) => {
                debug!("Session {}: unroutable frame: {}", self.session_id, e);
            }
        }

        let registered = registry.session(self.session_id).is_some();
        drop(registry);

        self.state.stats.increment_total_commands();
        metrics::COMMANDS_PROCESSED_TOTAL
            .with_label_values(&[command_name])
            .inc();
        metrics::COMMAND_LATENCY_SECONDS.observe(start.elapsed().as_secs_f64());

        if registered {
            RouteResponse::Continue
        } else {
            RouteResponse::Disconnect
        }
    }

    fn still_registered(&self) -> RouteResponse {
        if self.state.registry.lock().session(self.session_id).is_some() {
            RouteResponse::Continue
        } else {
            RouteResponse::Disconnect
        }
    }
}
