// src/connection/mod.rs

//! Manages the lifecycle of a single client connection: the receive loop that
//! decodes and routes frames, and the send loop that drains the session's
//! delivery queue.

mod guard;
mod handler;
mod sender;

pub use guard::ConnectionGuard;
pub use handler::ConnectionHandler;
pub use sender::SendLoop;
