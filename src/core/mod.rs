// src/core/mod.rs

//! The central module containing the relay's protocol, state and command handling.

pub mod commands;
pub mod errors;
pub mod handler;
pub mod metrics;
pub mod protocol;
pub mod state;

pub use commands::{Command, CommandCode};
pub use errors::RelayError;
