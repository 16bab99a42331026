// src/core/state/mod.rs

//! Defines the central `ServerState` struct and the session registry it owns.

mod client;
mod core;
pub mod registry;
mod stats;

pub use client::*;
pub use core::ServerState;
pub use registry::{
    BindOutcome, BindRejection, MuteOutcome, PromoteOutcome, Registry, RegistryState,
    RemovedSession,
};
pub use stats::StatsState;
