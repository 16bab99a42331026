// src/core/handler/mod.rs

//! The command dispatcher: routing, actions, and the text of client notices.

pub mod actions;
pub mod command_router;
pub mod notices;

pub use command_router::{RouteResponse, Router};
