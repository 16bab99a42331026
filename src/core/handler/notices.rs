// src/core/handler/notices.rs

//! The text of every line the relay sends to clients.

use crate::core::protocol::MAX_PAYLOAD_LEN;
use chrono::Local;

/// The server's local time as `HH:MM`.
pub fn timestamp() -> String {
    Local::now().format("%H:%M").to_string()
}

/// The prefix shown in front of a manager's name in chat.
pub const MANAGER_MARKER: char = '@';

pub fn chat_line(sender: &str, is_manager: bool, content: &str) -> String {
    if is_manager {
        format!("{} {MANAGER_MARKER}{sender}: {content}", timestamp())
    } else {
        format!("{} {sender}: {content}", timestamp())
    }
}

pub fn private_line(sender: &str, body: &str) -> String {
    format!("{} !{sender}: {body}", timestamp())
}

/// The manager list, one name per line, split into as many payloads as it takes
/// to keep each within a server frame. The header opens the first payload.
pub fn managers_list<'a>(managers: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut pages = Vec::new();
    let mut page = String::from("Managers List\n-------------\n");
    for manager in managers {
        if !page.is_empty() && page.len() + manager.len() + 1 > MAX_PAYLOAD_LEN {
            pages.push(std::mem::take(&mut page));
        }
        page.push_str(manager);
        page.push('\n');
    }
    if !page.is_empty() {
        pages.push(page);
    }
    pages
}

pub fn you_are_muted() -> String {
    format!("{} You are muted and cannot send messages.", timestamp())
}

pub fn user_does_not_exist(name: &str) -> String {
    format!("{} User {name} doesn't exist.", timestamp())
}

pub fn recipient_not_found(name: &str) -> String {
    format!("{} User {name} does not exist.", timestamp())
}

/// `verb` is the bare action: "promote", "kick" or "mute".
pub fn managers_only(verb: &str) -> String {
    format!("{} Only managers can {verb} other users!", timestamp())
}

pub fn promoted(name: &str) -> String {
    format!("{} {name} has been promoted to manager.", timestamp())
}

pub fn already_manager(name: &str) -> String {
    format!("{} {MANAGER_MARKER}{name} is already a manager.", timestamp())
}

pub fn kicked(name: &str) -> String {
    format!("{} {name} has been kicked from the chat!", timestamp())
}

pub fn muted(name: &str) -> String {
    format!("{} {name} has been muted.", timestamp())
}

pub fn muted_by(manager: &str) -> String {
    format!("{} You have been muted by {manager}.", timestamp())
}

pub fn already_muted(name: &str) -> String {
    format!("{} {name} is already muted.", timestamp())
}

pub fn left(name: &str) -> String {
    format!("{} {name} has left the chat!", timestamp())
}

pub fn too_long() -> String {
    format!("{} Message too long to relay.", timestamp())
}

pub fn invalid_request(reason: &str) -> String {
    format!("{} {reason}", timestamp())
}

pub fn identity_fixed(current: &str) -> String {
    format!("{} You are already connected as {current}.", timestamp())
}

pub fn name_taken(name: &str) -> String {
    format!("{} Username {name} is already taken.", timestamp())
}
