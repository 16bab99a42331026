// src/core/commands/mod.rs

//! Command codes carried by client frames and the parsed `Command` they map to.

use crate::core::RelayError;
use crate::core::protocol::ClientFrame;

/// Chat content that asks for the manager list instead of being broadcast.
pub const VIEW_MANAGERS: &str = "view-managers";

/// The single-byte command code of a client frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandCode {
    Chat,
    Promote,
    Kick,
    Mute,
    PrivateMessage,
    Quit,
    /// Any other byte. Routed like chat.
    Unknown(u8),
}

impl CommandCode {
    /// The byte used for this code on the wire.
    pub fn as_byte(self) -> u8 {
        match self {
            CommandCode::Chat => b'1',
            CommandCode::Promote => b'2',
            CommandCode::Kick => b'3',
            CommandCode::Mute => b'4',
            CommandCode::PrivateMessage => b'5',
            CommandCode::Quit => b'6',
            CommandCode::Unknown(b) => b,
        }
    }
}

impl From<u8> for CommandCode {
    fn from(b: u8) -> Self {
        match b {
            b'1' => CommandCode::Chat,
            b'2' => CommandCode::Promote,
            b'3' => CommandCode::Kick,
            b'4' => CommandCode::Mute,
            b'5' => CommandCode::PrivateMessage,
            b'6' => CommandCode::Quit,
            other => CommandCode::Unknown(other),
        }
    }
}

/// A decoded client request, ready for the router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Chat { content: String },
    ViewManagers,
    Promote { target: String },
    Kick { target: String },
    Mute { target: String },
    PrivateMessage { recipient: String, body: String },
    Quit,
}

impl Command {
    /// A short, static name used for logging and metrics labels.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Chat { .. } => "chat",
            Command::ViewManagers => "view-managers",
            Command::Promote { .. } => "promote",
            Command::Kick { .. } => "kick",
            Command::Mute { .. } => "mute",
            Command::PrivateMessage { .. } => "msg",
            Command::Quit => "quit",
        }
    }
}

impl TryFrom<&ClientFrame> for Command {
    type Error = RelayError;

    fn try_from(frame: &ClientFrame) -> Result<Self, Self::Error> {
        let content = &frame.content;
        let command = match frame.code {
            CommandCode::Promote => Command::Promote {
                target: content.trim().to_string(),
            },
            CommandCode::Kick => Command::Kick {
                target: content.trim().to_string(),
            },
            CommandCode::Mute => Command::Mute {
                target: content.trim().to_string(),
            },
            CommandCode::PrivateMessage => {
                let (recipient, body) = split_private_message(content)?;
                Command::PrivateMessage { recipient, body }
            }
            CommandCode::Quit => Command::Quit,
            CommandCode::Chat | CommandCode::Unknown(_) => {
                if content.trim() == VIEW_MANAGERS {
                    Command::ViewManagers
                } else {
                    Command::Chat {
                        content: content.clone(),
                    }
                }
            }
        };
        Ok(command)
    }
}

/// Splits `"<recipient> <message>"` at the first run of whitespace.
fn split_private_message(content: &str) -> Result<(String, String), RelayError> {
    let usage = || RelayError::InvalidRequest("usage: /msg <username> <message>".to_string());
    let (recipient, rest) = content
        .trim_start()
        .split_once(char::is_whitespace)
        .ok_or_else(usage)?;
    let body = rest.trim_start();
    if recipient.is_empty() || body.is_empty() {
        return Err(usage());
    }
    Ok((recipient.to_string(), body.to_string()))
}
