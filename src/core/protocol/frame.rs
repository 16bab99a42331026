// src/core/protocol/frame.rs

//! The fixed-field wire frames exchanged between clients and the relay.
//!
//! Client to server:
//! `[2 digits: username len N][N bytes: username][1 byte: code][3 digits: content len M][M bytes]`
//!
//! Server to client:
//! `[3 digits: payload len M][M bytes: payload]`
//!
//! All lengths are zero-padded decimal byte counts.

use crate::core::RelayError;
use crate::core::commands::CommandCode;
use bytes::{BufMut, BytesMut};

/// Width of the username length field.
pub const USERNAME_LEN_DIGITS: usize = 2;
/// Width of the content and payload length fields.
pub const CONTENT_LEN_DIGITS: usize = 3;
/// Largest username a frame can carry.
pub const MAX_USERNAME_LEN: usize = 99;
/// Largest content a client frame can carry.
pub const MAX_CONTENT_LEN: usize = 999;
/// Largest payload a server frame can carry.
pub const MAX_PAYLOAD_LEN: usize = 999;

/// Payload instructing a client that it has been removed by a manager.
pub const KICKED_SENTINEL: &str = "KICKED";

/// One client-to-server frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientFrame {
    pub username: String,
    pub code: CommandCode,
    pub content: String,
}

impl ClientFrame {
    pub fn new(username: impl Into<String>, code: CommandCode, content: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            code,
            content: content.into(),
        }
    }

    /// Appends the wire form of this frame to `dst`.
    ///
    /// Bounds are checked before anything is written, so a rejected frame leaves
    /// `dst` untouched.
    pub fn encode_into(&self, dst: &mut BytesMut) -> Result<(), RelayError> {
        let username = self.username.as_bytes();
        let content = self.content.as_bytes();
        if username.len() > MAX_USERNAME_LEN {
            return Err(RelayError::UsernameTooLong(username.len()));
        }
        if content.len() > MAX_CONTENT_LEN {
            return Err(RelayError::ContentTooLong(content.len()));
        }

        dst.reserve(USERNAME_LEN_DIGITS + username.len() + 1 + CONTENT_LEN_DIGITS + content.len());
        dst.put_slice(format!("{:02}", username.len()).as_bytes());
        dst.put_slice(username);
        dst.put_u8(self.code.as_byte());
        dst.put_slice(format!("{:03}", content.len()).as_bytes());
        dst.put_slice(content);
        Ok(())
    }

    /// Convenience wrapper returning the encoded frame as a byte vector.
    pub fn encode_to_vec(&self) -> Result<Vec<u8>, RelayError> {
        let mut buf = BytesMut::new();
        self.encode_into(&mut buf)?;
        Ok(buf.to_vec())
    }
}

/// The result of decoding one client frame from the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    Frame(ClientFrame),
    /// Bytes that could not be parsed. They have already been discarded.
    Malformed(String),
}

/// Appends a server-to-client frame carrying `payload` to `dst`.
pub fn encode_payload(payload: &str, dst: &mut BytesMut) -> Result<(), RelayError> {
    let bytes = payload.as_bytes();
    if bytes.len() > MAX_PAYLOAD_LEN {
        return Err(RelayError::PayloadTooLong(bytes.len()));
    }
    dst.reserve(CONTENT_LEN_DIGITS + bytes.len());
    dst.put_slice(format!("{:03}", bytes.len()).as_bytes());
    dst.put_slice(bytes);
    Ok(())
}

/// Attempts to parse one client frame from the front of `src`.
///
/// Returns `Err(IncompleteData)` when more bytes are needed, `Err(MalformedFrame)` when
/// the bytes can never form a valid frame, and otherwise the frame together with the
/// number of bytes it occupied.
pub fn parse_client_frame(src: &[u8]) -> Result<(ClientFrame, usize), RelayError> {
    let username_len = read_length(src, 0, USERNAME_LEN_DIGITS)?;

    let code_at = USERNAME_LEN_DIGITS + username_len;
    let content_len_at = code_at + 1;
    let content_len = read_length(src, content_len_at, CONTENT_LEN_DIGITS)?;

    let content_at = content_len_at + CONTENT_LEN_DIGITS;
    let total = content_at + content_len;
    if src.len() < total {
        return Err(RelayError::IncompleteData);
    }

    let username = std::str::from_utf8(&src[USERNAME_LEN_DIGITS..code_at])?;
    let code = CommandCode::from(src[code_at]);
    let content = std::str::from_utf8(&src[content_at..total])?;

    Ok((ClientFrame::new(username, code, content), total))
}

/// Attempts to parse one server payload from the front of `src`.
pub fn parse_payload(src: &[u8]) -> Result<(String, usize), RelayError> {
    let len = read_length(src, 0, CONTENT_LEN_DIGITS)?;
    let total = CONTENT_LEN_DIGITS + len;
    if src.len() < total {
        return Err(RelayError::IncompleteData);
    }
    let payload = std::str::from_utf8(&src[CONTENT_LEN_DIGITS..total])?;
    Ok((payload.to_string(), total))
}

/// Reads a fixed-width decimal length field starting at `at`.
fn read_length(src: &[u8], at: usize, width: usize) -> Result<usize, RelayError> {
    let end = at + width;
    if src.len() < end {
        return Err(RelayError::IncompleteData);
    }
    let digits = &src[at..end];
    if !digits.iter().all(u8::is_ascii_digit) {
        return Err(RelayError::MalformedFrame(format!(
            "length field {:?} is not a {width}-digit decimal",
            String::from_utf8_lossy(digits)
        )));
    }
    Ok(digits
        .iter()
        .fold(0usize, |acc, d| acc * 10 + usize::from(d - b'0')))
}
