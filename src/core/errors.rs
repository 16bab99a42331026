// src/core/errors.rs

//! Defines the primary error type for the relay.

use std::sync::Arc;
use thiserror::Error;

/// The main error enum, representing all failures inside the relay.
/// User-facing failures (not a manager, unknown user, ...) are never errors; they
/// are delivered to the acting client as plain-text notices.
#[derive(Error, Debug)]
pub enum RelayError {
    #[error("IO Error: {0}")]
    Io(Arc<std::io::Error>),

    #[error("Incomplete data in stream")]
    IncompleteData,

    #[error("Malformed frame: {0}")]
    MalformedFrame(String),

    #[error("Username is {0} bytes long, the limit is 99")]
    UsernameTooLong(usize),

    #[error("Content is {0} bytes long, the limit is 999")]
    ContentTooLong(usize),

    #[error("Payload is {0} bytes long, the limit is 999")]
    PayloadTooLong(usize),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Internal Server Error: {0}")]
    Internal(String),
}

// `std::io::Error` is not cloneable, so it is shared behind an Arc.
impl Clone for RelayError {
    fn clone(&self) -> Self {
        match self {
            RelayError::Io(e) => RelayError::Io(Arc::clone(e)),
            RelayError::IncompleteData => RelayError::IncompleteData,
            RelayError::MalformedFrame(s) => RelayError::MalformedFrame(s.clone()),
            RelayError::UsernameTooLong(n) => RelayError::UsernameTooLong(*n),
            RelayError::ContentTooLong(n) => RelayError::ContentTooLong(*n),
            RelayError::PayloadTooLong(n) => RelayError::PayloadTooLong(*n),
            RelayError::InvalidRequest(s) => RelayError::InvalidRequest(s.clone()),
            RelayError::Internal(s) => RelayError::Internal(s.clone()),
        }
    }
}

impl PartialEq for RelayError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (RelayError::Io(e1), RelayError::Io(e2)) => e1.kind() == e2.kind(),
            (RelayError::MalformedFrame(s1), RelayError::MalformedFrame(s2)) => s1 == s2,
            (RelayError::UsernameTooLong(n1), RelayError::UsernameTooLong(n2)) => n1 == n2,
            (RelayError::ContentTooLong(n1), RelayError::ContentTooLong(n2)) => n1 == n2,
            (RelayError::PayloadTooLong(n1), RelayError::PayloadTooLong(n2)) => n1 == n2,
            (RelayError::InvalidRequest(s1), RelayError::InvalidRequest(s2)) => s1 == s2,
            (RelayError::Internal(s1), RelayError::Internal(s2)) => s1 == s2,
            _ => core::mem::discriminant(self) == core::mem::discriminant(other),
        }
    }
}

impl RelayError {
    /// True for the errors that simply mean the peer went away.
    pub fn is_normal_disconnect(&self) -> bool {
        matches!(self, RelayError::Io(e) if matches!(
            e.kind(),
            std::io::ErrorKind::ConnectionReset
                | std::io::ErrorKind::BrokenPipe
                | std::io::ErrorKind::UnexpectedEof
                | std::io::ErrorKind::ConnectionAborted
        ))
    }
}

impl From<std::io::Error> for RelayError {
    fn from(e: std::io::Error) -> Self {
        RelayError::Io(Arc::new(e))
    }
}

impl From<std::str::Utf8Error> for RelayError {
    fn from(e: std::str::Utf8Error) -> Self {
        RelayError::MalformedFrame(format!("invalid UTF-8: {e}"))
    }
}
