//! Error types
//!
//! Defines domain-specific error types for each module of the chat relay.

use std::fmt;
use std::io;

/// Per-session errors
///
/// All of these terminate a single session, never the process.
#[derive(Debug)]
pub enum SessionError {
    /// Reading a line from the connection failed
    Read(io::Error),
    /// Writing to the connection failed
    Write(io::Error),
    /// The client has already been torn down
    Closed,
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Read(e) => write!(f, "Read error: {}", e),
            SessionError::Write(e) => write!(f, "Write error: {}", e),
            SessionError::Closed => write!(f, "Connection closed"),
        }
    }
}

impl std::error::Error for SessionError {}

impl SessionError {
    /// Whether this error is the expected already-closed terminal state
    pub fn is_closed(&self) -> bool {
        matches!(self, SessionError::Closed)
    }
}

/// General chat relay error that encompasses all error types
#[derive(Debug)]
pub enum ChatServerError {
    /// Binding the listener failed; fatal at startup
    Bind { addr: String, source: io::Error },
    Session(SessionError),
    Config(config::ConfigError),
    Io(io::Error),
}

impl fmt::Display for ChatServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatServerError::Bind { addr, source } => {
                write!(f, "Failed to bind to {}: {}", addr, source)
            }
            ChatServerError::Session(e) => write!(f, "Session error: {}", e),
            ChatServerError::Config(e) => write!(f, "Configuration error: {}", e),
            ChatServerError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for ChatServerError {}

impl From<SessionError> for ChatServerError {
    fn from(error: SessionError) -> Self {
        ChatServerError::Session(error)
    }
}

impl From<config::ConfigError> for ChatServerError {
    fn from(error: config::ConfigError) -> Self {
        ChatServerError::Config(error)
    }
}

impl From<io::Error> for ChatServerError {
    fn from(error: io::Error) -> Self {
        ChatServerError::Io(error)
    }
}
