//! Session writer
//!
//! Serializes all outbound writes for one connection. Prompts, broadcasts
//! and system notices may be issued from different tasks; the writer lock
//! guarantees no two logical writes interleave on the wire.

use tokio::io::AsyncWriteExt;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::Mutex;

use crate::error::SessionError;

/// Per-connection serialization point for outbound writes
pub struct SessionWriter {
    stream: Mutex<OwnedWriteHalf>,
}

impl SessionWriter {
    pub fn new(stream: OwnedWriteHalf) -> Self {
        Self {
            stream: Mutex::new(stream),
        }
    }

    /// Writes `text` verbatim. A failed write means the connection is gone;
    /// there is no retry.
    pub async fn write(&self, text: &str) -> Result<(), SessionError> {
        let mut stream = self.stream.lock().await;
        stream
            .write_all(text.as_bytes())
            .await
            .map_err(SessionError::Write)?;
        stream.flush().await.map_err(SessionError::Write)
    }

    /// Writes `text` followed by a line terminator so the remote
    /// line-reader can frame it.
    pub async fn write_line(&self, text: &str) -> Result<(), SessionError> {
        let mut stream = self.stream.lock().await;
        stream
            .write_all(text.as_bytes())
            .await
            .map_err(SessionError::Write)?;
        stream.write_all(b"\n").await.map_err(SessionError::Write)?;
        stream.flush().await.map_err(SessionError::Write)
    }

    /// Shuts the write half down. Errors are ignored; an already-closed
    /// stream is a no-op here.
    pub async fn shutdown(&self) {
        let mut stream = self.stream.lock().await;
        let _ = stream.shutdown().await;
    }
}
