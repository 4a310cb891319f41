//! Module `client`
//!
//! Defines the `Client` struct: the identity and liveness state of one
//! registered session. Shared as `Arc<Client>` between the owning session
//! task and the registry; the registry holds membership, not lifetime.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

use crate::client::SessionWriter;
use crate::error::SessionError;

/// Represents the state of a connected chat client.
pub struct Client {
    addr: SocketAddr,
    name: String,
    writer: SessionWriter,
    closed: AtomicBool,
    last_message: Mutex<Option<Instant>>,
}

impl Client {
    /// Builds a registered client. The display name is fixed here and
    /// never changes afterwards; it is not checked for uniqueness or
    /// non-emptiness.
    pub fn new(addr: SocketAddr, name: String, writer: SessionWriter) -> Self {
        Self {
            addr,
            name,
            writer,
            closed: AtomicBool::new(false),
            last_message: Mutex::new(None),
        }
    }

    /// Identity key within the registry.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Sends one message line to this client. Once the client is closed
    /// this fails with `SessionError::Closed` without touching the stream.
    pub async fn send_message(&self, text: &str) -> Result<(), SessionError> {
        if self.is_closed() {
            return Err(SessionError::Closed);
        }
        self.writer.write_line(text).await
    }

    /// Tears the connection down. Idempotent: concurrent callers race on
    /// the `closed` swap and only the winner shuts the stream down.
    pub async fn close(&self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            self.writer.shutdown().await;
        }
    }

    /// Whether the gap since the last accepted chat message is under
    /// `window`. False when no message has been accepted yet.
    pub async fn within_rate_limit(&self, window: Duration) -> bool {
        let last = self.last_message.lock().await;
        match *last {
            Some(at) => at.elapsed() < window,
            None => false,
        }
    }

    /// Records the acceptance time of a chat message.
    pub async fn mark_message(&self) {
        let mut last = self.last_message.lock().await;
        *last = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tokio::io::AsyncReadExt;
    use tokio::net::{TcpListener, TcpStream};

    async fn tcp_pair() -> (TcpStream, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (accepted, connected) = tokio::join!(listener.accept(), TcpStream::connect(addr));
        (accepted.unwrap().0, connected.unwrap())
    }

    fn make_client(stream: TcpStream, name: &str) -> Client {
        let addr = stream.peer_addr().unwrap();
        let (_read, write) = stream.into_split();
        Client::new(addr, name.to_string(), SessionWriter::new(write))
    }

    #[tokio::test]
    async fn test_send_message_reaches_the_peer() {
        let (server_side, mut peer) = tcp_pair().await;
        let client = make_client(server_side, "alice");

        client.send_message("hello").await.unwrap();

        let mut buf = vec![0u8; 64];
        let n = peer.read(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"hello\n");
    }

    #[tokio::test]
    async fn test_double_close_is_idempotent() {
        let (server_side, mut peer) = tcp_pair().await;
        let client = Arc::new(make_client(server_side, "alice"));

        let (a, b) = (Arc::clone(&client), Arc::clone(&client));
        tokio::join!(a.close(), b.close());

        assert!(client.is_closed());
        assert!(matches!(
            client.send_message("late").await,
            Err(SessionError::Closed)
        ));

        // The peer observes exactly one orderly shutdown.
        let mut buf = vec![0u8; 8];
        assert_eq!(peer.read(&mut buf).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_rate_limit_window() {
        let (server_side, _peer) = tcp_pair().await;
        let client = make_client(server_side, "alice");

        // No accepted message yet: never throttled.
        assert!(!client.within_rate_limit(Duration::from_secs(1)).await);

        client.mark_message().await;
        assert!(client.within_rate_limit(Duration::from_secs(60)).await);
        assert!(!client.within_rate_limit(Duration::from_millis(0)).await);
    }
}
