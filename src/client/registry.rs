//! Client registry
//!
//! The single process-wide set of registered clients, shared into every
//! session task behind one lock. Broadcast iterates under that lock, so
//! fan-out throughput is bounded by the slowest recipient's write; a
//! known contention point accepted at this scale.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use log::{debug, warn};
use tokio::sync::Mutex;

use crate::client::Client;

/// Shared handle to the registry; one per server.
pub type SharedRegistry = Arc<Mutex<ClientRegistry>>;

/// Registry of currently active clients, keyed by socket address.
pub struct ClientRegistry {
    clients: HashMap<SocketAddr, Arc<Client>>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self {
            clients: HashMap::new(),
        }
    }

    pub fn shared() -> SharedRegistry {
        Arc::new(Mutex::new(Self::new()))
    }

    /// Inserts a registered client. Display names are not checked for
    /// uniqueness; identity is the socket address.
    pub fn insert(&mut self, client: Arc<Client>) {
        self.clients.insert(client.addr(), client);
    }

    /// Removes a client, returning it if it was still a member. `None`
    /// tells the caller cleanup already happened on another path.
    pub fn remove(&mut self, addr: &SocketAddr) -> Option<Arc<Client>> {
        self.clients.remove(addr)
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    /// Copies all display names so the caller can release the lock before
    /// writing the listing to the network.
    pub fn snapshot_names(&self) -> Vec<String> {
        self.clients
            .values()
            .map(|c| c.name().to_string())
            .collect()
    }

    /// Removes and returns every member; used by server shutdown.
    pub fn drain(&mut self) -> Vec<Arc<Client>> {
        self.clients.drain().map(|(_, c)| c).collect()
    }

    /// Best-effort fan-out of one message to every member except
    /// `exclude`. A single recipient's failure is logged and skipped;
    /// delivery to the rest continues. Not atomic across recipients.
    pub async fn broadcast(&self, exclude: Option<SocketAddr>, text: &str) {
        for (addr, client) in &self.clients {
            if Some(*addr) == exclude {
                continue;
            }
            if let Err(e) = client.send_message(text).await {
                if e.is_closed() {
                    debug!("Skipping closed client {}", client.name());
                } else {
                    warn!("Failed to send to {}: {}", client.name(), e);
                }
            }
        }
    }
}

impl Default for ClientRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::SessionWriter;
    use std::time::Duration;
    use tokio::io::{AsyncBufReadExt, BufReader};
    use tokio::net::{TcpListener, TcpStream};

    async fn tcp_pair() -> (TcpStream, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (accepted, connected) = tokio::join!(listener.accept(), TcpStream::connect(addr));
        (accepted.unwrap().0, connected.unwrap())
    }

    /// Registered client plus the peer end of its connection.
    async fn member(name: &str) -> (Arc<Client>, TcpStream) {
        let (server_side, peer) = tcp_pair().await;
        let addr = server_side.peer_addr().unwrap();
        let (_read, write) = server_side.into_split();
        let client = Arc::new(Client::new(addr, name.to_string(), SessionWriter::new(write)));
        (client, peer)
    }

    async fn read_line(peer: TcpStream) -> String {
        let mut reader = BufReader::new(peer);
        let mut line = String::new();
        reader.read_line(&mut line).await.unwrap();
        line
    }

    #[tokio::test]
    async fn test_member_count_tracks_insert_and_remove() {
        let mut registry = ClientRegistry::new();
        let (alice, _a) = member("alice").await;
        let (bob, _b) = member("bob").await;

        assert!(registry.is_empty());
        registry.insert(Arc::clone(&alice));
        registry.insert(Arc::clone(&bob));
        assert_eq!(registry.len(), 2);

        assert!(registry.remove(&alice.addr()).is_some());
        assert_eq!(registry.len(), 1);

        // Second removal is a guarded no-op.
        assert!(registry.remove(&alice.addr()).is_none());
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn test_snapshot_names_copies_all_members() {
        let mut registry = ClientRegistry::new();
        let (alice, _a) = member("alice").await;
        let (bob, _b) = member("bob").await;
        registry.insert(alice);
        registry.insert(bob);

        let mut names = registry.snapshot_names();
        names.sort();
        assert_eq!(names, vec!["alice".to_string(), "bob".to_string()]);
    }

    #[tokio::test]
    async fn test_broadcast_to_empty_registry_is_a_noop() {
        let registry = ClientRegistry::new();
        registry.broadcast(None, "nobody hears this").await;
    }

    #[tokio::test]
    async fn test_broadcast_excludes_the_sender() {
        let mut registry = ClientRegistry::new();
        let (alice, alice_peer) = member("alice").await;
        let (bob, bob_peer) = member("bob").await;
        registry.insert(Arc::clone(&alice));
        registry.insert(bob);

        registry.broadcast(Some(alice.addr()), "hi from alice").await;

        let line = read_line(bob_peer).await;
        assert_eq!(line, "hi from alice\n");

        // The excluded sender receives nothing.
        let mut reader = BufReader::new(alice_peer);
        let mut line = String::new();
        let got = tokio::time::timeout(Duration::from_millis(100), reader.read_line(&mut line));
        assert!(got.await.is_err());
    }

    #[tokio::test]
    async fn test_broadcast_skips_failed_recipients() {
        let mut registry = ClientRegistry::new();
        let (alice, _a) = member("alice").await;
        let (bob, bob_peer) = member("bob").await;
        alice.close().await;
        registry.insert(alice);
        registry.insert(bob);

        // Delivery to bob proceeds despite alice's closed connection.
        registry.broadcast(None, "still here").await;
        assert_eq!(read_line(bob_peer).await, "still here\n");
    }

    #[tokio::test]
    async fn test_drain_empties_the_registry() {
        let mut registry = ClientRegistry::new();
        let (alice, _a) = member("alice").await;
        let (bob, _b) = member("bob").await;
        registry.insert(alice);
        registry.insert(bob);

        let drained = registry.drain();
        assert_eq!(drained.len(), 2);
        assert!(registry.is_empty());
    }
}
