use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{error, info};
use tokio::net::TcpListener;
use tokio::sync::watch;

use crate::client::{ClientRegistry, SharedRegistry, handle_session};
use crate::config::ServerConfig;
use crate::error::ChatServerError;
use crate::protocol::responses;

/// The chat relay server: owns the listener, the client registry, and
/// the shutdown switch.
pub struct Server {
    registry: SharedRegistry,
    listener: TcpListener,
    local_addr: SocketAddr,
    running: AtomicBool,
    shutdown: watch::Sender<bool>,
    config: Arc<ServerConfig>,
}

impl Server {
    /// Binds the listener. A bind failure is fatal and surfaces to the
    /// caller; nothing else can have started yet.
    pub async fn bind(config: ServerConfig) -> Result<Self, ChatServerError> {
        let addr = config.listen_addr();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| ChatServerError::Bind { addr, source })?;
        let local_addr = listener.local_addr()?;
        info!("Chat relay bound to {}", local_addr);

        let (shutdown, _) = watch::channel(false);

        Ok(Self {
            registry: ClientRegistry::shared(),
            listener,
            local_addr,
            running: AtomicBool::new(true),
            shutdown,
            config: Arc::new(config),
        })
    }

    /// The actually-bound address; differs from the configured one when
    /// binding port 0.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Accept loop. Spawns one session task per connection and runs
    /// until `stop()` flips the shutdown switch. Transient accept errors
    /// are logged and do not stop the loop.
    pub async fn run(&self) {
        let mut shutdown = self.shutdown.subscribe();

        while self.running.load(Ordering::Acquire) {
            tokio::select! {
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, addr)) => {
                        info!("Accepted connection from {}", addr);
                        let registry = Arc::clone(&self.registry);
                        let config = Arc::clone(&self.config);
                        let shutdown = self.shutdown.subscribe();

                        // Spawn a task for each client so the accept loop
                        // doesn't block.
                        tokio::spawn(async move {
                            handle_session(stream, addr, registry, config, shutdown).await;
                        });
                    }
                    Err(e) => {
                        if self.running.load(Ordering::Acquire) {
                            error!("Error accepting connection: {}", e);
                        }
                    }
                },
                _ = shutdown.changed() => break,
            }
        }

        info!("Accept loop stopped");
    }

    /// Immediate shutdown: stop accepting, then notify and force-close
    /// every registered client. In-flight writes may be cut off; late
    /// sends on a closed client fail with `Closed` rather than panic.
    pub async fn stop(&self) {
        self.running.store(false, Ordering::Release);
        let _ = self.shutdown.send(true);

        let clients = self.registry.lock().await.drain();
        info!("Stopping; closing {} client connections", clients.len());

        for client in clients {
            let _ = client.send_message(responses::SHUTDOWN_NOTICE).await;
            client.close().await;
        }
    }

    /// Number of currently registered clients.
    pub async fn client_count(&self) -> usize {
        self.registry.lock().await.len()
    }
}
