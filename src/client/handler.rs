//! Session handler
//!
//! Drives one connection through its whole life: registration prompt,
//! active chat loop with command dispatch, and teardown. One task per
//! connection; the registry is the only state shared between tasks.

use std::sync::Arc;
use std::time::Duration;

use log::{info, warn};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::OwnedReadHalf;
use tokio::sync::watch;

use crate::client::{Client, SessionWriter, SharedRegistry};
use crate::config::ServerConfig;
use crate::error::SessionError;
use crate::protocol::responses;
use crate::protocol::{Command, parse_command};

/// Handles one client session from accept to disconnect.
///
/// - Prompts for a display name, then registers the client.
/// - Reads lines and dispatches them until EOF, I/O error, `/quit`, or
///   server shutdown.
/// - Always leaves the registry consistent on the way out.
pub async fn handle_session(
    stream: TcpStream,
    addr: std::net::SocketAddr,
    registry: SharedRegistry,
    config: Arc<ServerConfig>,
    mut shutdown: watch::Receiver<bool>,
) {
    let (read_half, write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);
    let writer = SessionWriter::new(write_half);

    // Registration: one prompt, one line. An I/O failure here aborts
    // without ever touching the registry.
    if writer.write(responses::NAME_PROMPT).await.is_err() {
        info!("Client {} dropped before the name prompt", addr);
        return;
    }
    let name = match next_line(&mut reader, &mut shutdown).await {
        Ok(Some(name)) => name,
        Ok(None) => {
            info!("Client {} disconnected before registering", addr);
            return;
        }
        Err(e) => {
            warn!("Failed to read name from {}: {}", addr, e);
            return;
        }
    };

    let client = Arc::new(Client::new(addr, name, writer));

    let active = {
        let mut clients = registry.lock().await;
        clients.insert(Arc::clone(&client));
        clients
            .broadcast(Some(addr), &responses::join_notice(client.name()))
            .await;
        clients.len()
    };
    info!(
        "{} registered from {} ({} active connections)",
        client.name(),
        addr,
        active
    );

    if client
        .send_message(&responses::welcome(client.name()))
        .await
        .is_err()
    {
        teardown(&client, &registry).await;
        return;
    }

    // Active loop.
    loop {
        let line = match next_line(&mut reader, &mut shutdown).await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                warn!("Read error from {} ({}): {}", client.name(), addr, e);
                break;
            }
        };

        if line.is_empty() {
            continue;
        }

        if line.len() > config.max_line_length {
            if client
                .send_message(&responses::line_too_long(config.max_line_length))
                .await
                .is_err()
            {
                break;
            }
            continue;
        }

        match parse_command(&line) {
            Command::Quit => {
                let _ = client.send_message(responses::GOODBYE).await;
                break;
            }
            Command::Help => {
                if client.send_message(responses::HELP_TEXT).await.is_err() {
                    break;
                }
            }
            Command::Who => {
                // Snapshot under the lock, write after releasing it.
                let names = registry.lock().await.snapshot_names();
                if client
                    .send_message(&responses::who_listing(&names))
                    .await
                    .is_err()
                {
                    break;
                }
            }
            Command::Unknown(_) => {
                if client
                    .send_message(responses::UNKNOWN_COMMAND)
                    .await
                    .is_err()
                {
                    break;
                }
            }
            Command::Chat(text) => {
                let chat = responses::chat_line(client.name(), &text);
                registry.lock().await.broadcast(Some(addr), &chat).await;

                // The message above is already out; the warning only
                // tells the sender to slow down. A warned message does
                // not advance the window.
                let window = Duration::from_millis(config.rate_limit_ms);
                if client.within_rate_limit(window).await {
                    let _ = client.send_message(responses::RATE_LIMIT_WARNING).await;
                } else {
                    client.mark_message().await;
                }
            }
        }
    }

    teardown(&client, &registry).await;
}

/// Removes the client from the registry, notifies the remaining members,
/// and closes the connection. Safe to reach from every exit path; the
/// registry removal guards against double-cleanup.
async fn teardown(client: &Arc<Client>, registry: &SharedRegistry) {
    let removed = {
        let mut clients = registry.lock().await;
        if clients.remove(&client.addr()).is_some() {
            clients
                .broadcast(Some(client.addr()), &responses::left_notice(client.name()))
                .await;
            Some(clients.len())
        } else {
            None
        }
    };

    client.close().await;

    if let Some(remaining) = removed {
        info!(
            "{} ({}) disconnected ({} active connections)",
            client.name(),
            client.addr(),
            remaining
        );
    }
}

/// Reads one line, trimming trailing line terminators only. `Ok(None)`
/// means EOF or server shutdown; both end the session the same way.
async fn next_line(
    reader: &mut BufReader<OwnedReadHalf>,
    shutdown: &mut watch::Receiver<bool>,
) -> Result<Option<String>, SessionError> {
    if *shutdown.borrow() {
        return Ok(None);
    }

    let mut line = String::new();
    tokio::select! {
        read = reader.read_line(&mut line) => match read {
            Ok(0) => Ok(None),
            Ok(_) => Ok(Some(line.trim_end_matches(['\r', '\n']).to_string())),
            Err(e) => Err(SessionError::Read(e)),
        },
        _ = shutdown.changed() => Ok(None),
    }
}
