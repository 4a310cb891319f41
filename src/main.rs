//! Chat Relay - Entry Point
//!
//! A line-oriented, multi-client TCP chat relay.

use std::sync::Arc;

use log::{error, info};

use chat_relay::config::ServerConfig;
use chat_relay::server::Server;

#[tokio::main]
async fn main() {
    // Initialize the logger (env_logger picks up RUST_LOG environment variable)
    env_logger::init();

    info!("Launching chat relay...");

    let config = match ServerConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let server = match Server::bind(config).await {
        Ok(server) => Arc::new(server),
        Err(e) => {
            error!("Failed to start server: {}", e);
            std::process::exit(1);
        }
    };

    let accept = {
        let server = Arc::clone(&server);
        tokio::spawn(async move { server.run().await })
    };

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }

    info!("Shutdown signal received");
    server.stop().await;
    let _ = accept.await;
}
