//! Configuration management for the chat relay
//!
//! Settings come from built-in defaults, an optional `config.toml`, and
//! `CHAT_RELAY_*` environment overrides, in that order.

use config::{Config, Environment, File};
use serde::Deserialize;

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    /// IP address to bind the listener
    pub bind_address: String,

    /// TCP port to listen on
    pub port: u16,

    /// Maximum accepted input line length in bytes
    pub max_line_length: usize,

    /// Minimum gap between accepted chat messages before the sender is warned
    pub rate_limit_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: 4000,
            max_line_length: 512,
            rate_limit_ms: 1000,
        }
    }
}

impl ServerConfig {
    /// Load configuration from config.toml (if present) with environment overrides
    pub fn load() -> Result<Self, config::ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config").required(false))
            .add_source(Environment::with_prefix("CHAT_RELAY"))
            .build()?;

        let config: ServerConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// The address string handed to the listener bind call
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    fn validate(&self) -> Result<(), config::ConfigError> {
        if self.bind_address.is_empty() {
            return Err(config::ConfigError::Message(
                "bind_address cannot be empty".into(),
            ));
        }

        if self.max_line_length == 0 {
            return Err(config::ConfigError::Message(
                "max_line_length cannot be 0".into(),
            ));
        }

        Ok(())
    }
}
