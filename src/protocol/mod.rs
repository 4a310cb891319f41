//! Chat protocol
//!
//! Handles command parsing and outbound message formatting.

pub mod commands;
pub mod responses;

pub use commands::{Command, parse_command};
