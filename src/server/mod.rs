//! Server core functionality
//!
//! This module contains the main server implementation: the accept loop
//! and the shutdown protocol.

pub mod core;

pub use core::Server;
