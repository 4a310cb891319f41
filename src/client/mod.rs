//! Client management system
//!
//! Handles client connections, state management, and session lifecycle.

pub mod handler;
pub mod registry;
pub mod state;
pub mod writer;

pub use handler::handle_session;
pub use registry::{ClientRegistry, SharedRegistry};
pub use state::Client;
pub use writer::SessionWriter;
