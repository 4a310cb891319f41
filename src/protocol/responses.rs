//! Outbound message formatting
//!
//! Every user-visible line the relay produces is built here. Payloads are
//! plain text; line termination is the session writer's concern.

use chrono::Local;

/// Prompt sent before registration; deliberately has no trailing newline
/// so the client's cursor sits after it.
pub const NAME_PROMPT: &str = "Enter your username: ";

pub const HELP_TEXT: &str = "Available commands:\n\
    /help    - Show help\n\
    /who     - List online users\n\
    /quit    - Disconnect from chat";

pub const UNKNOWN_COMMAND: &str = "Unknown command. Try /help";

pub const RATE_LIMIT_WARNING: &str = "Message rate limit exceeded";

pub const GOODBYE: &str = "You have left the chat";

pub const SHUTDOWN_NOTICE: &str = "Server shutting down";

pub fn welcome(name: &str) -> String {
    format!("Welcome, {}! Type /help for commands", name)
}

pub fn join_notice(name: &str) -> String {
    format!("{} has joined", name)
}

pub fn left_notice(name: &str) -> String {
    format!("{} has left the chat", name)
}

/// Chat line as delivered to recipients: `[HH:MM] name: text`
pub fn chat_line(name: &str, text: &str) -> String {
    format!("[{}] {}: {}", Local::now().format("%H:%M"), name, text)
}

pub fn who_listing(names: &[String]) -> String {
    format!("Online users: {}", names.join(", "))
}

pub fn line_too_long(limit: usize) -> String {
    format!("Message too long (limit {} bytes)", limit)
}
