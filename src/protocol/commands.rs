//! Module `commands`
//!
//! Defines the chat command set and the parsing step that turns a raw
//! input line into a `Command`. Dispatch happens elsewhere; parsing here
//! is pure so it can be tested in isolation.

/// Represents one line of client input, parsed.
///
/// Slash-prefixed lines are commands; everything else is chat text.
#[derive(Debug, PartialEq)]
pub enum Command {
    Quit,
    Help,
    Who,
    Unknown(String), // Unrecognized /-prefixed input, kept verbatim
    Chat(String),
}

/// Parses a raw input line into the `Command` enum.
///
/// Command matching is on the first whitespace-delimited token,
/// case-insensitive. Non-command text passes through untouched.
pub fn parse_command(raw: &str) -> Command {
    if !raw.starts_with('/') {
        return Command::Chat(raw.to_string());
    }

    let verb = raw
        .split_whitespace()
        .next()
        .unwrap_or("")
        .to_ascii_lowercase();

    match verb.as_str() {
        "/quit" => Command::Quit,
        "/help" => Command::Help,
        "/who" => Command::Who,
        _ => Command::Unknown(raw.to_string()),
    }
}
