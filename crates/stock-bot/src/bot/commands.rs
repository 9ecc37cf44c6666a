//! Inbound message classification

use super::request::TickerRequest;
use crate::error::Result;

/// What an inbound chat message asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `/start` or `/help`
    Help,
    /// Any other `/word` command; ignored
    Unknown { name: String },
    /// Whitespace only
    Empty,
    /// One or more ticker symbols
    Tickers(TickerRequest),
}

impl Command {
    /// Classify a message
    ///
    /// Only a `/` directly followed by a letter starts a command, so `/` used
    /// as a ticker delimiter never collides with command syntax.
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(Command::Empty);
        }

        if let Some(name) = command_name(input) {
            return Ok(match name.as_str() {
                "start" | "help" => Command::Help,
                _ => Command::Unknown { name },
            });
        }

        TickerRequest::parse(input).map(Command::Tickers)
    }
}

/// Lowercased command name without the `@botname` suffix
fn command_name(input: &str) -> Option<String> {
    let rest = input.strip_prefix('/')?;
    if !rest.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return None;
    }

    let word = rest.split_whitespace().next()?;
    let name = word.split('@').next().unwrap_or(word);
    Some(name.to_lowercase())
}
