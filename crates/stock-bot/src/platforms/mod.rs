//! Chat front-ends driving the request dispatcher

pub mod cli;
pub mod telegram;

pub use cli::{CliBot, CliSink};
pub use telegram::{TelegramBot, TelegramClient, TelegramConfig, TelegramReplySink};
