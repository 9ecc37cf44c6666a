//! Chat message handling
//!
//! A message is either a command (`/start`, `/help`) or free text naming one
//! ticker (`NVDA`) or up to four tickers joined by `/` (`NVDA/AAPL/TSLA`).
//! The [`RequestDispatcher`] turns it into an ordered series of replies:
//! a progress line, the text report, then the chart image.
//!
//! # Example
//!
//! ```rust,ignore
//! use stock_bot::bot::{ReplyBuffer, RequestDispatcher};
//! use stock_bot::config::StockConfig;
//!
//! let dispatcher = RequestDispatcher::from_config(StockConfig::from_env()?)?;
//! let replies = ReplyBuffer::new();
//! dispatcher.handle("NVDA/AAPL", &replies).await?;
//! ```

pub mod commands;
pub mod dispatcher;
pub mod reply;
pub mod request;

pub use commands::Command;
pub use dispatcher::RequestDispatcher;
pub use reply::{BotReply, ReplyBuffer, ReplySink};
pub use request::{MAX_TICKERS, RequestMode, TICKER_DELIMITER, TickerRequest};
