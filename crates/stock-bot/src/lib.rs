//! Stock ticker chat bot
//!
//! Given one ticker, or up to four joined with `/`, the bot replies with a
//! quote summary, a 40-period moving-average RSI, averaged VADER sentiment of
//! recent headlines and a PNG price chart.
//!
//! - [`api`]: Yahoo Finance quotes, history and news, optional Finnhub news
//! - [`analysis`]: RSI and news sentiment
//! - [`report`]: message text
//! - [`chart`]: plotters line charts
//! - [`bot`]: request parsing and the dispatcher
//! - [`platforms`]: Telegram and terminal front-ends
//!
//! # Example
//!
//! ```rust,ignore
//! use stock_bot::{ReplyBuffer, RequestDispatcher, StockConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let dispatcher = RequestDispatcher::from_config(StockConfig::default())?;
//!     let replies = ReplyBuffer::new();
//!     dispatcher.handle("NVDA/AAPL", &replies).await?;
//!
//!     for reply in replies.take() {
//!         println!("{reply:?}");
//!     }
//!     Ok(())
//! }
//! ```

pub mod analysis;
pub mod api;
pub mod bot;
pub mod chart;
pub mod config;
pub mod error;
pub mod model;
pub mod platforms;
pub mod report;

pub use analysis::{IndicatorResult, RsiCalculator, SentimentResult, SentimentScorer, VaderScorer};
pub use api::{MarketDataClient, MarketDataProvider, YahooFinanceClient};
pub use bot::{BotReply, Command, ReplyBuffer, ReplySink, RequestDispatcher, TickerRequest};
pub use chart::{Chart, ChartRenderer, PlottersChartRenderer};
pub use config::{FetchMode, StockConfig};
pub use error::{Result, StockError};
pub use model::{NewsItem, PricePoint, PriceSeries, QuoteSnapshot};
pub use report::{ReportFormatter, TickerReport};
