//! API clients for stock data providers

pub mod finnhub;
pub mod market;
pub mod yahoo;

pub use finnhub::{FinnhubClient, FinnhubNewsArticle};
pub use market::MarketDataClient;
pub use yahoo::YahooFinanceClient;

use crate::error::Result;
use crate::model::{NewsItem, PriceSeries, QuoteSnapshot};
use async_trait::async_trait;

/// Source of quotes, daily history and news for a symbol
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Point-in-time quote fields
    async fn snapshot(&self, symbol: &str) -> Result<QuoteSnapshot>;

    /// Daily closes over a named range such as "1y"
    async fn history(&self, symbol: &str, range: &str) -> Result<PriceSeries>;

    /// Up to `limit` most recent news items
    async fn news(&self, symbol: &str, limit: usize) -> Result<Vec<NewsItem>>;
}
