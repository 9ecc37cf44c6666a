//! Market data provider combining Yahoo Finance with optional Finnhub news

use async_trait::async_trait;
use tracing::debug;

use super::{FinnhubClient, MarketDataProvider, YahooFinanceClient};
use crate::config::StockConfig;
use crate::error::Result;
use crate::model::{NewsItem, PriceSeries, QuoteSnapshot};

/// Yahoo Finance for quotes and history; news from Finnhub when a key is configured
pub struct MarketDataClient {
    yahoo: YahooFinanceClient,
    finnhub: Option<FinnhubClient>,
}

impl MarketDataClient {
    pub fn new(config: &StockConfig) -> Result<Self> {
        let yahoo = YahooFinanceClient::new(config.request_timeout)?;

        let finnhub = match &config.finnhub_api_key {
            Some(key) => {
                let http = reqwest::Client::builder()
                    .timeout(config.request_timeout)
                    .build()?;
                Some(FinnhubClient::new(key.clone(), config.finnhub_rate_limit, http))
            }
            None => None,
        };

        Ok(Self { yahoo, finnhub })
    }

    /// Name of the service news is read from
    pub fn news_source(&self) -> &'static str {
        if self.finnhub.is_some() {
            "finnhub"
        } else {
            "yahoo"
        }
    }
}

#[async_trait]
impl MarketDataProvider for MarketDataClient {
    async fn snapshot(&self, symbol: &str) -> Result<QuoteSnapshot> {
        self.yahoo.get_snapshot(symbol).await
    }

    async fn history(&self, symbol: &str, range: &str) -> Result<PriceSeries> {
        self.yahoo.get_history(symbol, range).await
    }

    async fn news(&self, symbol: &str, limit: usize) -> Result<Vec<NewsItem>> {
        debug!(symbol, limit, source = self.news_source(), "fetching news");
        match &self.finnhub {
            Some(finnhub) => finnhub.get_recent_news(symbol, limit).await,
            None => self.yahoo.get_news(symbol, limit).await,
        }
    }
}
