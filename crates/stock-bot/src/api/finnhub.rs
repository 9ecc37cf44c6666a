//! Finnhub company news client

use crate::error::{Result, StockError};
use crate::model::NewsItem;
use chrono::{Duration, NaiveDate, Utc};
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::Client;
use serde::Deserialize;
use std::num::NonZeroU32;
use std::sync::Arc;

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

const COMPANY_NEWS_URL: &str = "https://finnhub.io/api/v1/company-news";

/// Days of company news requested per lookup
const NEWS_LOOKBACK_DAYS: i64 = 7;

const DEFAULT_RATE_LIMIT: NonZeroU32 = match NonZeroU32::new(60) {
    Some(limit) => limit,
    None => NonZeroU32::MIN,
};

/// Finnhub news article
#[derive(Debug, Clone, Deserialize)]
pub struct FinnhubNewsArticle {
    /// Publish time (UNIX timestamp)
    #[serde(default)]
    pub datetime: i64,
    /// News headline
    #[serde(default)]
    pub headline: String,
    /// Article summary
    #[serde(default)]
    pub summary: String,
}

/// Finnhub client for news API
pub struct FinnhubClient {
    client: Client,
    api_key: String,
    rate_limiter: SharedRateLimiter,
}

impl FinnhubClient {
    /// Create a new Finnhub client with rate limiting
    ///
    /// # Arguments
    /// * `api_key` - Finnhub API key
    /// * `rate_limit` - Requests per minute (free tier: 60, premium: 300+)
    pub fn new(api_key: impl Into<String>, rate_limit: u32, client: Client) -> Self {
        let quota = Quota::per_minute(NonZeroU32::new(rate_limit).unwrap_or(DEFAULT_RATE_LIMIT));
        let rate_limiter = Arc::new(RateLimiter::direct(quota));

        Self {
            client,
            api_key: api_key.into(),
            rate_limiter,
        }
    }

    /// Get company news for a specific symbol
    ///
    /// # Arguments
    /// * `symbol` - Stock symbol (e.g., "AAPL")
    /// * `from` - Start date
    /// * `to` - End date
    pub async fn get_company_news(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<FinnhubNewsArticle>> {
        self.rate_limiter.until_ready().await;

        let from = from.format("%Y-%m-%d").to_string();
        let to = to.format("%Y-%m-%d").to_string();

        let response = self
            .client
            .get(COMPANY_NEWS_URL)
            .query(&[
                ("symbol", symbol),
                ("from", from.as_str()),
                ("to", to.as_str()),
                ("token", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| StockError::ApiError(format!("Finnhub request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StockError::ApiError(format!(
                "Finnhub API error {status}: {body}"
            )));
        }

        response
            .json::<Vec<FinnhubNewsArticle>>()
            .await
            .map_err(|e| StockError::ApiError(format!("Failed to parse Finnhub response: {e}")))
    }

    /// Most recent news items of the past week
    pub async fn get_recent_news(&self, symbol: &str, limit: usize) -> Result<Vec<NewsItem>> {
        let to = Utc::now().date_naive();
        let from = to - Duration::days(NEWS_LOOKBACK_DAYS);
        let articles = self.get_company_news(symbol, from, to).await?;
        Ok(latest_items(articles, limit))
    }
}

fn latest_items(mut articles: Vec<FinnhubNewsArticle>, limit: usize) -> Vec<NewsItem> {
    articles.sort_by(|a, b| b.datetime.cmp(&a.datetime));
    articles
        .into_iter()
        .filter(|a| !a.headline.trim().is_empty())
        .take(limit)
        .map(|a| NewsItem::new(a.headline, a.summary))
        .collect()
}
