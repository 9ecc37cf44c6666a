//! Yahoo Finance API client

use crate::error::{Result, StockError};
use crate::model::{NewsItem, PricePoint, PriceSeries, QuoteSnapshot};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use tracing::debug;
use yahoo_finance_api as yahoo;

const COOKIE_URL: &str = "https://fc.yahoo.com";
const CRUMB_URL: &str = "https://query1.finance.yahoo.com/v1/test/getcrumb";
const QUOTE_SUMMARY_URL: &str = "https://query1.finance.yahoo.com/v10/finance/quoteSummary";
const SEARCH_URL: &str = "https://query2.finance.yahoo.com/v1/finance/search";
const SUMMARY_MODULES: &str = "price,summaryDetail,financialData";
const BROWSER_AGENT: &str = concat!(
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 ",
    "(KHTML, like Gecko) Chrome/126.0 Safari/537.36"
);

/// Yahoo Finance API client
///
/// Daily history comes from the chart API through `yahoo_finance_api`; quote
/// fields and news come from the JSON endpoints, which need a session cookie
/// and crumb.
pub struct YahooFinanceClient {
    http: Client,
    crumb: RwLock<Option<String>>,
}

impl YahooFinanceClient {
    /// Create a new Yahoo Finance client
    pub fn new(timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .cookie_store(true)
            .user_agent(BROWSER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            crumb: RwLock::new(None),
        })
    }

    /// Get daily closes for a symbol over `range` (e.g. "1y")
    pub async fn get_history(&self, symbol: &str, range: &str) -> Result<PriceSeries> {
        let end = Utc::now();
        let start = range_start(range, end)?;

        let provider = yahoo::YahooConnector::new()
            .map_err(|e| StockError::YahooFinanceError(e.to_string()))?;

        // Convert chrono DateTime to time OffsetDateTime
        let start_odt = OffsetDateTime::from_unix_timestamp(start.timestamp())
            .map_err(|e| StockError::YahooFinanceError(format!("Invalid start timestamp: {e}")))?;
        let end_odt = OffsetDateTime::from_unix_timestamp(end.timestamp())
            .map_err(|e| StockError::YahooFinanceError(format!("Invalid end timestamp: {e}")))?;

        let response = provider
            .get_quote_history(symbol, start_odt, end_odt)
            .await
            .map_err(|e| StockError::YahooFinanceError(e.to_string()))?;

        let quotes = response
            .quotes()
            .map_err(|e| StockError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: e.to_string(),
            })?;

        let points = quotes.iter().filter_map(|q| {
            DateTime::from_timestamp(q.timestamp as i64, 0)
                .map(|ts| PricePoint::new(ts.date_naive(), q.close))
        });

        let series = PriceSeries::new(symbol, points);
        debug!(symbol, range, points = series.len(), "fetched history");
        Ok(series)
    }

    /// Get quote fields from the quote summary endpoint
    pub async fn get_snapshot(&self, symbol: &str) -> Result<QuoteSnapshot> {
        let crumb = self.crumb().await?;
        let url = format!("{QUOTE_SUMMARY_URL}/{}", urlencoding::encode(symbol));

        let response = self
            .http
            .get(&url)
            .query(&[("modules", SUMMARY_MODULES), ("crumb", crumb.as_str())])
            .send()
            .await?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                self.invalidate_crumb().await;
                return Err(StockError::YahooFinanceError(format!(
                    "quote summary for {symbol} rejected the session crumb"
                )));
            }
            // Not found still carries a JSON error body worth reading
            StatusCode::NOT_FOUND => {}
            status if !status.is_success() => {
                return Err(StockError::ApiError(format!(
                    "Yahoo quote summary returned {status} for {symbol}"
                )));
            }
            _ => {}
        }

        let body: QuoteSummaryResponse = response.json().await?;
        parse_snapshot(symbol, body)
    }

    /// Get the most recent news items for a symbol
    pub async fn get_news(&self, symbol: &str, limit: usize) -> Result<Vec<NewsItem>> {
        let count = limit.to_string();
        let response = self
            .http
            .get(SEARCH_URL)
            .query(&[
                ("q", symbol),
                ("quotesCount", "0"),
                ("newsCount", count.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StockError::ApiError(format!(
                "Yahoo search returned {} for {symbol}",
                response.status()
            )));
        }

        let body: SearchResponse = response.json().await?;
        Ok(latest_news(body.news, limit))
    }

    async fn crumb(&self) -> Result<String> {
        if let Some(crumb) = self.crumb.read().await.as_ref() {
            return Ok(crumb.clone());
        }

        let mut slot = self.crumb.write().await;
        if let Some(crumb) = slot.as_ref() {
            return Ok(crumb.clone());
        }

        // The cookie endpoint answers 404 but sets the session cookie
        self.http
            .get(COOKIE_URL)
            .header("referer", "https://finance.yahoo.com/")
            .send()
            .await?;

        let body = self
            .http
            .get(CRUMB_URL)
            .header("referer", "https://finance.yahoo.com/")
            .send()
            .await?
            .text()
            .await?;

        let crumb = validate_crumb(&body)?;
        debug!("obtained Yahoo crumb");
        *slot = Some(crumb.clone());
        Ok(crumb)
    }

    async fn invalidate_crumb(&self) {
        *self.crumb.write().await = None;
    }
}

/// Start of a named history range ending at `end`
pub fn range_start(range: &str, end: DateTime<Utc>) -> Result<DateTime<Utc>> {
    let start = match range {
        "1d" => end - chrono::Duration::days(1),
        "5d" => end - chrono::Duration::days(5),
        "1mo" => end - chrono::Duration::days(30),
        "3mo" => end - chrono::Duration::days(90),
        "6mo" => end - chrono::Duration::days(180),
        "1y" => end - chrono::Duration::days(365),
        "2y" => end - chrono::Duration::days(730),
        "5y" => end - chrono::Duration::days(1825),
        "10y" => end - chrono::Duration::days(3650),
        "ytd" => NaiveDate::from_ymd_opt(end.year(), 1, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|d| d.and_utc())
            .ok_or_else(|| StockError::Other(format!("Invalid year start for {end}")))?,
        "max" => end - chrono::Duration::days(36500), // ~100 years
        _ => return Err(StockError::ConfigError(format!("Invalid range: {range}"))),
    };
    Ok(start)
}

fn validate_crumb(body: &str) -> Result<String> {
    let crumb = body.trim();
    if crumb.is_empty() || crumb.len() > 100 || crumb.contains(' ') || crumb.contains('<') {
        return Err(StockError::YahooFinanceError(
            "failed to obtain Yahoo crumb".to_string(),
        ));
    }
    Ok(crumb.to_string())
}

fn parse_snapshot(symbol: &str, body: QuoteSummaryResponse) -> Result<QuoteSnapshot> {
    let summary = body.quote_summary;

    if let Some(error) = summary.error {
        return Err(StockError::TickerNotFound {
            symbol: symbol.to_string(),
            reason: error.description.unwrap_or(error.code),
        });
    }

    let result = summary
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| StockError::TickerNotFound {
            symbol: symbol.to_string(),
            reason: "no quote summary returned".to_string(),
        })?;

    let price = result.price.unwrap_or_default();
    let detail = result.summary_detail.unwrap_or_default();
    let financial = result.financial_data.unwrap_or_default();

    Ok(QuoteSnapshot {
        symbol: symbol.to_string(),
        name: price.long_name.or(price.short_name),
        price: RawValue::get(&price.regular_market_price)
            .or_else(|| RawValue::get(&financial.current_price)),
        // Yahoo reports the change as a fraction
        change_percent: RawValue::get(&price.regular_market_change_percent).map(|v| v * 100.0),
        market_cap: RawValue::get(&price.market_cap).or_else(|| RawValue::get(&detail.market_cap)),
        trailing_pe: RawValue::get(&detail.trailing_pe),
        target_price: RawValue::get(&financial.target_mean_price),
    })
}

fn latest_news(mut news: Vec<SearchNewsItem>, limit: usize) -> Vec<NewsItem> {
    news.sort_by(|a, b| b.publish_time.cmp(&a.publish_time));
    news.into_iter()
        .filter(|n| !n.title.trim().is_empty())
        .take(limit)
        .map(|n| NewsItem::new(n.title, n.summary))
        .collect()
}

// Yahoo Finance API response structures

#[derive(Debug, Deserialize)]
struct QuoteSummaryResponse {
    #[serde(rename = "quoteSummary")]
    quote_summary: QuoteSummaryData,
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryData {
    #[serde(default)]
    result: Option<Vec<QuoteSummaryResult>>,
    #[serde(default)]
    error: Option<YahooApiError>,
}

#[derive(Debug, Deserialize)]
struct YahooApiError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryResult {
    #[serde(default)]
    price: Option<PriceModule>,
    #[serde(rename = "summaryDetail", default)]
    summary_detail: Option<SummaryDetailModule>,
    #[serde(rename = "financialData", default)]
    financial_data: Option<FinancialDataModule>,
}

#[derive(Debug, Default, Deserialize)]
struct PriceModule {
    #[serde(rename = "longName", default)]
    long_name: Option<String>,
    #[serde(rename = "shortName", default)]
    short_name: Option<String>,
    #[serde(rename = "regularMarketPrice", default)]
    regular_market_price: Option<RawValue>,
    #[serde(rename = "regularMarketChangePercent", default)]
    regular_market_change_percent: Option<RawValue>,
    #[serde(rename = "marketCap", default)]
    market_cap: Option<RawValue>,
}

#[derive(Debug, Default, Deserialize)]
struct SummaryDetailModule {
    #[serde(rename = "trailingPE", default)]
    trailing_pe: Option<RawValue>,
    #[serde(rename = "marketCap", default)]
    market_cap: Option<RawValue>,
}

#[derive(Debug, Default, Deserialize)]
struct FinancialDataModule {
    #[serde(rename = "currentPrice", default)]
    current_price: Option<RawValue>,
    #[serde(rename = "targetMeanPrice", default)]
    target_mean_price: Option<RawValue>,
}

/// Yahoo wraps numbers as `{"raw": 1.0, "fmt": "1.00"}`, or `{}` when missing
#[derive(Debug, Default, Deserialize)]
struct RawValue {
    #[serde(default)]
    raw: Option<f64>,
}

impl RawValue {
    fn get(value: &Option<RawValue>) -> Option<f64> {
        value.as_ref().and_then(|v| v.raw).filter(|v| v.is_finite())
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    news: Vec<SearchNewsItem>,
}

#[derive(Debug, Deserialize)]
struct SearchNewsItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    summary: String,
    #[serde(rename = "providerPublishTime", default)]
    publish_time: Option<i64>,
}
