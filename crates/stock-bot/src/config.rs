//! Configuration for stock bot operations

use crate::error::{Result, StockError};
use bot_utils::{env_parse, env_var};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

/// History ranges understood by the market data client
pub const HISTORY_RANGES: &[&str] = &[
    "1d", "5d", "1mo", "3mo", "6mo", "1y", "2y", "5y", "10y", "ytd", "max",
];

/// How tickers of a comparison are fetched
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchMode {
    /// One ticker after another, in request order
    #[default]
    Sequential,
    /// All tickers at once, joined back into request order
    Concurrent,
}

impl FromStr for FetchMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sequential" | "seq" => Ok(Self::Sequential),
            "concurrent" | "parallel" => Ok(Self::Concurrent),
            other => Err(format!("unknown fetch mode: {other}")),
        }
    }
}

/// Configuration for stock bot operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockConfig {
    /// Smoothing window of the RSI
    pub rsi_period: usize,

    /// Maximum news items scored per ticker
    pub news_limit: usize,

    /// Range of daily history used for the indicator and comparison chart
    pub history_range: String,

    /// Trailing points drawn on the single-ticker chart
    pub chart_points: usize,

    /// Pixel size of the single-ticker chart
    pub single_chart_size: (u32, u32),

    /// Pixel size of the comparison chart
    pub compare_chart_size: (u32, u32),

    /// Fetch strategy for comparisons
    pub fetch_mode: FetchMode,

    /// HTTP request timeout
    pub request_timeout: Duration,

    /// Finnhub API key; news comes from Finnhub instead of Yahoo when set
    pub finnhub_api_key: Option<String>,

    /// Finnhub requests per minute
    pub finnhub_rate_limit: u32,
}

impl Default for StockConfig {
    fn default() -> Self {
        Self {
            rsi_period: 40,
            news_limit: 5,
            history_range: "1y".to_string(),
            chart_points: 90,
            single_chart_size: (1200, 600),
            compare_chart_size: (1400, 700),
            fetch_mode: FetchMode::Sequential,
            request_timeout: Duration::from_secs(30),
            finnhub_api_key: None,
            finnhub_rate_limit: 60, // free tier
        }
    }
}

impl StockConfig {
    /// Create a new configuration builder
    pub fn builder() -> StockConfigBuilder {
        StockConfigBuilder::default()
    }

    /// Load configuration from environment variables on top of defaults
    pub fn from_env() -> Result<Self> {
        Self::builder().with_env()?.build()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.rsi_period == 0 {
            return Err(StockError::ConfigError(
                "rsi_period must be greater than 0".to_string(),
            ));
        }

        if self.news_limit == 0 {
            return Err(StockError::ConfigError(
                "news_limit must be greater than 0".to_string(),
            ));
        }

        if self.chart_points < 2 {
            return Err(StockError::ConfigError(
                "chart_points must be at least 2".to_string(),
            ));
        }

        if !HISTORY_RANGES.contains(&self.history_range.as_str()) {
            return Err(StockError::ConfigError(format!(
                "history_range must be one of {}",
                HISTORY_RANGES.join(", ")
            )));
        }

        for (name, (w, h)) in [
            ("single_chart_size", self.single_chart_size),
            ("compare_chart_size", self.compare_chart_size),
        ] {
            if w == 0 || h == 0 {
                return Err(StockError::ConfigError(format!(
                    "{name} must have non-zero width and height"
                )));
            }
        }

        if self.finnhub_rate_limit == 0 {
            return Err(StockError::ConfigError(
                "finnhub_rate_limit must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for StockConfig
#[derive(Debug, Default)]
pub struct StockConfigBuilder {
    rsi_period: Option<usize>,
    news_limit: Option<usize>,
    history_range: Option<String>,
    chart_points: Option<usize>,
    single_chart_size: Option<(u32, u32)>,
    compare_chart_size: Option<(u32, u32)>,
    fetch_mode: Option<FetchMode>,
    request_timeout: Option<Duration>,
    finnhub_api_key: Option<String>,
    finnhub_rate_limit: Option<u32>,
}

impl StockConfigBuilder {
    /// Set the RSI window
    pub fn rsi_period(mut self, period: usize) -> Self {
        self.rsi_period = Some(period);
        self
    }

    /// Set the number of news items scored per ticker
    pub fn news_limit(mut self, limit: usize) -> Self {
        self.news_limit = Some(limit);
        self
    }

    /// Set the history range (e.g. "1y")
    pub fn history_range(mut self, range: impl Into<String>) -> Self {
        self.history_range = Some(range.into());
        self
    }

    /// Set the number of points on the single-ticker chart
    pub fn chart_points(mut self, points: usize) -> Self {
        self.chart_points = Some(points);
        self
    }

    /// Set the single-ticker chart size in pixels
    pub fn single_chart_size(mut self, width: u32, height: u32) -> Self {
        self.single_chart_size = Some((width, height));
        self
    }

    /// Set the comparison chart size in pixels
    pub fn compare_chart_size(mut self, width: u32, height: u32) -> Self {
        self.compare_chart_size = Some((width, height));
        self
    }

    /// Set the comparison fetch strategy
    pub fn fetch_mode(mut self, mode: FetchMode) -> Self {
        self.fetch_mode = Some(mode);
        self
    }

    /// Set request timeout
    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    /// Set Finnhub API key
    pub fn finnhub_api_key(mut self, key: impl Into<String>) -> Self {
        self.finnhub_api_key = Some(key.into());
        self
    }

    /// Set Finnhub requests per minute
    pub fn finnhub_rate_limit(mut self, per_minute: u32) -> Self {
        self.finnhub_rate_limit = Some(per_minute);
        self
    }

    /// Apply `STOCK_BOT_*` and `FINNHUB_API_KEY` environment variables
    pub fn with_env(mut self) -> Result<Self> {
        if let Some(period) = env_parse("STOCK_BOT_RSI_PERIOD")? {
            self.rsi_period = Some(period);
        }
        if let Some(limit) = env_parse("STOCK_BOT_NEWS_LIMIT")? {
            self.news_limit = Some(limit);
        }
        if let Some(range) = env_var("STOCK_BOT_HISTORY_RANGE") {
            self.history_range = Some(range);
        }
        if let Some(points) = env_parse("STOCK_BOT_CHART_POINTS")? {
            self.chart_points = Some(points);
        }
        if let Some(mode) = env_parse("STOCK_BOT_FETCH_MODE")? {
            self.fetch_mode = Some(mode);
        }
        if let Some(secs) = env_parse::<u64>("STOCK_BOT_REQUEST_TIMEOUT_SECS")? {
            self.request_timeout = Some(Duration::from_secs(secs));
        }
        if let Some(key) = env_var("FINNHUB_API_KEY") {
            self.finnhub_api_key = Some(key);
        }
        if let Some(rate) = env_parse("FINNHUB_RATE_LIMIT")? {
            self.finnhub_rate_limit = Some(rate);
        }
        Ok(self)
    }

    /// Build the configuration
    pub fn build(self) -> Result<StockConfig> {
        let defaults = StockConfig::default();

        let config = StockConfig {
            rsi_period: self.rsi_period.unwrap_or(defaults.rsi_period),
            news_limit: self.news_limit.unwrap_or(defaults.news_limit),
            history_range: self.history_range.unwrap_or(defaults.history_range),
            chart_points: self.chart_points.unwrap_or(defaults.chart_points),
            single_chart_size: self.single_chart_size.unwrap_or(defaults.single_chart_size),
            compare_chart_size: self.compare_chart_size.unwrap_or(defaults.compare_chart_size),
            fetch_mode: self.fetch_mode.unwrap_or(defaults.fetch_mode),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            finnhub_api_key: self.finnhub_api_key,
            finnhub_rate_limit: self.finnhub_rate_limit.unwrap_or(defaults.finnhub_rate_limit),
        };

        config.validate()?;
        Ok(config)
    }
}
