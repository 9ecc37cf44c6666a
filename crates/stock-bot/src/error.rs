//! Error types for stock bot operations

use thiserror::Error;

/// Stock bot specific errors
#[derive(Debug, Error)]
pub enum StockError {
    /// More tickers were requested than a comparison supports
    #[error("Too many tickers: {requested} requested, at most {limit} supported")]
    TooManyTickers {
        requested: usize,
        limit: usize,
    },

    /// The market data provider does not know the symbol
    #[error("Ticker not found: {symbol} ({reason})")]
    TickerNotFound {
        symbol: String,
        reason: String,
    },

    /// Data not available for the requested symbol
    #[error("Data not available for {symbol}: {reason}")]
    DataUnavailable {
        symbol: String,
        reason: String,
    },

    /// API request failed
    #[error("API error: {0}")]
    ApiError(String),

    /// Network or HTTP error
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Yahoo Finance API error
    #[error("Yahoo Finance error: {0}")]
    YahooFinanceError(String),

    /// Technical indicator calculation error
    #[error("Technical indicator error: {0}")]
    IndicatorError(String),

    /// Sentiment scoring error
    #[error("Sentiment error: {0}")]
    SentimentError(String),

    /// Chart rendering error
    #[error("Chart error: {0}")]
    ChartError(String),

    /// Chat transport error
    #[error("Transport error: {0}")]
    TransportError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl StockError {
    /// Whether the error means the symbol itself could not be resolved
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::TickerNotFound { .. })
    }
}

/// Result type alias for stock operations
pub type Result<T> = std::result::Result<T, StockError>;

impl From<bot_utils::EnvError> for StockError {
    fn from(err: bot_utils::EnvError) -> Self {
        StockError::ConfigError(err.to_string())
    }
}

impl From<std::io::Error> for StockError {
    fn from(err: std::io::Error) -> Self {
        StockError::Other(err.to_string())
    }
}
