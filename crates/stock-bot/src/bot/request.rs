//! Ticker request parsing

use serde::{Deserialize, Serialize};

use crate::error::{Result, StockError};

/// Most tickers one comparison accepts
pub const MAX_TICKERS: usize = 4;

/// Separates tickers in a comparison request
pub const TICKER_DELIMITER: char = '/';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestMode {
    Single,
    Compare,
}

/// One inbound ticker message after normalisation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickerRequest {
    raw: String,
    symbols: Vec<String>,
    mode: RequestMode,
}

impl TickerRequest {
    /// Parse free text such as `nvda` or `NVDA/AAPL/TSLA`
    ///
    /// Input is trimmed and uppercased, split on `/`, and empty segments are
    /// dropped. More than [`MAX_TICKERS`] symbols is an error.
    pub fn parse(input: &str) -> Result<Self> {
        let raw = input.trim().to_uppercase();
        if raw.is_empty() {
            return Err(StockError::Other("no ticker given".to_string()));
        }

        let mut symbols: Vec<String> = raw
            .split(TICKER_DELIMITER)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();

        let mode = match symbols.len() {
            0 => {
                symbols.push(raw.clone());
                RequestMode::Single
            }
            1 => RequestMode::Single,
            n if n <= MAX_TICKERS => RequestMode::Compare,
            n => {
                return Err(StockError::TooManyTickers {
                    requested: n,
                    limit: MAX_TICKERS,
                });
            }
        };

        Ok(Self { raw, symbols, mode })
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn mode(&self) -> RequestMode {
        self.mode
    }
}
