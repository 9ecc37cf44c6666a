//! Market data values shared by the analysis, report and chart layers

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One daily close
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self { date, close }
    }
}

/// Daily closes of one symbol, oldest first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    symbol: String,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Build a series, dropping non-finite closes and ordering by date
    pub fn new(symbol: impl Into<String>, points: impl IntoIterator<Item = PricePoint>) -> Self {
        let mut points: Vec<PricePoint> = points
            .into_iter()
            .filter(|p| p.close.is_finite())
            .collect();
        points.sort_by_key(|p| p.date);

        Self {
            symbol: symbol.into(),
            points,
        }
    }

    /// An empty series for `symbol`
    pub fn empty(symbol: impl Into<String>) -> Self {
        Self::new(symbol, Vec::new())
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Closing prices in date order
    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    /// The last `n` points (all of them when the series is shorter)
    pub fn tail(&self, n: usize) -> &[PricePoint] {
        &self.points[self.points.len().saturating_sub(n)..]
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }
}

/// Point-in-time quote fields; any of them may be missing upstream
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuoteSnapshot {
    pub symbol: String,
    pub name: Option<String>,
    pub price: Option<f64>,
    /// Daily change in percent (1.5 means +1.5%)
    pub change_percent: Option<f64>,
    pub market_cap: Option<f64>,
    pub trailing_pe: Option<f64>,
    pub target_price: Option<f64>,
}

impl QuoteSnapshot {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            ..Default::default()
        }
    }

    /// Company name, or the symbol when the provider has none
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.symbol)
    }
}

/// A news article reduced to the text that gets scored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    pub summary: String,
}

impl NewsItem {
    pub fn new(title: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            summary: summary.into(),
        }
    }

    /// Title and summary joined by a space
    pub fn text(&self) -> String {
        format!("{} {}", self.title, self.summary)
    }
}
