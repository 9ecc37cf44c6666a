//! Per-ticker report bundle and its text rendering

pub mod formatter;

pub use formatter::{NOT_AVAILABLE, ReportFormatter, UNDEFINED};

use serde::{Deserialize, Serialize};

use crate::analysis::{IndicatorResult, SentimentResult};
use crate::model::{PriceSeries, QuoteSnapshot};

/// Everything gathered for one ticker during a request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerReport {
    pub symbol: String,
    pub snapshot: QuoteSnapshot,
    pub series: PriceSeries,
    pub indicator: IndicatorResult,
    pub sentiment: SentimentResult,
}

impl TickerReport {
    pub fn display_name(&self) -> &str {
        self.snapshot.display_name()
    }
}
