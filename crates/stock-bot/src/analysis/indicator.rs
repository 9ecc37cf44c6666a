//! Relative strength index over a simple moving average window
//!
//! Gains and losses are smoothed with a plain rolling mean (not Wilder's
//! smoothing), so the value matches a `rolling(window).mean()` RSI.

use serde::{Deserialize, Serialize};
use ta::{Next, indicators::SimpleMovingAverage};

use crate::error::{Result, StockError};

/// Default RSI window
pub const DEFAULT_RSI_PERIOD: usize = 40;

/// Above this the market is considered overbought
pub const OVERBOUGHT_LEVEL: f64 = 70.0;

/// Below this the market is considered oversold
pub const OVERSOLD_LEVEL: f64 = 30.0;

/// Qualitative reading of an RSI value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Zone {
    Overbought,
    Oversold,
    Normal,
}

impl Zone {
    pub fn classify(value: f64) -> Self {
        if value > OVERBOUGHT_LEVEL {
            Self::Overbought
        } else if value < OVERSOLD_LEVEL {
            Self::Oversold
        } else {
            Self::Normal
        }
    }
}

/// Latest RSI reading, or `Undefined` when the history is too short
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum IndicatorResult {
    Value { value: f64, zone: Zone },
    Undefined,
}

impl IndicatorResult {
    pub fn from_value(value: f64) -> Self {
        Self::Value {
            value,
            zone: Zone::classify(value),
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Value { value, .. } => Some(*value),
            Self::Undefined => None,
        }
    }

    pub fn zone(&self) -> Option<Zone> {
        match self {
            Self::Value { zone, .. } => Some(*zone),
            Self::Undefined => None,
        }
    }
}

/// RSI calculator with a fixed window
#[derive(Debug, Clone, Copy)]
pub struct RsiCalculator {
    period: usize,
}

impl RsiCalculator {
    pub fn new(period: usize) -> Result<Self> {
        if period == 0 {
            return Err(StockError::IndicatorError(
                "RSI period must be greater than 0".to_string(),
            ));
        }
        Ok(Self { period })
    }

    pub fn period(&self) -> usize {
        self.period
    }

    /// Most recent RSI of `closes` (oldest first)
    ///
    /// Needs at least `period + 1` closes; an average loss of zero yields 100.
    pub fn calculate(&self, closes: &[f64]) -> Result<IndicatorResult> {
        if closes.len() <= self.period {
            return Ok(IndicatorResult::Undefined);
        }

        let mut gain_avg = SimpleMovingAverage::new(self.period)
            .map_err(|e| StockError::IndicatorError(e.to_string()))?;
        let mut loss_avg = SimpleMovingAverage::new(self.period)
            .map_err(|e| StockError::IndicatorError(e.to_string()))?;

        let mut latest = (0.0, 0.0);
        for pair in closes.windows(2) {
            let delta = pair[1] - pair[0];
            latest = (
                gain_avg.next(delta.max(0.0)),
                loss_avg.next((-delta).max(0.0)),
            );
        }

        let (avg_gain, avg_loss) = latest;
        let value = if avg_loss == 0.0 {
            100.0
        } else {
            let rs = avg_gain / avg_loss;
            100.0 - 100.0 / (1.0 + rs)
        };

        Ok(IndicatorResult::from_value(value.clamp(0.0, 100.0)))
    }
}

impl Default for RsiCalculator {
    fn default() -> Self {
        Self {
            period: DEFAULT_RSI_PERIOD,
        }
    }
}
